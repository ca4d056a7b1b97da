//! Session service: cookie-keyed in-memory sessions and idle eviction.
//!
//! DESIGN
//! ======
//! A browser is tied to its session by an opaque UUID cookie. Unknown or
//! missing cookies get a fresh session. Starting over from the landing
//! screen replaces the session outright, which is how a reload behaved in
//! the browser-only app: the old list and staged images are dropped.
//!
//! A background sweeper evicts sessions that have been idle longer than the
//! configured TTL so their attachments are released.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::state::{AppState, Session};

pub const COOKIE_NAME: &str = "catalog_session";

/// Read the session id from the cookie jar, if it parses.
#[must_use]
pub fn session_id_from_jar(jar: &CookieJar) -> Option<Uuid> {
    jar.get(COOKIE_NAME).and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// The cookie expires together with the server-side idle TTL.
fn session_cookie(id: Uuid, config: &AppConfig) -> Cookie<'static> {
    let max_age = time::Duration::try_from(config.session_idle_ttl).unwrap_or(time::Duration::MAX);
    Cookie::build((COOKIE_NAME, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(max_age)
        .build()
}

/// Resolve the caller's session, creating one when the cookie is missing or
/// refers to an evicted session. Returns the jar to send back and the id.
pub async fn ensure_session(state: &AppState, jar: CookieJar) -> (CookieJar, Uuid) {
    let mut sessions = state.sessions.write().await;

    if let Some(id) = session_id_from_jar(&jar) {
        if let Some(session) = sessions.get_mut(&id) {
            session.touch();
            return (jar, id);
        }
    }

    let id = Uuid::new_v4();
    sessions.insert(id, Session::new());
    debug!(session_id = %id, "session created");
    (jar.add(session_cookie(id, &state.config)), id)
}

/// Replace the caller's session with a fresh one. The previous session, if
/// any, is dropped along with its items and staged images.
pub async fn reset_session(state: &AppState, jar: CookieJar) -> (CookieJar, Uuid) {
    let mut sessions = state.sessions.write().await;

    if let Some(old) = session_id_from_jar(&jar) {
        if let Some(previous) = sessions.remove(&old) {
            debug!(session_id = %old, items = previous.items.len(), "session reset");
        }
    }

    let id = Uuid::new_v4();
    sessions.insert(id, Session::new());
    (jar.add(session_cookie(id, &state.config)), id)
}

/// Run `f` against the session. Returns `None` when the session is gone.
pub async fn with_session<T>(state: &AppState, id: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
    let mut sessions = state.sessions.write().await;
    sessions.get_mut(&id).map(f)
}

/// Run `f` against the caller's existing session without creating one.
/// Returns `None` when the cookie is missing or names no live session.
pub async fn peek_session<T>(state: &AppState, jar: &CookieJar, f: impl FnOnce(&Session) -> T) -> Option<T> {
    let id = session_id_from_jar(jar)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id)?;
    session.touch();
    Some(f(session))
}

/// Drop sessions idle for longer than `ttl`. Returns how many were evicted.
pub fn evict_idle(sessions: &mut HashMap<Uuid, Session>, now: Instant, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| now.saturating_duration_since(session.last_seen) <= ttl);
    before - sessions.len()
}

/// Spawn the background idle-session sweeper. Returns a handle for shutdown.
pub fn spawn_session_sweeper(state: AppState) -> JoinHandle<()> {
    let interval = state.config.session_sweep_interval;
    let ttl = state.config.session_idle_ttl;
    info!(interval_secs = interval.as_secs(), ttl_secs = ttl.as_secs(), "session sweeper configured");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let evicted = {
                let mut sessions = state.sessions.write().await;
                evict_idle(&mut sessions, Instant::now(), ttl)
            };
            if evicted > 0 {
                info!(evicted, "idle sessions evicted");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
