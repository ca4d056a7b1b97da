//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen is rendered on the server and every action is a plain form
//! post followed by a redirect back to a screen. Handlers resolve the
//! caller's session from the cookie jar first and hand the (possibly
//! updated) jar back with the response.

pub mod export;
pub mod items;
pub mod pages;

use std::path::PathBuf;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Resolve the path to the static assets directory.
fn assets_dir() -> PathBuf {
    std::env::var("ASSETS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"))
}

/// Full application router: screens, item actions, export, and assets.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(pages::landing))
        .route("/start", post(pages::start))
        .route("/users", get(pages::users).post(pages::select_user))
        .route("/add", get(pages::entry))
        .route("/items", post(items::submit_item))
        .route("/items/delete", post(items::delete_item))
        .route("/items/clear", post(items::clear_items))
        .route("/items/images/{index}", get(items::staged_image))
        .route("/api/items", get(export::list_items))
        .route("/export", get(export::download))
        .route("/healthz", get(healthz))
        .nest_service("/assets", ServeDir::new(assets_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Milliseconds since the Unix epoch, used for item ids and archive names.
pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
