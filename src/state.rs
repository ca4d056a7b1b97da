//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the loaded configuration and a map of live sessions keyed by
//! the session cookie. Each session owns its item list, the chosen user,
//! and any images staged for the item currently being composed. Nothing
//! here outlives the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::form::FieldIssue;
use crate::services::item::{Attachment, HouseholdMember, ItemList};

// =============================================================================
// SESSION
// =============================================================================

/// Per-browser session state. Lives until reset from the landing screen or
/// evicted by the idle sweeper.
#[derive(Debug)]
pub struct Session {
    /// Chosen household member. Adding items is gated on this.
    pub user: Option<HouseholdMember>,
    pub items: ItemList,
    /// Images captured one at a time for the item being composed.
    pub staged_images: Vec<Attachment>,
    /// Coercion notices from the last accepted submission, shown once.
    pub notices: Vec<FieldIssue>,
    pub last_seen: Instant,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user: None,
            items: ItemList::new(),
            staged_images: Vec::new(),
            notices: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config: Arc::new(config), sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::services::item::{Amount, Category, ItemDraft};

    /// Create a test `AppState` with default configuration.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(AppConfig::default())
    }

    /// Seed a session with a chosen user and return its ID.
    pub async fn seed_session(state: &AppState, user: Option<HouseholdMember>) -> Uuid {
        let session_id = Uuid::new_v4();
        let mut session = Session::new();
        session.user = user;
        state.sessions.write().await.insert(session_id, session);
        session_id
    }

    /// Minimal draft owned by `guillermo` with every optional field defaulted.
    #[must_use]
    pub fn draft(name: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_owned(),
            user: HouseholdMember::Guillermo,
            category: Category::Unspecified,
            quantity: 0,
            serial_numbers: Vec::new(),
            initial_value: Amount::ZERO,
            estimated_value: Amount::ZERO,
            value_link: None,
            notes: String::new(),
            images: Vec::new(),
        }
    }

    /// Tiny fake JPEG attachment (SOI marker plus a name-derived payload).
    #[must_use]
    pub fn jpeg(file_name: &str) -> Attachment {
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        bytes.extend_from_slice(file_name.as_bytes());
        Attachment::new(file_name, "image/jpeg", bytes)
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
