//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the item model, form parsing, archive building and
//! session bookkeeping so route handlers can stay focused on HTTP plumbing.

pub mod export;
pub mod form;
pub mod item;
pub mod session;
