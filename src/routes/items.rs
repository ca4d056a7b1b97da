//! Item routes: add-item submissions, image capture, delete, and clear.
//!
//! DESIGN
//! ======
//! The add-item dialog is one multipart form. Its submit buttons carry an
//! `intent`:
//!
//! - `add` (default): parse the fields and append the item. Images are the
//!   staged captures followed by the files in the `images` field.
//! - `capture`: stage the files in the `images` field and re-render the
//!   dialog with the typed values kept.
//! - `cancel`: drop staged captures and close the dialog.
//!
//! A rejected submission re-renders the dialog with 422. Its uploaded files
//! are staged so the browser does not have to send them again.

use axum::Form;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::routes::now_ms;
use crate::routes::pages::entry_response;
use crate::services::form::{RawFields, parse_submission};
use crate::services::item::Attachment;
use crate::services::session::{self, ensure_session, peek_session};
use crate::state::{AppState, Session};
use crate::views::entry::{EntryView, IMAGES_FIELD, INTENT_CANCEL, INTENT_CAPTURE, INTENT_FIELD};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// =============================================================================
// SUBMISSION DECODING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Add,
    Capture,
    Cancel,
}

impl Intent {
    /// Unknown or missing intents are treated as `add`. The dialog's first
    /// submit button also posts `add`, so pressing Enter in a field adds.
    #[must_use]
    pub fn from_field(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(INTENT_CAPTURE) => Self::Capture,
            Some(INTENT_CANCEL) => Self::Cancel,
            _ => Self::Add,
        }
    }
}

/// Decoded add-item form.
#[derive(Debug, Default)]
pub struct ItemForm {
    pub fields: RawFields,
    pub uploads: Vec<Attachment>,
}

impl ItemForm {
    #[must_use]
    pub fn intent(&self) -> Intent {
        Intent::from_field(self.fields.get(INTENT_FIELD))
    }
}

/// Split a multipart body into text fields and image uploads.
///
/// Empty file parts (a file input with nothing chosen) are skipped.
///
/// # Errors
///
/// Returns the multipart error when the body is malformed or too large.
pub async fn read_item_form(mut multipart: Multipart) -> Result<ItemForm, MultipartError> {
    let mut form = ItemForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == IMAGES_FIELD || field.file_name().is_some() {
            if let Some(upload) = read_upload(field).await? {
                form.uploads.push(upload);
            }
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn read_upload(field: Field<'_>) -> Result<Option<Attachment>, MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().unwrap_or(FALLBACK_CONTENT_TYPE).to_owned();
    let bytes = field.bytes().await?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(Attachment::new(file_name, content_type, bytes)))
}

// =============================================================================
// HANDLERS
// =============================================================================

enum Outcome {
    Redirect(&'static str),
    Render(StatusCode, EntryView),
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(to) => Redirect::to(to).into_response(),
            Self::Render(status, page) => entry_response(status, page),
        }
    }
}

fn apply_item_form(session: &mut Session, form: ItemForm, now_ms: i64) -> Outcome {
    let Some(user) = session.user else {
        return Outcome::Redirect("/users");
    };
    let intent = form.intent();
    let ItemForm { fields, uploads } = form;

    match intent {
        Intent::Cancel => {
            session.staged_images.clear();
            Outcome::Redirect("/add")
        }
        Intent::Capture => {
            session.staged_images.extend(uploads);
            let mut page = EntryView::from_session(session, true);
            page.values = fields;
            Outcome::Render(StatusCode::OK, page)
        }
        Intent::Add => match parse_submission(&fields) {
            Ok(submission) => {
                let mut images = std::mem::take(&mut session.staged_images);
                images.extend(uploads);
                session.notices = submission.issues.clone();
                let item = session.items.add(submission.into_draft(user, images), now_ms);
                info!(item_id = %item.id, images = item.images.len(), "item added");
                Outcome::Redirect("/add")
            }
            Err(rejected) => {
                warn!(error = %rejected, code = rejected.error_code(), "item rejected");
                session.staged_images.extend(uploads);
                let mut page = EntryView::from_session(session, true);
                page.errors = rejected.issues.iter().map(ToString::to_string).collect();
                page.values = fields;
                Outcome::Render(StatusCode::UNPROCESSABLE_ENTITY, page)
            }
        },
    }
}

/// `POST /items`: add an item, stage a capture, or cancel the dialog.
pub async fn submit_item(State(state): State<AppState>, jar: CookieJar, multipart: Multipart) -> (CookieJar, Response) {
    let (jar, session_id) = ensure_session(&state, jar).await;

    let form = match read_item_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!(%session_id, error = %e, "item form unreadable");
            return (jar, e.into_response());
        }
    };

    let now = now_ms();
    let outcome = session::with_session(&state, session_id, |session| apply_item_form(session, form, now))
        .await
        .unwrap_or(Outcome::Redirect("/"));
    (jar, outcome.into_response())
}

#[derive(Deserialize)]
pub struct DeleteItem {
    pub id: String,
}

/// `POST /items/delete`: remove one item. Unknown ids are ignored.
pub async fn delete_item(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(body): Form<DeleteItem>,
) -> (CookieJar, Redirect) {
    let (jar, session_id) = ensure_session(&state, jar).await;
    let removed = session::with_session(&state, session_id, |session| session.items.remove(&body.id))
        .await
        .flatten();

    match removed {
        Some(item) => info!(item_id = %item.id, "item deleted"),
        None => debug!(item_id = %body.id, "delete ignored, no such item"),
    }
    (jar, Redirect::to("/add"))
}

/// `POST /items/clear`: empty the list. Ignored until a user is chosen.
pub async fn clear_items(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, session_id) = ensure_session(&state, jar).await;
    let cleared = session::with_session(&state, session_id, |session| {
        if session.user.is_none() || session.items.is_empty() {
            return 0;
        }
        let count = session.items.len();
        session.items.clear();
        count
    })
    .await
    .unwrap_or_default();

    info!(%session_id, cleared, "items cleared");
    (jar, Redirect::to("/add"))
}

/// `GET /items/images/{index}`: preview of a staged capture.
pub async fn staged_image(State(state): State<AppState>, jar: CookieJar, Path(index): Path<usize>) -> Response {
    let image = peek_session(&state, &jar, |session| session.staged_images.get(index).cloned()).await.flatten();

    match image {
        Some(image) => {
            ([(CONTENT_TYPE, image.content_type), (CACHE_CONTROL, "no-store".to_owned())], image.bytes).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
#[path = "items_test.rs"]
mod tests;
