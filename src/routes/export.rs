//! Export routes: zip download and the JSON item listing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use crate::routes::now_ms;
use crate::services::export::{ExportError, ItemRecord, export_items};
use crate::services::session::peek_session;
use crate::state::AppState;

pub(crate) fn export_error_to_status(err: &ExportError) -> StatusCode {
    match err {
        ExportError::Zip(_) | ExportError::Io(_) | ExportError::Json(_) | ExportError::Task(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /export`: download every item as a zip of per-item folders.
///
/// A caller without a live session gets an empty archive.
pub async fn download(State(state): State<AppState>, jar: CookieJar) -> Result<Response, StatusCode> {
    let items = peek_session(&state, &jar, |session| session.items.items().to_vec()).await.unwrap_or_default();

    let archive = match export_items(items, state.config.archive_naming, now_ms()).await {
        Ok(archive) => archive,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "export failed");
            return Err(export_error_to_status(&e));
        }
    };

    info!(items = archive.item_count, file_name = %archive.file_name, "export downloaded");
    let disposition = format!("attachment; filename=\"{}\"", archive.file_name);
    let response = ([(CONTENT_TYPE, "application/zip"), (CONTENT_DISPOSITION, disposition.as_str())], archive.bytes)
        .into_response();
    Ok(response)
}

/// `GET /api/items`: the list as JSON, with images given by archive name.
pub async fn list_items(State(state): State<AppState>, jar: CookieJar) -> Result<Json<serde_json::Value>, StatusCode> {
    let listed = peek_session(&state, &jar, |session| {
        let records: Vec<ItemRecord<'_>> = session.items.items().iter().map(ItemRecord::from_item).collect();
        serde_json::to_value(records)
    })
    .await
    .unwrap_or_else(|| Ok(serde_json::Value::Array(Vec::new())));

    listed.map(Json).map_err(|e| {
        error!(error = %e, "item listing failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
