//! Screen routes: landing, user selection, and the item entry screen.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use leptos::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::services::item::HouseholdMember;
use crate::services::session::{self, ensure_session, reset_session};
use crate::state::AppState;
use crate::views::entry::{EntryPage, EntryView};
use crate::views::landing::LandingPage;
use crate::views::render_document;
use crate::views::users::UsersPage;

pub const LANDING_TITLE: &str = "Insurance App";
pub const USERS_TITLE: &str = "Who are you?";
pub const ENTRY_TITLE: &str = "Add Items";

#[derive(Deserialize)]
pub struct UserSelection {
    #[serde(default)]
    pub user: String,
}

#[derive(Deserialize)]
pub struct EntryQuery {
    pub dialog: Option<String>,
}

/// Render the entry screen with the given status.
pub(crate) fn entry_response(status: StatusCode, page: EntryView) -> Response {
    (status, Html(render_document(ENTRY_TITLE, view! { <EntryPage page=page/> }))).into_response()
}

fn users_response(status: StatusCode, selected: Option<HouseholdMember>, error: Option<String>) -> Response {
    (status, Html(render_document(USERS_TITLE, view! { <UsersPage selected=selected error=error/> }))).into_response()
}

/// `GET /`: landing screen.
pub async fn landing() -> Html<String> {
    Html(render_document(LANDING_TITLE, view! { <LandingPage/> }))
}

/// `POST /start`: drop any previous session and begin a fresh one.
pub async fn start(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let (jar, session_id) = reset_session(&state, jar).await;
    info!(%session_id, "session started");
    (jar, Redirect::to("/users"))
}

/// `GET /users`: user selection screen.
pub async fn users(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let (jar, session_id) = ensure_session(&state, jar).await;
    let selected = session::with_session(&state, session_id, |session| session.user).await.flatten();
    (jar, users_response(StatusCode::OK, selected, None))
}

/// `POST /users`: record the chosen household member.
///
/// Both the selection screen and the entry screen's inline picker post here.
pub async fn select_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(selection): Form<UserSelection>,
) -> (CookieJar, Response) {
    let (jar, session_id) = ensure_session(&state, jar).await;

    let Some(member) = HouseholdMember::from_key(&selection.user) else {
        warn!(%session_id, user = %selection.user, "unknown household member");
        let selected = session::with_session(&state, session_id, |session| session.user).await.flatten();
        let response = users_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            selected,
            Some("Choose a household member from the list.".to_owned()),
        );
        return (jar, response);
    };

    session::with_session(&state, session_id, |session| session.user = Some(member)).await;
    info!(%session_id, user = member.key(), "user selected");
    (jar, Redirect::to("/add").into_response())
}

/// `GET /add`: item entry screen. `?dialog=open` shows the add-item dialog.
///
/// Notices from the last accepted submission are shown once and then cleared.
pub async fn entry(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<EntryQuery>,
) -> (CookieJar, Response) {
    let (jar, session_id) = ensure_session(&state, jar).await;
    let dialog_open = query.dialog.as_deref() == Some("open");

    let page = session::with_session(&state, session_id, |session| {
        let page = EntryView::from_session(session, dialog_open);
        session.notices.clear();
        page
    })
    .await
    .unwrap_or_default();

    (jar, entry_response(StatusCode::OK, page))
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
