use super::*;
use crate::routes::app;
use crate::routes::test_support::{
    Part, add_item, body_bytes, body_text, get, location, post_form, post_multipart, send, start, start_as,
};
use crate::services::item::{Category, HouseholdMember};
use crate::state::test_helpers::{jpeg, test_app_state};

fn form(fields: &[(&str, &str)], uploads: Vec<Attachment>) -> ItemForm {
    ItemForm { fields: fields.iter().copied().collect(), uploads }
}

fn session_for(user: HouseholdMember) -> Session {
    let mut session = Session::new();
    session.user = Some(user);
    session
}

fn redirect_target(outcome: &Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Redirect(to) => Some(*to),
        Outcome::Render(..) => None,
    }
}

// =============================================================================
// INTENT
// =============================================================================

#[test]
fn intent_defaults_to_add() {
    assert_eq!(Intent::from_field(None), Intent::Add);
    assert_eq!(Intent::from_field(Some("add")), Intent::Add);
    assert_eq!(Intent::from_field(Some("launch")), Intent::Add);
    assert_eq!(Intent::from_field(Some(" capture ")), Intent::Capture);
    assert_eq!(Intent::from_field(Some("cancel")), Intent::Cancel);
}

// =============================================================================
// APPLY
// =============================================================================

#[test]
fn add_without_user_redirects_to_users() {
    let mut session = Session::new();
    let outcome = apply_item_form(&mut session, form(&[("name", "Laptop")], Vec::new()), 1);
    assert_eq!(redirect_target(&outcome), Some("/users"));
    assert!(session.items.is_empty());
}

#[test]
fn add_appends_item_with_staged_then_uploaded_images() {
    let mut session = session_for(HouseholdMember::Sofia);
    session.staged_images.push(jpeg("camera.jpg"));
    let fields = [("name", "Laptop"), ("category", "electronicos"), ("quantity", "1"), ("estimated_value", "600")];

    let outcome = apply_item_form(&mut session, form(&fields, vec![jpeg("upload.jpg")]), 42);

    assert_eq!(redirect_target(&outcome), Some("/add"));
    assert!(session.staged_images.is_empty());
    let item = &session.items.items()[0];
    assert_eq!(item.id, "42-Laptop");
    assert_eq!(item.user, HouseholdMember::Sofia);
    assert_eq!(item.category, Category::Electronicos);
    let names: Vec<&str> = item.images.iter().map(|image| image.file_name.as_str()).collect();
    assert_eq!(names, ["camera.jpg", "upload.jpg"]);
    assert!(session.notices.is_empty());
}

#[test]
fn add_records_coercion_notices() {
    let mut session = session_for(HouseholdMember::Pablo);
    apply_item_form(&mut session, form(&[("name", "Desk"), ("initial_value", "cheap")], Vec::new()), 1);

    assert_eq!(session.items.len(), 1);
    assert_eq!(session.notices.len(), 1);
    assert_eq!(session.notices[0].field, "initial_value");
}

#[test]
fn rejected_add_rerenders_and_stages_uploads() {
    let mut session = session_for(HouseholdMember::Diego);
    let outcome = apply_item_form(&mut session, form(&[("name", "  "), ("notes", "keep me")], vec![jpeg("a.jpg")]), 1);

    let Outcome::Render(status, page) = outcome else {
        panic!("rejected submission should re-render");
    };
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.dialog_open);
    assert_eq!(page.errors, ["name is required"]);
    assert_eq!(page.values.get("notes"), Some("keep me"));
    assert_eq!(page.staged_count, 1);
    assert!(session.items.is_empty());
    assert_eq!(session.staged_images.len(), 1);
}

#[test]
fn capture_stages_and_keeps_values() {
    let mut session = session_for(HouseholdMember::Alvaro);
    session.staged_images.push(jpeg("first.jpg"));
    let outcome = apply_item_form(
        &mut session,
        form(&[("intent", "capture"), ("name", "Ring")], vec![jpeg("second.jpg")]),
        1,
    );

    let Outcome::Render(status, page) = outcome else {
        panic!("capture should re-render");
    };
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.staged_count, 2);
    assert_eq!(page.values.get("name"), Some("Ring"));
    assert!(page.errors.is_empty());
    assert!(session.items.is_empty());
}

#[test]
fn cancel_discards_staged_images() {
    let mut session = session_for(HouseholdMember::Guillermo);
    session.staged_images.push(jpeg("a.jpg"));
    let outcome = apply_item_form(&mut session, form(&[("intent", "cancel"), ("name", "Sofa")], Vec::new()), 1);

    assert_eq!(redirect_target(&outcome), Some("/add"));
    assert!(session.staged_images.is_empty());
    assert!(session.items.is_empty());
}

// =============================================================================
// ROUTES
// =============================================================================

#[tokio::test]
async fn submit_multipart_adds_item_and_skips_empty_file_parts() {
    let state = test_app_state();
    let app = app(state.clone());
    let cookie = start_as(&app, "sofia").await;

    let parts = [
        Part::Text("name", "Laptop"),
        Part::Text("category", "electronicos"),
        Part::Text("quantity", "1"),
        Part::File { name: "images", file_name: "front.png", content_type: "image/png", bytes: b"\x89PNG" },
        Part::File { name: "images", file_name: "", content_type: "application/octet-stream", bytes: b"" },
        Part::Text("intent", "add"),
    ];
    let response = send(&app, post_multipart("/items", Some(&cookie), &parts)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/add"));

    let sessions = state.sessions.read().await;
    let item = &sessions.values().next().expect("session").items.items()[0];
    assert_eq!(item.name, "Laptop");
    assert_eq!(item.images.len(), 1);
    assert_eq!(item.images[0].content_type, "image/png");
    assert_eq!(&item.images[0].bytes[..], b"\x89PNG");
}

#[tokio::test]
async fn submit_without_user_redirects_to_users() {
    let app = app(test_app_state());
    let cookie = start(&app).await;
    let response = add_item(&app, &cookie, &[("name", "Laptop")]).await;
    assert_eq!(location(&response).as_deref(), Some("/users"));
}

#[tokio::test]
async fn rejected_submit_renders_dialog_with_422() {
    let app = app(test_app_state());
    let cookie = start_as(&app, "pablo").await;
    let response = add_item(&app, &cookie, &[("name", ""), ("serial_numbers", "A1, B2")]).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("add-item-form"));
    assert!(html.contains("name is required"));
    assert!(html.contains("A1, B2"));
}

#[tokio::test]
async fn malformed_multipart_is_a_client_error() {
    let app = app(test_app_state());
    let cookie = start_as(&app, "pablo").await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/items")
        .header(axum::http::header::COOKIE, &cookie)
        .header(CONTENT_TYPE, "multipart/form-data; boundary=xyz")
        .body(axum::body::Body::from("--xyz\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nunterminated"))
        .expect("request should build");

    let response = send(&app, request).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn captured_image_preview_is_served() {
    let app = app(test_app_state());
    let cookie = start_as(&app, "alvaro").await;
    let parts = [
        Part::Text("intent", "capture"),
        Part::Text("name", "Watch"),
        Part::File { name: "images", file_name: "dial.jpg", content_type: "image/jpeg", bytes: b"\xFF\xD8\xFFdial" },
    ];
    let response = send(&app, post_multipart("/items", Some(&cookie), &parts)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/items/images/0"));

    let preview = send(&app, get("/items/images/0", Some(&cookie))).await;
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(preview.headers()[CONTENT_TYPE], "image/jpeg");
    assert_eq!(&body_bytes(preview).await[..], b"\xFF\xD8\xFFdial");

    let missing = send(&app, get("/items/images/1", Some(&cookie))).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_without_session_is_not_found_and_creates_nothing() {
    let state = test_app_state();
    let app = app(state.clone());

    let response = send(&app, get("/items/images/0", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(state.sessions.read().await.is_empty());
}

#[tokio::test]
async fn delete_removes_only_matching_item() {
    let state = test_app_state();
    let app = app(state.clone());
    let cookie = start_as(&app, "guillermo").await;
    add_item(&app, &cookie, &[("name", "Chair")]).await;
    add_item(&app, &cookie, &[("name", "Table")]).await;

    let id = {
        let sessions = state.sessions.read().await;
        sessions.values().next().expect("session").items.items()[0].id.clone()
    };

    let response = send(&app, post_form("/items/delete", Some(&cookie), &format!("id={id}"))).await;
    assert_eq!(location(&response).as_deref(), Some("/add"));
    send(&app, post_form("/items/delete", Some(&cookie), "id=missing")).await;

    let sessions = state.sessions.read().await;
    let items = sessions.values().next().expect("session").items.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Table");
}

#[tokio::test]
async fn clear_empties_list() {
    let state = test_app_state();
    let app = app(state.clone());
    let cookie = start_as(&app, "diego").await;
    add_item(&app, &cookie, &[("name", "Chair")]).await;
    add_item(&app, &cookie, &[("name", "Table")]).await;

    let response = send(&app, post_form("/items/clear", Some(&cookie), "")).await;
    assert_eq!(location(&response).as_deref(), Some("/add"));
    assert!(state.sessions.read().await.values().all(|session| session.items.is_empty()));
}
