//! Request helpers shared by the router tests.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::services::session::COOKIE_NAME;

pub const BOUNDARY: &str = "belongings-test-boundary";

/// One part of a multipart request body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File { name: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8] },
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router should not fail")
}

fn builder(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(COOKIE, cookie),
        None => builder,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    builder("GET", uri, cookie).body(Body::empty()).expect("request should build")
}

pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    builder("POST", uri, cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .expect("request should build")
}

pub fn post_multipart(uri: &str, cookie: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    builder("POST", uri, cookie)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .expect("request should build")
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, file_name, content_type, bytes } => {
                let disposition = format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"");
                body.extend_from_slice(disposition.as_bytes());
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `name=value` pair of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_owned)
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response.headers().get(LOCATION).and_then(|value| value.to_str().ok()).map(str::to_owned)
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.expect("body should collect").to_bytes()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).expect("body should be utf-8")
}

/// Start a fresh session and return its cookie.
pub async fn start(app: &Router) -> String {
    let response = send(app, post_form("/start", None, "")).await;
    session_cookie(&response).expect("start should set a session cookie")
}

/// Start a session and pick `user`. Returns the session cookie.
pub async fn start_as(app: &Router, user: &str) -> String {
    let cookie = start(app).await;
    let response = send(app, post_form("/users", Some(&cookie), &format!("user={user}"))).await;
    assert_eq!(location(&response).as_deref(), Some("/add"));
    cookie
}

/// Submit the add-item form with text fields only.
pub async fn add_item(app: &Router, cookie: &str, fields: &[(&str, &str)]) -> Response<Body> {
    let parts: Vec<Part<'_>> = fields.iter().map(|(name, value)| Part::Text(name, value)).collect();
    send(app, post_multipart("/items", Some(cookie), &parts)).await
}
