//! Server-rendered screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Screens are Leptos views rendered to HTML strings on every request; there
//! is no hydration and no client-side script. Plain HTML forms post back to
//! the routes in `crate::routes`.

pub mod entry;
pub mod landing;
pub mod users;

use leptos::prelude::*;

/// Wrap `body` in the shared document shell and render it to a string.
pub fn render_document(title: &'static str, body: impl IntoView + 'static) -> String {
    let owner = Owner::new();
    let html = owner.with(|| {
        view! {
            <html lang="en">
                <head>
                    <meta charset="utf-8"/>
                    <meta name="viewport" content="width=device-width, initial-scale=1"/>
                    <title>{title}</title>
                    <link rel="stylesheet" href="/assets/app.css"/>
                </head>
                <body>
                    <main class="page">{body}</main>
                </body>
            </html>
        }
        .to_html()
    });
    format!("<!DOCTYPE html>{html}")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
