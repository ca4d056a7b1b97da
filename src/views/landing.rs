//! Landing screen.

use leptos::prelude::*;

/// Title card with a Start button. Starting always begins a fresh session.
#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <section class="card">
            <h1 class="card__title">"Insurance App"</h1>
            <form method="post" action="/start">
                <button class="button button--contained button--full" type="submit">"Start"</button>
            </form>
        </section>
    }
}
