//! User selection screen and the shared household picker.

use leptos::prelude::*;

use crate::services::item::HouseholdMember;

/// Household member dropdown posting to `/users`.
#[component]
pub fn UserPicker(selected: Option<HouseholdMember>, submit_label: &'static str) -> impl IntoView {
    let options = HouseholdMember::ALL
        .into_iter()
        .map(|member| {
            let is_selected = selected == Some(member);
            view! {
                <option value=member.key() selected=is_selected>
                    {member.label()}
                </option>
            }
        })
        .collect_view();

    let nobody = selected.is_none();

    view! {
        <form class="user-picker" method="post" action="/users">
            <label class="field">
                <span class="field__label">"User"</span>
                <select class="field__input" name="user" required=true>
                    <option value="" disabled=true selected=nobody>"Choose..."</option>
                    {options}
                </select>
            </label>
            <button class="button button--contained" type="submit">{submit_label}</button>
        </form>
    }
}

/// "Who are you?" screen. `error` is shown when the last pick was rejected.
#[component]
pub fn UsersPage(selected: Option<HouseholdMember>, error: Option<String>) -> impl IntoView {
    view! {
        <section class="card">
            <h2 class="card__title">"Who are you?"</h2>
            {error.map(|message| view! { <p class="alert alert--error">{message}</p> })}
            <UserPicker selected=selected submit_label="Next"/>
        </section>
    }
}
