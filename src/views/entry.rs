//! Item entry screen: user gate, item list, and the add-item dialog.
//!
//! DESIGN
//! ======
//! The dialog is open when the page is requested with `?dialog=open` or when
//! a submission is re-rendered (rejected, or an image was just captured).
//! Every control that changes the list is disabled until a user is chosen.

use leptos::prelude::*;

use crate::services::form::RawFields;
use crate::services::item::{Category, HouseholdMember, Item};
use crate::state::Session;

use super::users::UserPicker;

/// Buttons inside the add-item form post an `intent` naming the action.
pub const INTENT_FIELD: &str = "intent";
pub const INTENT_ADD: &str = "add";
pub const INTENT_CAPTURE: &str = "capture";
pub const INTENT_CANCEL: &str = "cancel";

/// File inputs carrying picture uploads: the single-shot camera input and
/// the multi-select picker.
pub const IMAGES_FIELD: &str = "images";

/// One rendered row of the item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: String,
    pub primary: String,
    pub secondary: String,
}

impl ItemRow {
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            primary: format!("{} ({}) x{}", item.name, item.category.key(), item.quantity),
            secondary: format!("Initial: ${} | Est: ${}", item.initial_value, item.estimated_value),
        }
    }
}

/// Everything the entry screen needs, detached from the session lock.
#[derive(Debug, Clone, Default)]
pub struct EntryView {
    pub user: Option<HouseholdMember>,
    pub rows: Vec<ItemRow>,
    pub dialog_open: bool,
    pub staged_count: usize,
    /// Field errors that blocked the last submission.
    pub errors: Vec<String>,
    /// Coercion notices from the last accepted submission.
    pub notices: Vec<String>,
    /// Values to pre-fill the dialog with after a re-render.
    pub values: RawFields,
}

impl EntryView {
    #[must_use]
    pub fn from_session(session: &Session, dialog_open: bool) -> Self {
        Self {
            user: session.user,
            rows: session.items.items().iter().map(ItemRow::from_item).collect(),
            dialog_open,
            staged_count: session.staged_images.len(),
            errors: Vec::new(),
            notices: session.notices.iter().map(ToString::to_string).collect(),
            values: RawFields::new(),
        }
    }
}

#[component]
fn ItemRowView(row: ItemRow) -> impl IntoView {
    view! {
        <li class="item-list__row">
            <div class="item-list__text">
                <span class="item-list__primary">{row.primary}</span>
                <span class="item-list__secondary">{row.secondary}</span>
            </div>
            <form method="post" action="/items/delete">
                <input type="hidden" name="id" value=row.id/>
                <button class="button button--outlined button--danger" type="submit" aria-label="Delete item">
                    "X"
                </button>
            </form>
        </li>
    }
}

#[component]
fn ItemDialog(staged_count: usize, errors: Vec<String>, values: RawFields) -> impl IntoView {
    let value = |name: &str| values.get(name).unwrap_or_default().to_owned();
    let chosen_category = values.get("category").and_then(Category::from_key);
    let quantity = values.get("quantity").map_or_else(|| "1".to_owned(), str::to_owned);
    let notes = value("notes");
    let no_category = chosen_category.is_none();

    let categories = Category::SELECTABLE
        .into_iter()
        .map(|category| {
            let is_chosen = chosen_category == Some(category);
            view! {
                <option value=category.key() selected=is_chosen>
                    {category.label()}
                </option>
            }
        })
        .collect_view();

    let previews = (0..staged_count)
        .map(|index| {
            view! {
                <img
                    class="preview"
                    src=format!("/items/images/{index}")
                    alt=format!("Preview {index}")
                    width="50"
                    height="50"
                />
            }
        })
        .collect_view();

    let error_list = (!errors.is_empty()).then(|| {
        let items = errors.into_iter().map(|message| view! { <li>{message}</li> }).collect_view();
        view! { <ul class="alert alert--error">{items}</ul> }
    });

    view! {
        <div class="dialog">
            <form
                id="add-item-form"
                class="dialog__panel"
                method="post"
                action="/items"
                enctype="multipart/form-data"
            >
                // First submit button in tree order; pressing Enter submits it.
                <button
                    class="visually-hidden"
                    type="submit"
                    name=INTENT_FIELD
                    value=INTENT_ADD
                    tabindex="-1"
                    aria-hidden="true"
                >
                    "Add"
                </button>
                <h3 class="dialog__title">"Add New Item"</h3>
                {error_list}
                <div class="dialog__content">
                    <label class="field">
                        <span class="field__label">"Name"</span>
                        <input class="field__input" type="text" name="name" value=value("name")/>
                    </label>
                    <label class="field">
                        <span class="field__label">"Category"</span>
                        <select class="field__input" name="category">
                            <option value="" selected=no_category>"N/A"</option>
                            {categories}
                        </select>
                    </label>
                    <label class="field">
                        <span class="field__label">"Quantity"</span>
                        <input class="field__input" type="number" name="quantity" min="0" value=quantity/>
                    </label>
                    <label class="field">
                        <span class="field__label">"Serial Numbers (x,y)"</span>
                        <input class="field__input" type="text" name="serial_numbers" value=value("serial_numbers")/>
                    </label>
                    <div class="field-row">
                        <label class="field">
                            <span class="field__label">"Initial Value"</span>
                            <input
                                class="field__input"
                                type="number"
                                name="initial_value"
                                min="0"
                                step="0.01"
                                value=value("initial_value")
                            />
                        </label>
                        <label class="field">
                            <span class="field__label">"Estimated Value"</span>
                            <input
                                class="field__input"
                                type="number"
                                name="estimated_value"
                                min="0"
                                step="0.01"
                                value=value("estimated_value")
                            />
                        </label>
                    </div>
                    <label class="field">
                        <span class="field__label">"Value Link"</span>
                        <input class="field__input" type="text" name="value_link" value=value("value_link")/>
                    </label>
                    <label class="field">
                        <span class="field__label">"Notes"</span>
                        <textarea class="field__input" name="notes" rows="3">{notes}</textarea>
                    </label>
                    <label class="field">
                        <span class="field__label">"Camera"</span>
                        <input
                            class="field__input"
                            type="file"
                            name=IMAGES_FIELD
                            accept="image/*"
                            capture="environment"
                        />
                    </label>
                    <label class="field">
                        <span class="field__label">"Pictures"</span>
                        <input class="field__input" type="file" name=IMAGES_FIELD accept="image/*" multiple=true/>
                    </label>
                    <button class="button button--outlined" type="submit" name=INTENT_FIELD value=INTENT_CAPTURE>
                        "Take Picture"
                    </button>
                    <div class="previews">{previews}</div>
                </div>
                <div class="dialog__actions">
                    <button class="button" type="submit" name=INTENT_FIELD value=INTENT_CANCEL>"Cancel"</button>
                    <button class="button button--contained" type="submit" name=INTENT_FIELD value=INTENT_ADD>
                        "Add"
                    </button>
                </div>
            </form>
        </div>
    }
}

#[component]
pub fn EntryPage(page: EntryView) -> impl IntoView {
    let EntryView { user, rows, dialog_open, staged_count, errors, notices, values } = page;
    let has_user = user.is_some();
    let has_items = !rows.is_empty();
    let card_class = if has_user { "card" } else { "card card--disabled" };
    let clear_disabled = !has_user || !has_items;
    let add_disabled = !has_user;

    let notice_list = (!notices.is_empty()).then(|| {
        let items = notices.into_iter().map(|message| view! { <li>{message}</li> }).collect_view();
        view! { <ul class="alert alert--notice">{items}</ul> }
    });
    let row_views = rows.into_iter().map(|row| view! { <ItemRowView row=row/> }).collect_view();
    let download = has_items.then(|| {
        view! {
            <a class="button button--outlined button--full" href="/export">"Download All Items"</a>
        }
    });
    let dialog = (dialog_open && has_user)
        .then(|| view! { <ItemDialog staged_count=staged_count errors=errors values=values/> });

    view! {
        <section class="card">
            <h2 class="card__title">"Who are you?"</h2>
            <UserPicker selected=user submit_label="Select"/>
        </section>
        <section class=card_class>
            <h2 class="card__title">"Add Items"</h2>
            {notice_list}
            <div class="actions">
                <form method="post" action="/items/clear">
                    <button
                        class="button button--contained button--danger"
                        type="submit"
                        disabled=clear_disabled
                    >
                        "Clear Items"
                    </button>
                </form>
                <form method="get" action="/add">
                    <input type="hidden" name="dialog" value="open"/>
                    <button class="button button--contained" type="submit" disabled=add_disabled>
                        "Add New Item"
                    </button>
                </form>
            </div>
            <ul class="item-list">
                <li class="item-list__header">"Items"</li>
                {row_views}
            </ul>
            {download}
        </section>
        {dialog}
    }
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;
