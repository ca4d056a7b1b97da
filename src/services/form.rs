//! Typed parser for item-entry submissions.
//!
//! DESIGN
//! ======
//! Each form field has a rule: the field name, a parser from raw text, and
//! the default used when the field is blank or absent. Blank input takes the
//! default silently. Input that is present but does not parse also takes the
//! default, but is reported back as a `FieldIssue` so the entry screen can
//! say what happened.
//!
//! | field             | parser          | default |
//! |-------------------|-----------------|---------|
//! | `name`            | required text   | reject  |
//! | `category`        | roster key      | `N/A`   |
//! | `quantity`        | whole number    | `0`     |
//! | `serial_numbers`  | comma list      | `[]`    |
//! | `initial_value`   | decimal amount  | `0`     |
//! | `estimated_value` | decimal amount  | `0`     |
//! | `value_link`      | trimmed text    | none    |
//! | `notes`           | free text       | `""`    |

use std::collections::HashMap;
use std::fmt;

use super::item::{Amount, Attachment, Category, HouseholdMember, ItemDraft};

// =============================================================================
// RAW FIELDS
// =============================================================================

/// Text fields of one submission, keyed by form field name.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    values: HashMap<String, String>,
}

impl RawFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field value. Repeated names keep the first value, matching
    /// how browsers resolve `FormData.get`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_insert_with(|| value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

// =============================================================================
// FIELD RULES
// =============================================================================

/// Parser and default for one optional form field.
pub struct FieldRule<T: 'static> {
    pub name: &'static str,
    pub parse: fn(&str) -> Option<T>,
    pub default: fn() -> T,
}

pub const NAME_FIELD: &str = "name";

pub const CATEGORY: FieldRule<Category> =
    FieldRule { name: "category", parse: Category::from_key, default: Category::default };
pub const QUANTITY: FieldRule<u32> = FieldRule { name: "quantity", parse: parse_count, default: zero_count };
pub const SERIAL_NUMBERS: FieldRule<Vec<String>> =
    FieldRule { name: "serial_numbers", parse: parse_serials, default: Vec::new };
pub const INITIAL_VALUE: FieldRule<Amount> =
    FieldRule { name: "initial_value", parse: Amount::parse, default: zero_amount };
pub const ESTIMATED_VALUE: FieldRule<Amount> =
    FieldRule { name: "estimated_value", parse: Amount::parse, default: zero_amount };
pub const VALUE_LINK: FieldRule<Option<String>> = FieldRule { name: "value_link", parse: parse_link, default: no_link };
pub const NOTES: FieldRule<String> = FieldRule { name: "notes", parse: parse_notes, default: String::new };

fn zero_count() -> u32 {
    0
}

fn zero_amount() -> Amount {
    Amount::ZERO
}

fn no_link() -> Option<String> {
    None
}

/// Whole, non-negative count. `"3.0"` is accepted as 3; `"2.5"` is not.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(count) = raw.parse::<u32>() {
        return Some(count);
    }
    let value: f64 = raw.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        return Some(value as u32);
    }
    None
}

fn parse_serials(raw: &str) -> Option<Vec<String>> {
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|serial| !serial.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn parse_link(raw: &str) -> Option<Option<String>> {
    Some(Some(raw.trim().to_owned()))
}

fn parse_notes(raw: &str) -> Option<String> {
    Some(raw.to_owned())
}

// =============================================================================
// ISSUES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field was blank or absent.
    Missing,
    /// Value did not parse and was replaced by the field default.
    Coerced { raw: String },
}

/// A field-level problem found while parsing a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.field),
            IssueKind::Coerced { raw } => {
                write!(f, "{} value {raw:?} was not understood and was set to the default", self.field)
            }
        }
    }
}

/// Submission rejected; nothing should be added to the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item submission rejected: {}", summarize(.issues))]
pub struct FormRejected {
    pub issues: Vec<FieldIssue>,
}

impl FormRejected {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        "E_FORM_REJECTED"
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Parsed item fields. The session user and attachments are supplied by the
/// caller via [`Submission::into_draft`].
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub category: Category,
    pub quantity: u32,
    pub serial_numbers: Vec<String>,
    pub initial_value: Amount,
    pub estimated_value: Amount,
    pub value_link: Option<String>,
    pub notes: String,
    /// Values that were present but replaced by a default.
    pub issues: Vec<FieldIssue>,
}

impl Submission {
    #[must_use]
    pub fn into_draft(self, user: HouseholdMember, images: Vec<Attachment>) -> ItemDraft {
        ItemDraft {
            name: self.name,
            user,
            category: self.category,
            quantity: self.quantity,
            serial_numbers: self.serial_numbers,
            initial_value: self.initial_value,
            estimated_value: self.estimated_value,
            value_link: self.value_link,
            notes: self.notes,
            images,
        }
    }
}

/// Parse one entry-form submission.
///
/// # Errors
///
/// Returns `FormRejected` when the name is blank or absent.
pub fn parse_submission(fields: &RawFields) -> Result<Submission, FormRejected> {
    let name = fields.get(NAME_FIELD).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(FormRejected { issues: vec![FieldIssue { field: NAME_FIELD, kind: IssueKind::Missing }] });
    }

    let mut issues = Vec::new();
    let category = read(fields, &CATEGORY, &mut issues);
    let quantity = read(fields, &QUANTITY, &mut issues);
    let serial_numbers = read(fields, &SERIAL_NUMBERS, &mut issues);
    let initial_value = read(fields, &INITIAL_VALUE, &mut issues);
    let estimated_value = read(fields, &ESTIMATED_VALUE, &mut issues);
    let value_link = read(fields, &VALUE_LINK, &mut issues);
    let notes = read(fields, &NOTES, &mut issues);

    Ok(Submission {
        name: name.to_owned(),
        category,
        quantity,
        serial_numbers,
        initial_value,
        estimated_value,
        value_link,
        notes,
        issues,
    })
}

fn read<T>(fields: &RawFields, rule: &FieldRule<T>, issues: &mut Vec<FieldIssue>) -> T {
    let Some(raw) = fields.get(rule.name).filter(|raw| !raw.trim().is_empty()) else {
        return (rule.default)();
    };
    if let Some(value) = (rule.parse)(raw) {
        return value;
    }
    issues.push(FieldIssue { field: rule.name, kind: IssueKind::Coerced { raw: raw.to_owned() } });
    (rule.default)()
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
