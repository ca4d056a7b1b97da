//! Item model and the per-session item list.
//!
//! DESIGN
//! ======
//! Items are immutable once added: the list only supports append, remove by
//! id, and clear. Insertion order is the only order ever used, both for
//! rendering and for the export folder numbering.

use std::fmt;

use axum::body::Bytes;
use serde::{Serialize, Serializer};

// =============================================================================
// HOUSEHOLD ROSTER
// =============================================================================

/// The fixed roster of people who can own a cataloged item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseholdMember {
    Guillermo,
    Sofia,
    GuillermoJr,
    Pablo,
    Alvaro,
    Diego,
}

impl HouseholdMember {
    pub const ALL: [Self; 6] =
        [Self::Guillermo, Self::Sofia, Self::GuillermoJr, Self::Pablo, Self::Alvaro, Self::Diego];

    /// Stable key used in forms, `info.txt`, and `data.json`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Guillermo => "guillermo",
            Self::Sofia => "sofia",
            Self::GuillermoJr => "guillermo_jr",
            Self::Pablo => "pablo",
            Self::Alvaro => "alvaro",
            Self::Diego => "diego",
        }
    }

    /// Display label shown in the user pickers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Guillermo => "Paps",
            Self::Sofia => "Mams",
            Self::GuillermoJr => "Guillo",
            Self::Pablo => "Pablo",
            Self::Alvaro => "Álvaro",
            Self::Diego => "Diego",
        }
    }

    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|member| member.key() == raw.trim())
    }
}

impl Serialize for HouseholdMember {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

// =============================================================================
// CATEGORY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Unspecified,
    Electronicos,
    Muebles,
    Joyeria,
    Ropa,
}

impl Category {
    /// Categories offered by the entry form, in display order.
    pub const SELECTABLE: [Self; 4] = [Self::Electronicos, Self::Muebles, Self::Joyeria, Self::Ropa];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Unspecified => "N/A",
            Self::Electronicos => "electronicos",
            Self::Muebles => "muebles",
            Self::Joyeria => "joyeria",
            Self::Ropa => "ropa",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unspecified => "N/A",
            Self::Electronicos => "Electrónicos",
            Self::Muebles => "Muebles",
            Self::Joyeria => "Joyería",
            Self::Ropa => "Ropa",
        }
    }

    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("n/a") {
            return Some(Self::Unspecified);
        }
        Self::SELECTABLE.into_iter().find(|category| category.key() == raw)
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

// =============================================================================
// AMOUNT
// =============================================================================

/// Non-negative monetary amount held as whole cents.
///
/// Whole amounts print and serialize without a fractional part (`600`), so
/// exported records read the way they were typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount {
    cents: u64,
}

impl Amount {
    pub const ZERO: Self = Self { cents: 0 };

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Parse a decimal amount. Rejects negatives, non-finite values and
    /// anything that is not a number; rounds to the nearest cent.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return None;
        }
        Some(Self::from_cents(cents as u64))
    }

    fn is_whole(self) -> bool {
        self.cents % 100 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.cents / 100;
        let frac = self.cents % 100;
        if frac == 0 {
            write!(f, "{whole}")
        } else if frac % 10 == 0 {
            write!(f, "{whole}.{}", frac / 10)
        } else {
            write!(f, "{whole}.{frac:02}")
        }
    }
}

impl Serialize for Amount {
    #[allow(clippy::cast_precision_loss)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_u64(self.cents / 100)
        } else {
            serializer.serialize_f64(self.cents as f64 / 100.0)
        }
    }
}

// =============================================================================
// ATTACHMENT
// =============================================================================

/// One uploaded image. Bytes are reference-counted so snapshots are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as supplied by the browser (may be empty).
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Attachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self { file_name: file_name.into(), content_type: content_type.into(), bytes: bytes.into() }
    }

    /// File extension used when the image is written into an archive.
    #[must_use]
    pub fn extension(&self) -> String {
        let from_type = match self.content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/heic" => Some("heic"),
            "image/heif" => Some("heif"),
            "image/bmp" => Some("bmp"),
            "image/tiff" => Some("tiff"),
            _ => None,
        };
        if let Some(ext) = from_type {
            return ext.to_owned();
        }

        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_owned())
    }
}

// =============================================================================
// ITEM
// =============================================================================

/// Everything about an item except its id. Produced by the form parser and
/// completed by the route with the session user and attachments.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub user: HouseholdMember,
    pub category: Category,
    pub quantity: u32,
    pub serial_numbers: Vec<String>,
    pub initial_value: Amount,
    pub estimated_value: Amount,
    pub value_link: Option<String>,
    pub notes: String,
    pub images: Vec<Attachment>,
}

/// One insured belonging. Never mutated after it is added to a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub user: HouseholdMember,
    pub category: Category,
    pub quantity: u32,
    pub serial_numbers: Vec<String>,
    pub initial_value: Amount,
    pub estimated_value: Amount,
    pub value_link: Option<String>,
    pub notes: String,
    pub images: Vec<Attachment>,
}

impl Item {
    fn from_draft(id: String, draft: ItemDraft) -> Self {
        let ItemDraft {
            name,
            user,
            category,
            quantity,
            serial_numbers,
            initial_value,
            estimated_value,
            value_link,
            notes,
            images,
        } = draft;
        Self {
            id,
            name,
            user,
            category,
            quantity,
            serial_numbers,
            initial_value,
            estimated_value,
            value_link,
            notes,
            images,
        }
    }
}

// =============================================================================
// ITEM LIST
// =============================================================================

/// Ordered, append-only (plus delete) collection of items for one session.
#[derive(Debug, Clone, Default)]
pub struct ItemList {
    items: Vec<Item>,
}

impl ItemList {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a new item built from `draft`, returning the stored item.
    ///
    /// The id is `{now_ms}-{name}`; a `-{n}` suffix keeps it unique when two
    /// items with the same name land in the same millisecond.
    pub fn add(&mut self, draft: ItemDraft, now_ms: i64) -> &Item {
        let base = format!("{now_ms}-{}", draft.name);
        let mut id = base.clone();
        let mut counter = 2_u32;
        while self.contains(&id) {
            id = format!("{base}-{counter}");
            counter = counter.saturating_add(1);
        }

        self.items.push(Item::from_draft(id, draft));
        let last = self.items.len() - 1;
        &self.items[last]
    }

    /// Remove the item with `id`. Returns `None` (and changes nothing) when
    /// no such item exists.
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[path = "item_test.rs"]
mod tests;
