//! Export service: builds the zip archive of per-item folders.
//!
//! DESIGN
//! ======
//! Items are snapshotted by the caller (attachments are reference-counted,
//! so the copy is cheap), then the archive is built on the blocking pool.
//! Layout, for the item at list position `i`:
//!
//! ```text
//! {i+1}_{name}/info.txt
//! {i+1}_{name}/data.json
//! {i+1}_{name}/image_{k+1}_{name}.{ext}
//! ```
//!
//! ERROR HANDLING
//! ==============
//! Every failure comes back as an `ExportError`; there is no retry and no
//! partial archive.

use std::io::{Cursor, Write};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::item::{Amount, Category, HouseholdMember, Item};

pub const INFO_FILE: &str = "info.txt";
pub const DATA_FILE: &str = "data.json";
pub const UNTIMESTAMPED_FILE_NAME: &str = "items.zip";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("item serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExportError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Zip(_) => "E_EXPORT_ZIP",
            Self::Io(_) => "E_EXPORT_IO",
            Self::Json(_) => "E_EXPORT_JSON",
            Self::Task(_) => "E_EXPORT_TASK",
        }
    }
}

/// How the downloaded archive is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveNaming {
    /// `items_{unix_ms}.zip`
    Timestamped,
    /// `items.zip`
    Fixed,
}

impl ArchiveNaming {
    #[must_use]
    pub fn file_name(self, now_ms: i64) -> String {
        match self {
            Self::Timestamped => format!("items_{now_ms}.zip"),
            Self::Fixed => UNTIMESTAMPED_FILE_NAME.to_owned(),
        }
    }
}

/// A finished archive ready to hand to the browser.
#[derive(Debug, Clone)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub item_count: usize,
}

/// `data.json` shape. Field order is part of the export format.
#[derive(Debug, Serialize)]
pub struct ItemRecord<'a> {
    id: &'a str,
    name: &'a str,
    user: HouseholdMember,
    category: Category,
    quantity: u32,
    serial_numbers: &'a [String],
    initial_value: Amount,
    estimated_value: Amount,
    value_link: &'a str,
    notes: &'a str,
    images: Vec<String>,
}

impl<'a> ItemRecord<'a> {
    /// Record for `item` with attachments replaced by their archive file names.
    #[must_use]
    pub fn from_item(item: &'a Item) -> Self {
        Self {
            id: &item.id,
            name: &item.name,
            user: item.user,
            category: item.category,
            quantity: item.quantity,
            serial_numbers: &item.serial_numbers,
            initial_value: item.initial_value,
            estimated_value: item.estimated_value,
            value_link: item.value_link.as_deref().unwrap_or_default(),
            notes: &item.notes,
            images: image_file_names(item),
        }
    }
}

// =============================================================================
// NAMING
// =============================================================================

/// Make an item name safe to use as a path segment: whitespace runs become a
/// single `_`, and path separators, reserved and control characters become `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    if out.is_empty() || out.chars().all(|c| c == '.') {
        return "item".to_owned();
    }
    out
}

/// Folder name for the item at zero-based `index`.
#[must_use]
pub fn folder_name(index: usize, item: &Item) -> String {
    format!("{}_{}", index + 1, sanitize_name(&item.name))
}

/// Archive file names of an item's images, in attachment order.
#[must_use]
pub fn image_file_names(item: &Item) -> Vec<String> {
    let name = sanitize_name(&item.name);
    item.images
        .iter()
        .enumerate()
        .map(|(k, image)| format!("image_{}_{name}.{}", k + 1, image.extension()))
        .collect()
}

// =============================================================================
// CONTENT
// =============================================================================

/// Human-readable `info.txt` body.
#[must_use]
pub fn render_summary(item: &Item) -> String {
    [
        format!("id: {}", item.id),
        format!("name: {}", item.name),
        format!("user: {}", item.user.key()),
        format!("category: {}", item.category.key()),
        format!("quantity: {}", item.quantity),
        format!("serial_numbers: {}", item.serial_numbers.join(", ")),
        format!("initial_value: ${}", item.initial_value),
        format!("estimated_value: ${}", item.estimated_value),
        format!("value_link: {}", item.value_link.as_deref().unwrap_or_default()),
        format!("notes: {}", item.notes),
    ]
    .join("\n")
}

/// `data.json` body: the item with images replaced by their archive names,
/// pretty-printed with four-space indentation.
///
/// # Errors
///
/// Returns a JSON error if serialization fails.
pub fn render_record(item: &Item) -> Result<Vec<u8>, serde_json::Error> {
    let record = ItemRecord::from_item(item);

    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut serializer)?;
    Ok(buf)
}

// =============================================================================
// ARCHIVE
// =============================================================================

/// Build the zip archive for `items`, one folder per item in list order.
///
/// # Errors
///
/// Returns an error if any entry cannot be serialized or written.
pub fn build_archive(items: &[Item]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (index, item) in items.iter().enumerate() {
        let folder = folder_name(index, item);
        zip.add_directory(format!("{folder}/"), options)?;

        zip.start_file(format!("{folder}/{INFO_FILE}"), options)?;
        zip.write_all(render_summary(item).as_bytes())?;

        zip.start_file(format!("{folder}/{DATA_FILE}"), options)?;
        zip.write_all(&render_record(item)?)?;

        // Photos are already compressed.
        for (image, file_name) in item.images.iter().zip(image_file_names(item)) {
            zip.start_file(format!("{folder}/{file_name}"), stored)?;
            zip.write_all(&image.bytes)?;
        }
    }

    Ok(zip.finish()?.into_inner())
}

/// Build the archive off the async runtime and name it for download.
///
/// # Errors
///
/// Returns an error if the build fails or the blocking task panics.
pub async fn export_items(items: Vec<Item>, naming: ArchiveNaming, now_ms: i64) -> Result<Archive, ExportError> {
    let item_count = items.len();
    let bytes = tokio::task::spawn_blocking(move || build_archive(&items)).await??;
    let file_name = naming.file_name(now_ms);
    info!(item_count, bytes = bytes.len(), %file_name, "archive built");
    Ok(Archive { file_name, bytes, item_count })
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
