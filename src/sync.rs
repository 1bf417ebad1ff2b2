//! Upstream catalog adaptation.
//!
//! The record store is populated by a synchronization job that watches
//! an upstream books API. The network conversation belongs to that job;
//! this module owns the boundary the job writes through: adapting an
//! upstream JSON payload into a [`BookRecord`] and applying the result
//! to a [`CatalogWriter`].
//!
//! Adaptation follows a fixed field map — upstream `_id` becomes the
//! record identifier, `synopsis` the description, `year` the display
//! date — and the presence of `pdf_file`/`epub_file` keys adds the
//! matching entry to the record's format list. Unknown creator roles
//! are skipped with a warning rather than rejecting the payload.

use chrono::Utc;
use serde_json::Value;

use crate::error::{OaiError, Result};
use crate::record::{BookRecord, Creator, CreatorRole};
use crate::store::CatalogWriter;

/// Upstream file-attachment keys and the format each one advertises.
const FORMAT_KEYS: [(&str, &str); 2] = [("pdf_file", "pdf"), ("epub_file", "epub")];

/// Adapt an upstream catalog payload into a book record.
///
/// The record's datestamp is stamped with the current UTC date; the
/// `updated` value is passed through when the payload carries one and
/// defaults to the same date otherwise.
///
/// # Errors
///
/// Returns [`OaiError::Sync`] when the payload is not a JSON object or
/// lacks a string `_id`.
pub fn adapt_record(data: &Value) -> Result<BookRecord> {
    let object = data
        .as_object()
        .ok_or_else(|| OaiError::Sync("payload is not an object".to_string()))?;
    let identifier = object
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| OaiError::Sync("payload has no _id".to_string()))?;

    let today = Utc::now().date_naive();
    let mut builder = BookRecord::builder(identifier)
        .title(string_field(object, "title"))
        .publisher(string_field(object, "publisher"))
        .language(string_field(object, "language"))
        .description(string_field(object, "synopsis"))
        .date(display_date(object))
        .datestamp(today)
        .updated(match object.get("updated").and_then(Value::as_str) {
            Some(updated) => updated.to_string(),
            None => today.format("%Y-%m-%d").to_string(),
        });

    for (key, format) in FORMAT_KEYS {
        if object.contains_key(key) {
            builder = builder.format(format);
        }
    }

    let mut record = builder.build();
    if let Some(roles) = object.get("creators").and_then(Value::as_object) {
        for (name, entries) in roles {
            let Some(role) = CreatorRole::from_name(name) else {
                tracing::warn!(identifier, role = %name, "skipping unknown creator role");
                continue;
            };
            let entries: Vec<Creator> = serde_json::from_value(entries.clone())
                .map_err(|e| OaiError::Sync(format!("bad creator entries for {name}: {e}")))?;
            record.creators.insert(role, entries);
        }
    }

    Ok(record)
}

fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// The upstream `year` may arrive as a number or a string.
fn display_date(object: &serde_json::Map<String, Value>) -> String {
    match object.get("year") {
        Some(Value::String(year)) => year.clone(),
        Some(Value::Number(year)) => year.to_string(),
        _ => String::new(),
    }
}

/// Adapt and persist one upstream payload; returns the identifier.
///
/// # Errors
///
/// Returns [`OaiError::Sync`] for unusable payloads and
/// [`OaiError::Store`] for store failures.
pub fn ingest(writer: &mut dyn CatalogWriter, data: &Value) -> Result<String> {
    let record = adapt_record(data)?;
    let identifier = record.identifier.clone();
    writer.upsert(record)?;
    tracing::info!(identifier = %identifier, "saved book");
    Ok(identifier)
}

/// Apply an upstream deletion as a tombstone.
///
/// # Errors
///
/// Returns [`OaiError::Store`] for store failures.
pub fn retract(writer: &mut dyn CatalogWriter, identifier: &str) -> Result<()> {
    writer.mark_deleted(identifier)?;
    tracing::info!(identifier, "marked book as deleted");
    Ok(())
}
