//! Dublin Core projection of book records.
//!
//! This module converts a [`BookRecord`] into the two shapes the
//! protocol emits per record:
//!
//! - [`RecordHeader`] — the identifier/datestamp/setSpec envelope that
//!   accompanies every record, deleted or not
//! - [`DublinCore`] — the `oai_dc` metadata body, absent for deleted
//!   records
//!
//! Authorship mapping accumulates every present creator-type role —
//! organizer, individual author, corporate author, in that order — into
//! repeated `dc:creator` entries, and every present contributor-type
//! role — collaborator, translator, editor — into repeated
//! `dc:contributor` entries. A role absent from the record contributes
//! nothing.
//!
//! # Examples
//!
//! ```
//! use oai_books::dublin_core;
//! use oai_books::{BookRecord, CreatorRole};
//!
//! # fn main() -> oai_books::Result<()> {
//! let record = BookRecord::builder("37t")
//!     .title("Compendio")
//!     .publisher("Editora UNESP")
//!     .datestamp_str("2014-02-04")?
//!     .creator(CreatorRole::Organizer, "Szmrecsanyi, Tamas", None)
//!     .build();
//!
//! let header = dublin_core::header(&record);
//! assert_eq!(header.set_spec, "editora-unesp");
//!
//! let dc = dublin_core::metadata(&record, "http://books.scielo.org/id/")
//!     .expect("record is not deleted");
//! assert_eq!(dc.creator, ["Szmrecsanyi, Tamas"]);
//! # Ok(())
//! # }
//! ```

use crate::record::{BookRecord, CONTRIBUTOR_ROLES, CREATOR_ROLES};

/// The identifier/datestamp/set envelope accompanying every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record identifier.
    pub identifier: String,
    /// Datestamp formatted `YYYY-MM-DD`.
    pub datestamp: String,
    /// Publisher slug used as the record's set.
    pub set_spec: String,
    /// Whether the header belongs to a deletion tombstone.
    pub deleted: bool,
}

/// The `oai_dc` metadata body of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCore {
    /// dc:title
    pub title: String,
    /// dc:creator, one entry per creator-role name
    pub creator: Vec<String>,
    /// dc:contributor, one entry per contributor-role name
    pub contributor: Vec<String>,
    /// dc:description
    pub description: String,
    /// dc:publisher
    pub publisher: String,
    /// dc:date
    pub date: String,
    /// dc:type, always `"book"`
    pub dc_type: &'static str,
    /// dc:format, one entry per listed format
    pub format: Vec<String>,
    /// dc:identifier, the configured base URL plus the record identifier
    pub identifier: String,
    /// dc:language
    pub language: String,
}

/// Slugify a publisher name into a `setSpec` value.
///
/// Lower-cases, trims, and replaces spaces with hyphens — the inverse of
/// the hyphen-to-space translation the record filter applies to the
/// `set` argument.
#[must_use]
pub fn slugify(publisher: &str) -> String {
    publisher.to_lowercase().trim().replace(' ', "-")
}

/// Project a record into its header.
#[must_use]
pub fn header(record: &BookRecord) -> RecordHeader {
    RecordHeader {
        identifier: record.identifier.clone(),
        datestamp: record.datestamp.format("%Y-%m-%d").to_string(),
        set_spec: slugify(&record.publisher),
        deleted: record.deleted,
    }
}

/// Project a record into its Dublin Core metadata body.
///
/// Returns `None` for deleted records: a tombstone keeps emitting its
/// header but must never render a metadata body.
#[must_use]
pub fn metadata(record: &BookRecord, identifier_base: &str) -> Option<DublinCore> {
    if record.deleted {
        return None;
    }

    let creator = collect_names(record, &CREATOR_ROLES);
    let contributor = collect_names(record, &CONTRIBUTOR_ROLES);
    if creator.is_empty() {
        tracing::info!(identifier = %record.identifier, "record carries no creator role");
    }

    Some(DublinCore {
        title: record.title.clone(),
        creator,
        contributor,
        description: record.description.clone(),
        publisher: record.publisher.clone(),
        date: record.date.clone(),
        dc_type: "book",
        format: record.formats.iter().cloned().collect(),
        identifier: format!("{identifier_base}{}", record.identifier),
        language: record.language.clone(),
    })
}

fn collect_names(record: &BookRecord, roles: &[crate::record::CreatorRole]) -> Vec<String> {
    roles
        .iter()
        .flat_map(|role| record.creators_for(*role))
        .map(|creator| creator.name.clone())
        .collect()
}
