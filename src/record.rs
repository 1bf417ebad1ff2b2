//! Book record structures.
//!
//! This module provides the core record types for the repository:
//! - [`BookRecord`] — a harvestable book record as held by the store
//! - [`Creator`] — a name/affiliation pair attached to a record
//! - [`CreatorRole`] — the closed set of authorship roles
//!
//! Records are owned by the record store: the synchronization side
//! creates and updates them, the protocol engine only reads them. A
//! record marked `deleted` keeps its identifier, datestamp, and
//! publisher so its header can still be emitted, but its metadata body
//! is never rendered.
//!
//! # Examples
//!
//! Create a record with the builder API:
//!
//! ```
//! use oai_books::{BookRecord, CreatorRole};
//!
//! # fn main() -> oai_books::Result<()> {
//! let record = BookRecord::builder("37t")
//!     .title("Compendio de historia economica")
//!     .publisher("Edufba")
//!     .language("pt")
//!     .datestamp_str("2014-02-04")?
//!     .format("pdf")
//!     .creator(CreatorRole::Organizer, "Szmrecsanyi, Tamas", None)
//!     .build();
//!
//! assert_eq!(record.identifier, "37t");
//! assert!(!record.deleted);
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ProtocolError, Result};

/// Authorship roles recognized by the upstream catalog.
///
/// The wire names use snake case (`"individual_author"` and so on),
/// matching the upstream catalog payloads. Roles split into two groups
/// for Dublin Core mapping: creator-type roles map to `dc:creator`,
/// contributor-type roles to `dc:contributor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorRole {
    /// A person credited as the book's author.
    IndividualAuthor,
    /// An institution credited as the book's author.
    CorporateAuthor,
    /// The organizer of a collective work.
    Organizer,
    /// A collaborating author.
    Collaborator,
    /// A translator.
    Translator,
    /// An editor.
    Editor,
}

/// Creator-type roles, in the precedence order they map to `dc:creator`.
pub const CREATOR_ROLES: [CreatorRole; 3] = [
    CreatorRole::Organizer,
    CreatorRole::IndividualAuthor,
    CreatorRole::CorporateAuthor,
];

/// Contributor-type roles, in the order they map to `dc:contributor`.
pub const CONTRIBUTOR_ROLES: [CreatorRole; 3] = [
    CreatorRole::Collaborator,
    CreatorRole::Translator,
    CreatorRole::Editor,
];

impl CreatorRole {
    /// The catalog wire name of this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatorRole::IndividualAuthor => "individual_author",
            CreatorRole::CorporateAuthor => "corporate_author",
            CreatorRole::Organizer => "organizer",
            CreatorRole::Collaborator => "collaborator",
            CreatorRole::Translator => "translator",
            CreatorRole::Editor => "editor",
        }
    }

    /// Parse a catalog wire name into a role.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "individual_author" => Some(CreatorRole::IndividualAuthor),
            "corporate_author" => Some(CreatorRole::CorporateAuthor),
            "organizer" => Some(CreatorRole::Organizer),
            "collaborator" => Some(CreatorRole::Collaborator),
            "translator" => Some(CreatorRole::Translator),
            "editor" => Some(CreatorRole::Editor),
            _ => None,
        }
    }
}

/// A name/affiliation pair attached to a record.
///
/// Serialized as a two-element array `["name", "affiliation-or-null"]`,
/// the shape the upstream catalog uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Option<String>)", into = "(String, Option<String>)")]
pub struct Creator {
    /// Personal or corporate name.
    pub name: String,
    /// Affiliation, when the catalog carries one.
    pub affiliation: Option<String>,
}

impl From<(String, Option<String>)> for Creator {
    fn from((name, affiliation): (String, Option<String>)) -> Self {
        Creator { name, affiliation }
    }
}

impl From<Creator> for (String, Option<String>) {
    fn from(creator: Creator) -> Self {
        (creator.name, creator.affiliation)
    }
}

/// A harvestable book record.
///
/// The `creators` map preserves role insertion order (`IndexMap`), and
/// the `formats` list preserves the order the catalog listed them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Unique record identifier, stable across updates.
    pub identifier: String,
    /// Book title.
    #[serde(default)]
    pub title: String,
    /// Publisher name; also the record's set for scoped harvesting.
    #[serde(default)]
    pub publisher: String,
    /// Language code.
    #[serde(default)]
    pub language: String,
    /// Publication date as a display string (usually a year).
    #[serde(default)]
    pub date: String,
    /// Synopsis or abstract.
    #[serde(default)]
    pub description: String,
    /// Chronological field used for sorting and range filtering.
    pub datestamp: NaiveDate,
    /// ISO date of the last upstream change; feeds `earliestDatestamp`.
    #[serde(default)]
    pub updated: String,
    /// Available file formats, e.g. `"pdf"`, `"epub"`.
    #[serde(default)]
    pub formats: SmallVec<[String; 2]>,
    /// Authorship roles and their name entries, in catalog order.
    #[serde(default)]
    pub creators: IndexMap<CreatorRole, Vec<Creator>>,
    /// Tombstone flag; a deleted record renders its header only.
    #[serde(default)]
    pub deleted: bool,
}

impl BookRecord {
    /// Create a builder for fluently constructing book records.
    ///
    /// # Examples
    ///
    /// ```
    /// use oai_books::BookRecord;
    ///
    /// let record = BookRecord::builder("38t")
    ///     .title("Física Básica")
    ///     .publisher("EDUFBA")
    ///     .build();
    /// assert_eq!(record.publisher, "EDUFBA");
    /// ```
    #[must_use]
    pub fn builder(identifier: impl Into<String>) -> BookRecordBuilder {
        BookRecordBuilder {
            record: BookRecord {
                identifier: identifier.into(),
                title: String::new(),
                publisher: String::new(),
                language: String::new(),
                date: String::new(),
                description: String::new(),
                datestamp: NaiveDate::default(),
                updated: String::new(),
                formats: SmallVec::new(),
                creators: IndexMap::new(),
                deleted: false,
            },
        }
    }

    /// All name entries recorded under a role; empty if the role is absent.
    #[must_use]
    pub fn creators_for(&self, role: CreatorRole) -> &[Creator] {
        self.creators.get(&role).map_or(&[], Vec::as_slice)
    }
}

/// Fluent builder for [`BookRecord`].
#[derive(Debug)]
pub struct BookRecordBuilder {
    record: BookRecord,
}

impl BookRecordBuilder {
    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    /// Set the publisher.
    #[must_use]
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.record.publisher = publisher.into();
        self
    }

    /// Set the language code.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.record.language = language.into();
        self
    }

    /// Set the publication date display string.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.record.date = date.into();
        self
    }

    /// Set the synopsis.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    /// Set the chronological datestamp.
    #[must_use]
    pub fn datestamp(mut self, datestamp: NaiveDate) -> Self {
        self.record.datestamp = datestamp;
        self
    }

    /// Set the chronological datestamp from a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BadArgument`] wrapped in the crate error
    /// type if the string is not a valid calendar date.
    pub fn datestamp_str(mut self, datestamp: &str) -> Result<Self> {
        self.record.datestamp = NaiveDate::parse_from_str(datestamp, "%Y-%m-%d")
            .map_err(|_| ProtocolError::BadArgument)?;
        Ok(self)
    }

    /// Set the ISO date of the last upstream change.
    #[must_use]
    pub fn updated(mut self, updated: impl Into<String>) -> Self {
        self.record.updated = updated.into();
        self
    }

    /// Append an available file format.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.record.formats.push(format.into());
        self
    }

    /// Append a name entry under a role.
    #[must_use]
    pub fn creator(
        mut self,
        role: CreatorRole,
        name: impl Into<String>,
        affiliation: Option<&str>,
    ) -> Self {
        self.record.creators.entry(role).or_default().push(Creator {
            name: name.into(),
            affiliation: affiliation.map(str::to_string),
        });
        self
    }

    /// Mark the record as a deletion tombstone.
    #[must_use]
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.record.deleted = deleted;
        self
    }

    /// Finalize and return the record.
    #[must_use]
    pub fn build(self) -> BookRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_populates_fields() {
        let record = BookRecord::builder("37t")
            .title("A title")
            .publisher("Edufba")
            .language("pt")
            .date("2009")
            .description("A synopsis")
            .updated("2014-02-04")
            .format("pdf")
            .format("epub")
            .deleted(false)
            .build();

        assert_eq!(record.identifier, "37t");
        assert_eq!(record.title, "A title");
        assert_eq!(record.formats.as_slice(), &["pdf", "epub"]);
        assert!(!record.deleted);
    }

    #[test]
    fn test_datestamp_str_rejects_malformed_dates() {
        assert!(BookRecord::builder("x").datestamp_str("2014-0207").is_err());
        assert!(BookRecord::builder("x").datestamp_str("2014-02-07").is_ok());
    }

    #[test]
    fn test_creators_for_absent_role_is_empty() {
        let record = BookRecord::builder("x")
            .creator(CreatorRole::Organizer, "Alice", Some("UFBA"))
            .build();

        assert_eq!(record.creators_for(CreatorRole::Organizer).len(), 1);
        assert!(record.creators_for(CreatorRole::Translator).is_empty());
    }

    #[test]
    fn test_role_wire_names_round_trip() {
        for role in CREATOR_ROLES.iter().chain(CONTRIBUTOR_ROLES.iter()) {
            assert_eq!(CreatorRole::from_name(role.as_str()), Some(*role));
        }
        assert_eq!(CreatorRole::from_name("unknown_role"), None);
    }

    #[test]
    fn test_record_deserializes_catalog_shape() {
        let json = r#"{
            "identifier": "38t",
            "title": "Física Básica",
            "publisher": "EDUFBA",
            "language": "pt",
            "datestamp": "2014-02-03",
            "creators": {
                "organizer": [["Souza, Maria", "UFBA"]],
                "translator": [["Lima, Pedro", null]]
            },
            "formats": ["pdf"]
        }"#;

        let record: BookRecord = serde_json::from_str(json).expect("valid record JSON");
        assert_eq!(record.creators_for(CreatorRole::Organizer)[0].name, "Souza, Maria");
        assert_eq!(
            record.creators_for(CreatorRole::Organizer)[0].affiliation.as_deref(),
            Some("UFBA")
        );
        assert_eq!(record.creators_for(CreatorRole::Translator)[0].affiliation, None);
        assert_eq!(record.datestamp.to_string(), "2014-02-03");
    }
}
