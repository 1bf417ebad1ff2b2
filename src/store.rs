//! Record store collaborator boundary.
//!
//! The protocol engine reads records through the [`BookStore`] trait and
//! never writes them; the synchronization side writes through
//! [`CatalogWriter`]. Queries are expressed as a [`Query`] value
//! carrying the three predicate kinds the protocol needs — identifier
//! equality, case-insensitive anchored publisher regex, and inclusive
//! datestamp range — plus an offset/limit window for pagination.
//!
//! Implementations must return results sorted by `datestamp` with a
//! stable order for equal stamps, and must count matches on the
//! *unsliced* query. [`MemoryStore`] provides an in-memory
//! implementation used by the test suites and by embedders that do not
//! need an external document store.

use chrono::{NaiveDate, Utc};
use indexmap::IndexSet;
use regex::{Regex, RegexBuilder};

use crate::error::{OaiError, Result};
use crate::record::BookRecord;

/// A store query: conjunction of the predicates present.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Exact identifier match.
    pub identifier: Option<String>,
    /// Case-insensitive regex source matched against the full publisher
    /// string (the store anchors it with `^...$`).
    pub publisher_pattern: Option<String>,
    /// Inclusive lower datestamp bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper datestamp bound.
    pub until: Option<NaiveDate>,
    /// Number of sorted matches to skip.
    pub offset: usize,
    /// Maximum number of matches to return; `None` means unbounded.
    pub limit: Option<usize>,
}

impl Query {
    /// Query matching a single record by identifier.
    #[must_use]
    pub fn by_identifier(identifier: impl Into<String>) -> Self {
        Query {
            identifier: Some(identifier.into()),
            ..Query::default()
        }
    }
}

/// Read-only access to the book catalog.
pub trait BookStore {
    /// Execute a query sorted by datestamp, honoring the query's
    /// offset/limit window, and return the matching records.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be queried.
    fn find(&self, query: &Query) -> Result<Vec<BookRecord>>;

    /// Count matches for the query, ignoring its offset/limit window.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be queried.
    fn count(&self, query: &Query) -> Result<usize>;

    /// First match for the query, if any.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be queried.
    fn find_one(&self, query: &Query) -> Result<Option<BookRecord>>;

    /// Distinct publisher names, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be queried.
    fn distinct_publishers(&self) -> Result<Vec<String>>;

    /// The chronologically first `updated` value across all records,
    /// or `None` for an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be queried.
    fn earliest_update(&self) -> Result<Option<String>>;
}

/// Write access to the book catalog, used by the synchronization side.
pub trait CatalogWriter {
    /// Insert the record, or replace the record with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be written.
    fn upsert(&mut self, record: BookRecord) -> Result<()>;

    /// Mark the record as deleted and refresh its datestamp. A missing
    /// identifier is not an error; the call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OaiError::Store`] if the store cannot be written.
    fn mark_deleted(&mut self, identifier: &str) -> Result<()>;
}

/// In-memory book catalog.
///
/// Keeps records in insertion order; queries sort a filtered copy by
/// datestamp (stable, so equal stamps keep insertion order).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<BookRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Add a record without identifier deduplication.
    pub fn insert(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    /// Number of records held, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matching(&self, query: &Query) -> Result<Vec<BookRecord>> {
        let publisher_re = compile_publisher_pattern(query.publisher_pattern.as_deref())?;

        let mut matches: Vec<BookRecord> = self
            .records
            .iter()
            .filter(|record| {
                if let Some(identifier) = &query.identifier {
                    if record.identifier != *identifier {
                        return false;
                    }
                }
                if let Some(re) = &publisher_re {
                    if !re.is_match(&record.publisher) {
                        return false;
                    }
                }
                if let Some(from) = query.from {
                    if record.datestamp < from {
                        return false;
                    }
                }
                if let Some(until) = query.until {
                    if record.datestamp > until {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        matches.sort_by_key(|record| record.datestamp);
        Ok(matches)
    }
}

impl From<Vec<BookRecord>> for MemoryStore {
    fn from(records: Vec<BookRecord>) -> Self {
        MemoryStore { records }
    }
}

fn compile_publisher_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        Some(pattern) => {
            let re = RegexBuilder::new(&format!("^{pattern}$"))
                .case_insensitive(true)
                .build()
                .map_err(|e| OaiError::Store(format!("bad publisher pattern: {e}")))?;
            Ok(Some(re))
        }
        None => Ok(None),
    }
}

impl BookStore for MemoryStore {
    fn find(&self, query: &Query) -> Result<Vec<BookRecord>> {
        let matches = self.matching(query)?;
        let window = matches.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    fn count(&self, query: &Query) -> Result<usize> {
        Ok(self.matching(query)?.len())
    }

    fn find_one(&self, query: &Query) -> Result<Option<BookRecord>> {
        Ok(self.matching(query)?.into_iter().next())
    }

    fn distinct_publishers(&self) -> Result<Vec<String>> {
        let publishers: IndexSet<String> = self
            .records
            .iter()
            .filter(|record| !record.publisher.is_empty())
            .map(|record| record.publisher.clone())
            .collect();
        Ok(publishers.into_iter().collect())
    }

    fn earliest_update(&self) -> Result<Option<String>> {
        Ok(self
            .records
            .iter()
            .filter(|record| !record.updated.is_empty())
            .map(|record| record.updated.clone())
            .min())
    }
}

impl CatalogWriter for MemoryStore {
    fn upsert(&mut self, record: BookRecord) -> Result<()> {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.identifier == record.identifier)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        Ok(())
    }

    fn mark_deleted(&mut self, identifier: &str) -> Result<()> {
        match self
            .records
            .iter_mut()
            .find(|record| record.identifier == identifier)
        {
            Some(record) => {
                record.deleted = true;
                record.datestamp = Utc::now().date_naive();
            }
            None => {
                tracing::warn!(identifier, "deletion for unknown record ignored");
            }
        }
        Ok(())
    }
}
