//! Record filtering and pagination.
//!
//! Translates validated verb arguments into a store [`Query`], applies
//! fixed-size pagination driven by the resumption token, and classifies
//! the filtering failure modes. The checks run in a fixed order so that
//! format errors are reported before existence errors, which are
//! reported before emptiness — the precedence harvesters expect:
//!
//! 1. unsupported `metadataPrefix` → `cannotDisseminateFormat`
//! 2. unknown `identifier` → `idDoesNotExist`
//! 3. `set` translated to a case-insensitive anchored publisher match
//! 4. unparseable `from`/`until` dates → `badArgument`
//! 5. unparseable `resumptionToken` → `badResumptionToken`
//! 6. zero total matches → `noRecordsMatch`
//! 7. token offset at or past the total → `badResumptionToken`
//!
//! Results are materialized once into an owned [`Page`]; the total
//! comes from a separate unsliced count query, never from re-iterating
//! a consumed cursor.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::config::RepositoryConfig;
use crate::error::{OaiError, ProtocolError, Result};
use crate::record::BookRecord;
use crate::store::{BookStore, Query};

/// One page of filtered records plus the pagination facts the
/// resumption-token stage needs.
#[derive(Debug, Clone)]
pub struct Page {
    /// The records of this page, sorted chronologically.
    pub records: Vec<BookRecord>,
    /// Total matches for the unsliced query.
    pub total: usize,
    /// The zero-based page index this page was requested with.
    pub token: u64,
}

impl Page {
    /// Whether this is the last page of the result set.
    #[must_use]
    pub fn finished(&self, page_size: usize) -> bool {
        page_size * (self.token as usize + 1) >= self.total
    }
}

/// Run the filter for a record-bearing verb.
///
/// # Errors
///
/// Protocol failures surface as [`OaiError::Protocol`] and are meant to
/// be intercepted at the dispatch boundary; store failures surface as
/// [`OaiError::Store`] and propagate to the caller.
pub fn filter_records(
    args: &IndexMap<String, String>,
    store: &dyn BookStore,
    config: &RepositoryConfig,
) -> Result<Page> {
    let mut query = Query::default();

    if let Some(prefix) = args.get("metadataPrefix") {
        if !config.supports_prefix(prefix) {
            return Err(ProtocolError::CannotDisseminateFormat.into());
        }
    }

    if let Some(identifier) = args.get("identifier") {
        if store.find_one(&Query::by_identifier(identifier))?.is_none() {
            return Err(ProtocolError::IdDoesNotExist.into());
        }
        query.identifier = Some(identifier.clone());
    }

    if let Some(set) = args.get("set") {
        query.publisher_pattern = Some(regex::escape(&set.replace('-', " ")));
    }

    if let Some(from) = args.get("from") {
        query.from = Some(parse_date(from)?);
    }

    if let Some(until) = args.get("until") {
        query.until = Some(parse_date(until)?);
    }

    let token = match args.get("resumptionToken") {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| OaiError::from(ProtocolError::BadResumptionToken))?,
        None => 0,
    };
    let page_size = config.items_per_page;
    let offset = page_size.saturating_mul(usize::try_from(token).unwrap_or(usize::MAX));

    let total = store.count(&query)?;
    if total == 0 {
        return Err(ProtocolError::NoRecordsMatch.into());
    }
    if offset >= total {
        // A token past the last page is an error, never an empty page.
        return Err(ProtocolError::BadResumptionToken.into());
    }

    query.offset = offset;
    query.limit = Some(page_size);
    let records = store.find(&query)?;

    Ok(Page {
        records,
        total,
        token,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ProtocolError::BadArgument.into())
}
