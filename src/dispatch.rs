//! Request dispatch: from raw arguments to a finished response document.
//!
//! This is the engine's single entry point. A request resolves to
//! exactly one [`VerbOutcome`] — validation failures and filter
//! failures substitute the matching error outcome — and the outcome is
//! rendered once through the response pipeline. Only store and
//! serialization failures escape as Rust errors; every protocol-level
//! condition answers in-band.

use chrono::Utc;
use indexmap::IndexMap;

use crate::config::RepositoryConfig;
use crate::error::{OaiError, Result};
use crate::filter::filter_records;
use crate::pipeline::render;
use crate::store::BookStore;
use crate::verbs::{self, Verb, VerbOutcome};

/// Handle one OAI-PMH request and produce the response document.
///
/// `params` is the flat query-parameter map exactly as received;
/// `base_url` is the repository endpoint without a query string. The
/// caller serves the returned string as `application/xml` with UTF-8
/// charset, always with HTTP status 200.
///
/// # Errors
///
/// Returns [`OaiError::Store`] when the record store cannot be queried
/// and [`OaiError::Xml`]/[`OaiError::Encoding`] when serialization
/// fails. Protocol errors never surface here; they render in-band.
pub fn handle_request(
    params: &IndexMap<String, String>,
    base_url: &str,
    store: &dyn BookStore,
    config: &RepositoryConfig,
) -> Result<String> {
    let outcome = resolve_outcome(params, store, config)?;
    render(&outcome, params, base_url, config)
}

fn resolve_outcome(
    params: &IndexMap<String, String>,
    store: &dyn BookStore,
    config: &RepositoryConfig,
) -> Result<VerbOutcome> {
    let spec = match verbs::resolve(params) {
        Ok(spec) => spec,
        Err(error) => {
            tracing::debug!(code = error.code(), "request rejected during validation");
            return Ok(VerbOutcome::Error(error));
        }
    };

    if spec.needs_records {
        let page = match filter_records(params, store, config) {
            Ok(page) => page,
            Err(OaiError::Protocol(error)) => {
                tracing::debug!(code = error.code(), "request rejected during filtering");
                return Ok(VerbOutcome::Error(error));
            }
            Err(other) => return Err(other),
        };
        let outcome = match spec.verb {
            Verb::GetRecord => VerbOutcome::GetRecord(page),
            Verb::ListIdentifiers => VerbOutcome::ListIdentifiers(page),
            _ => VerbOutcome::ListRecords(page),
        };
        return Ok(outcome);
    }

    let outcome = match spec.verb {
        Verb::Identify => VerbOutcome::Identify {
            earliest_datestamp: earliest_datestamp(store)?,
        },
        Verb::ListMetadataFormats => VerbOutcome::ListMetadataFormats,
        _ => VerbOutcome::ListSets {
            publishers: store.distinct_publishers()?,
        },
    };
    Ok(outcome)
}

/// The catalog's earliest change date, `YYYY-MM-DD`; today for an empty
/// catalog.
fn earliest_datestamp(store: &dyn BookStore) -> Result<String> {
    let earliest = store.earliest_update()?.map_or_else(
        || Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        |updated| updated.get(..10).unwrap_or(&updated).to_string(),
    );
    Ok(earliest)
}
