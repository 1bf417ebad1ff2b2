//! Verb registry, request validation, and the outcome sum type.
//!
//! Every OAI-PMH operation is a "verb" named by the `verb` request
//! argument. The registry holds one [`VerbSpec`] per verb: the argument
//! keys it requires, the keys it allows, and whether resolving it needs
//! a store query. Validation is pure set arithmetic over the raw
//! argument keys — any key outside the allowed set, or any required key
//! missing, rejects the request before a store query runs.
//!
//! A request resolves to exactly one [`VerbOutcome`], the closed sum of
//! the six verb responses and the in-band protocol errors; the pipeline
//! renders each outcome exactly once.

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::error::ProtocolError;
use crate::filter::Page;

/// The closed set of protocol operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Repository self-description.
    Identify,
    /// Metadata formats the repository can disseminate.
    ListMetadataFormats,
    /// Record headers only, for selective harvesting.
    ListIdentifiers,
    /// The sets (publishers) records are grouped under.
    ListSets,
    /// One full record by identifier.
    GetRecord,
    /// Full records with filtering and pagination.
    ListRecords,
}

/// Per-verb argument contract and resolution needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbSpec {
    /// The verb this spec describes.
    pub verb: Verb,
    /// Argument keys that must be present.
    pub required: &'static [&'static str],
    /// The complete set of argument keys tolerated.
    pub allowed: &'static [&'static str],
    /// Whether resolving the verb runs the record filter.
    pub needs_records: bool,
    /// Whether at least one of `metadataPrefix`/`resumptionToken` must
    /// be present (the stricter list-verb profile).
    pub requires_format_or_token: bool,
}

const LIST_ARGS: &[&str] = &[
    "verb",
    "from",
    "until",
    "set",
    "resumptionToken",
    "metadataPrefix",
];

lazy_static! {
    static ref REGISTRY: IndexMap<&'static str, VerbSpec> = {
        let mut registry = IndexMap::new();
        registry.insert(
            "Identify",
            VerbSpec {
                verb: Verb::Identify,
                required: &["verb"],
                allowed: &["verb"],
                needs_records: false,
                requires_format_or_token: false,
            },
        );
        registry.insert(
            "ListMetadataFormats",
            VerbSpec {
                verb: Verb::ListMetadataFormats,
                required: &["verb"],
                allowed: &["verb", "identifier"],
                needs_records: false,
                requires_format_or_token: false,
            },
        );
        registry.insert(
            "ListIdentifiers",
            VerbSpec {
                verb: Verb::ListIdentifiers,
                required: &["verb"],
                allowed: LIST_ARGS,
                needs_records: true,
                requires_format_or_token: true,
            },
        );
        registry.insert(
            "ListSets",
            VerbSpec {
                verb: Verb::ListSets,
                required: &["verb"],
                allowed: &["verb", "resumptionToken"],
                needs_records: false,
                requires_format_or_token: false,
            },
        );
        registry.insert(
            "GetRecord",
            VerbSpec {
                verb: Verb::GetRecord,
                // Exact-set verb: no key beyond these three is tolerated.
                required: &["verb", "identifier", "metadataPrefix"],
                allowed: &["verb", "identifier", "metadataPrefix"],
                needs_records: true,
                requires_format_or_token: false,
            },
        );
        registry.insert(
            "ListRecords",
            VerbSpec {
                verb: Verb::ListRecords,
                required: &["verb"],
                allowed: LIST_ARGS,
                needs_records: true,
                requires_format_or_token: true,
            },
        );
        registry
    };
}

/// Look up a verb's spec by its wire name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static VerbSpec> {
    REGISTRY.get(name)
}

/// Validate a raw request against the registry and resolve its verb.
///
/// # Errors
///
/// [`ProtocolError::BadVerb`] when the `verb` argument is missing or
/// names no registered verb — no argument validation happens in that
/// case. [`ProtocolError::BadArgument`] when a disallowed key is
/// present, a required key is missing, or a list verb carries neither
/// `metadataPrefix` nor `resumptionToken`.
pub fn resolve(
    args: &IndexMap<String, String>,
) -> std::result::Result<&'static VerbSpec, ProtocolError> {
    let name = args.get("verb").ok_or(ProtocolError::BadVerb)?;
    let spec = lookup(name).ok_or(ProtocolError::BadVerb)?;

    let extra = args
        .keys()
        .any(|key| !spec.allowed.contains(&key.as_str()));
    if extra {
        return Err(ProtocolError::BadArgument);
    }

    let missing = spec
        .required
        .iter()
        .any(|key| !args.contains_key(*key));
    if missing {
        return Err(ProtocolError::BadArgument);
    }

    if spec.requires_format_or_token
        && !args.contains_key("metadataPrefix")
        && !args.contains_key("resumptionToken")
    {
        return Err(ProtocolError::BadArgument);
    }

    Ok(spec)
}

/// The resolved outcome of one request, rendered exactly once.
#[derive(Debug, Clone)]
pub enum VerbOutcome {
    /// `Identify` response data.
    Identify {
        /// The repository's earliest datestamp, `YYYY-MM-DD`.
        earliest_datestamp: String,
    },
    /// `ListMetadataFormats` response; formats come from configuration.
    ListMetadataFormats,
    /// `ListIdentifiers` response: one header per record of the page.
    ListIdentifiers(Page),
    /// `ListSets` response over the distinct publishers.
    ListSets {
        /// Distinct publisher names, in store order.
        publishers: Vec<String>,
    },
    /// `GetRecord` response carrying the single matching record.
    GetRecord(Page),
    /// `ListRecords` response: one full record per page entry.
    ListRecords(Page),
    /// An in-band protocol error.
    Error(ProtocolError),
}
