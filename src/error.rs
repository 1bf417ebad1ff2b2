//! Error types for the OAI-PMH engine.
//!
//! Two strata of failure exist in the protocol engine:
//!
//! - [`ProtocolError`] — the six in-band OAI-PMH error conditions. These
//!   are ordinary request outcomes: they are rendered as an
//!   `<error code="...">` element inside a well-formed response envelope
//!   and never abort the request.
//! - [`OaiError`] — engine failures (store access, XML serialization).
//!   These propagate to the caller and are owned by the surrounding web
//!   layer; they are never rendered in-band.

use thiserror::Error;

/// An in-band OAI-PMH protocol error.
///
/// Every variant corresponds to a fixed error code from the OAI-PMH 2.0
/// specification and renders as a single `<error>` element through the
/// ordinary response pipeline.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The request named a verb that is not in the registry.
    #[error("Illegal OAI verb")]
    BadVerb,

    /// A required argument is missing, a disallowed argument is present,
    /// or an argument value (such as a date) cannot be parsed.
    #[error("illegal or missing request argument")]
    BadArgument,

    /// The requested `metadataPrefix` is not supported by this repository.
    #[error("metadata format not supported")]
    CannotDisseminateFormat,

    /// The `identifier` argument matches no record in the store.
    #[error("No matching identifier")]
    IdDoesNotExist,

    /// The combined filter arguments match no records at all.
    #[error("no records match the request arguments")]
    NoRecordsMatch,

    /// The resumption token is unparseable or points past the last page.
    #[error("invalid or expired resumption token")]
    BadResumptionToken,
}

impl ProtocolError {
    /// The wire-level error code carried in the `code` attribute.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::BadVerb => "badVerb",
            ProtocolError::BadArgument => "badArgument",
            ProtocolError::CannotDisseminateFormat => "cannotDisseminateFormat",
            ProtocolError::IdDoesNotExist => "idDoesNotExist",
            ProtocolError::NoRecordsMatch => "noRecordsMatch",
            ProtocolError::BadResumptionToken => "badResumptionToken",
        }
    }

    /// Fixed human-readable element text, where the protocol carries one.
    ///
    /// Only `badVerb` and `idDoesNotExist` render explanatory text; the
    /// remaining errors are empty elements identified by code alone.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ProtocolError::BadVerb => Some("Illegal OAI verb"),
            ProtocolError::IdDoesNotExist => Some("No matching identifier"),
            _ => None,
        }
    }
}

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum OaiError {
    /// An in-band protocol error escaping through a `Result`. The
    /// dispatch boundary intercepts this variant and renders it as an
    /// ordinary error response; it should never reach the caller.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The record store could not be queried.
    #[error("record store failure: {0}")]
    Store(String),

    /// Serializing the response tree failed.
    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The serialized response was not valid UTF-8.
    #[error("response encoding failed: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// An upstream catalog payload could not be adapted to a book record.
    #[error("catalog update rejected: {0}")]
    Sync(String),
}

/// Convenience type alias for [`std::result::Result`] with [`OaiError`].
pub type Result<T> = std::result::Result<T, OaiError>;
