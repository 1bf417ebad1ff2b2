#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # oai-books: an OAI-PMH data provider for book catalogs
//!
//! The crate implements the OAI-PMH 2.0 protocol engine over a catalog
//! of book records: verb dispatch and validation, record filtering with
//! resumption-token pagination, Dublin Core metadata mapping, and the
//! XML pipeline assembling conformant response documents.
//!
//! ## Quick Start
//!
//! ```ignore
//! use indexmap::IndexMap;
//! use oai_books::{handle_request, MemoryStore, RepositoryConfig};
//!
//! # fn main() -> oai_books::Result<()> {
//! let store = MemoryStore::new();
//! let config = RepositoryConfig::from_env();
//!
//! let mut params = IndexMap::new();
//! params.insert("verb".to_string(), "Identify".to_string());
//!
//! let xml = handle_request(&params, "http://books.example.org/oai/", &store, &config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`] — book record structures (`BookRecord`, `Creator`, roles)
//! - [`store`] — record store boundary and the in-memory implementation
//! - [`verbs`] — verb registry, request validation, outcome sum type
//! - [`filter`] — record filtering and resumption-token pagination
//! - [`dublin_core`] — header and Dublin Core metadata projection
//! - [`xml`] — XML element tree and serialization
//! - [`pipeline`] — composable response-assembly pipeline
//! - [`dispatch`] — the request entry point
//! - [`config`] — repository configuration
//! - [`sync`] — upstream catalog adaptation
//! - [`error`] — error types and result alias

pub mod config;
pub mod dispatch;
pub mod dublin_core;
pub mod error;
pub mod filter;
pub mod pipeline;
/// Book record structures (`BookRecord`, `Creator`, `CreatorRole`)
pub mod record;
pub mod store;
pub mod sync;
pub mod verbs;
pub mod xml;

pub use config::{MetadataFormat, RepositoryConfig};
pub use dispatch::handle_request;
pub use dublin_core::{DublinCore, RecordHeader};
pub use error::{OaiError, ProtocolError, Result};
pub use filter::Page;
pub use record::{BookRecord, BookRecordBuilder, Creator, CreatorRole};
pub use store::{BookStore, CatalogWriter, MemoryStore, Query};
pub use verbs::{Verb, VerbOutcome, VerbSpec};
pub use xml::Element;
