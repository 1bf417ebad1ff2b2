//! Repository configuration.
//!
//! Process-wide, read-only settings for the provider: repository
//! identity for the `Identify` response, page size for resumption-token
//! pagination, the supported metadata formats, and the base URL used to
//! mint `dc:identifier` values. Environment variables override the
//! defaults through [`RepositoryConfig::from_env`].

use std::env;

/// A supported metadata format, as advertised by `ListMetadataFormats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFormat {
    /// The `metadataPrefix` clients pass to request this format.
    pub prefix: String,
    /// Schema URL.
    pub schema: String,
    /// Metadata namespace URI.
    pub namespace: String,
}

impl MetadataFormat {
    /// The baseline Dublin Core format every repository must support.
    #[must_use]
    pub fn oai_dc() -> Self {
        MetadataFormat {
            prefix: "oai_dc".to_string(),
            schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd".to_string(),
            namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/".to_string(),
        }
    }
}

/// Repository settings shared by all requests.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Human-readable repository name in `Identify`.
    pub repository_name: String,
    /// Administrative contact in `Identify`.
    pub admin_email: String,
    /// Protocol version advertised in `Identify`; fixed at `2.0`.
    pub protocol_version: String,
    /// Deleted-record policy advertised in `Identify`.
    pub deleted_record: String,
    /// Datestamp granularity advertised in `Identify`.
    pub granularity: String,
    /// Page size for `ListRecords`/`ListIdentifiers` pagination.
    pub items_per_page: usize,
    /// Supported metadata formats; `oai_dc` is the only one today.
    pub formats: Vec<MetadataFormat>,
    /// Base URL prepended to record identifiers in `dc:identifier`.
    pub identifier_base: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            repository_name: "SciELO Books".to_string(),
            admin_email: "scielo.books@scielo.org".to_string(),
            protocol_version: "2.0".to_string(),
            deleted_record: "persistent".to_string(),
            granularity: "YYYY-MM-DD".to_string(),
            items_per_page: 100,
            formats: vec![MetadataFormat::oai_dc()],
            identifier_base: "http://books.scielo.org/id/".to_string(),
        }
    }
}

impl RepositoryConfig {
    /// Build a configuration from the environment, falling back to the
    /// defaults for anything unset.
    ///
    /// Recognized variables: `OAI_BOOKS_REPOSITORY_NAME`,
    /// `OAI_BOOKS_ADMIN_EMAIL`, `OAI_BOOKS_ITEMS_PER_PAGE`,
    /// `OAI_BOOKS_IDENTIFIER_BASE`. An unparseable page size is ignored
    /// with a warning rather than failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = RepositoryConfig::default();
        if let Ok(name) = env::var("OAI_BOOKS_REPOSITORY_NAME") {
            config.repository_name = name;
        }
        if let Ok(email) = env::var("OAI_BOOKS_ADMIN_EMAIL") {
            config.admin_email = email;
        }
        if let Ok(base) = env::var("OAI_BOOKS_IDENTIFIER_BASE") {
            config.identifier_base = base;
        }
        if let Ok(raw) = env::var("OAI_BOOKS_ITEMS_PER_PAGE") {
            match raw.parse::<usize>() {
                Ok(value) if value > 0 => config.items_per_page = value,
                _ => {
                    tracing::warn!(value = %raw, "ignoring unparseable OAI_BOOKS_ITEMS_PER_PAGE");
                }
            }
        }
        config
    }

    /// Whether a `metadataPrefix` value names a supported format.
    #[must_use]
    pub fn supports_prefix(&self, prefix: &str) -> bool {
        self.formats.iter().any(|format| format.prefix == prefix)
    }
}
