//! Common test helpers shared across the integration suites.

use indexmap::IndexMap;
use oai_books::{BookRecord, CreatorRole, MemoryStore, RepositoryConfig};

/// Builds a request-parameter map in arrival order.
pub fn args(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A repository configuration with two records per page, small enough
/// to exercise pagination against the five-record catalog.
#[allow(dead_code)]
pub fn test_config() -> RepositoryConfig {
    RepositoryConfig {
        items_per_page: 2,
        ..RepositoryConfig::default()
    }
}

/// Five books across three publishers, one of them a deletion
/// tombstone, with distinct ascending datestamps.
#[allow(dead_code)]
pub fn test_catalog() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(
        BookRecord::builder("36t")
            .title("Ensaios de economia")
            .publisher("Edufba")
            .language("pt")
            .date("2008")
            .description("Primeiro ensaio")
            .datestamp_str("2014-02-01")
            .expect("valid fixture date")
            .updated("2014-02-01")
            .format("pdf")
            .creator(CreatorRole::IndividualAuthor, "Souza, Maria", None)
            .build(),
    );
    store.insert(
        BookRecord::builder("37t")
            .title("Compendio de historia economica")
            .publisher("Edufba")
            .language("pt")
            .date("2009")
            .description("Compendio")
            .datestamp_str("2014-02-02")
            .expect("valid fixture date")
            .updated("2014-02-02")
            .format("pdf")
            .creator(CreatorRole::Organizer, "Szmrecsanyi, Tamas", Some("UNICAMP"))
            .deleted(true)
            .build(),
    );
    store.insert(
        BookRecord::builder("38t")
            .title("Física Básica")
            .publisher("Bla X Ble")
            .language("pt")
            .date("2010")
            .description("Curso introdutório")
            .datestamp_str("2014-02-03")
            .expect("valid fixture date")
            .updated("2014-02-03")
            .format("pdf")
            .format("epub")
            .creator(CreatorRole::Organizer, "Lima, Pedro", None)
            .creator(CreatorRole::Collaborator, "Alves, Nuno", None)
            .build(),
    );
    store.insert(
        BookRecord::builder("39t")
            .title("Historia do Brasil")
            .publisher("Editora UNESP")
            .language("pt")
            .date("2011")
            .description("Segundo volume")
            .datestamp_str("2014-02-04")
            .expect("valid fixture date")
            .updated("2014-02-04")
            .format("epub")
            .creator(CreatorRole::CorporateAuthor, "UNESP", None)
            .build(),
    );
    store.insert(
        BookRecord::builder("40t")
            .title("Antropologia urbana")
            .publisher("Edufba")
            .language("pt")
            .date("2012")
            .description("Estudos de campo")
            .datestamp_str("2014-02-05")
            .expect("valid fixture date")
            .updated("2014-02-05")
            .format("pdf")
            .creator(CreatorRole::IndividualAuthor, "Costa, Rita", None)
            .creator(CreatorRole::Translator, "Braga, Eva", None)
            .build(),
    );
    store
}
