//! Composable XML response pipeline.
//!
//! A pipeline is an ordered sequence of stateless transform stages,
//! each a plain function over the shared element tree and the request's
//! [`PipelineData`]. Every response, success or error, runs the same
//! envelope stages — setup, response date, request echo — followed by
//! the middle stages selected by the [`VerbOutcome`], and ends with the
//! teardown that serializes the tree and discards the payload.
//!
//! Record-bearing verbs fold a nested sub-pipeline once per record: a
//! header stage followed by a metadata stage that is skipped — via a
//! guard on the tombstone flag — for deleted records, whose headers
//! carry `status="deleted"` instead.

use indexmap::IndexMap;

use crate::config::RepositoryConfig;
use crate::dublin_core;
use crate::error::Result;
use crate::record::BookRecord;
use crate::verbs::VerbOutcome;
use crate::xml::Element;

const OAI_NS: &str = "http://www.openarchives.org/OAI/2.0/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";

const OAI_DC_NS: &str = "http://www.openarchives.org/OAI/2.0/oai_dc/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const OAI_DC_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/oai_dc/ http://www.openarchives.org/OAI/2.0/oai_dc.xsd";

/// Everything a stage may read: the echoed request, the base URL, the
/// repository configuration, and the resolved outcome payload.
#[derive(Debug)]
pub struct PipelineData<'a> {
    /// Raw request arguments, in arrival order.
    pub request: &'a IndexMap<String, String>,
    /// The repository base URL echoed in the `request` element.
    pub base_url: &'a str,
    /// Process-wide repository settings.
    pub config: &'a RepositoryConfig,
    /// The outcome whose body the middle stages emit.
    pub outcome: &'a VerbOutcome,
}

/// A pipeline stage: appends to the shared tree, never removes.
pub type Stage = for<'a> fn(&mut Element, &PipelineData<'a>);

/// Render an outcome to a complete OAI-PMH response document.
///
/// # Errors
///
/// Returns [`crate::OaiError::Xml`] if serialization fails.
pub fn render(
    outcome: &VerbOutcome,
    request: &IndexMap<String, String>,
    base_url: &str,
    config: &RepositoryConfig,
) -> Result<String> {
    let data = PipelineData {
        request,
        base_url,
        config,
        outcome,
    };

    let mut root = setup();
    for stage in [response_date as Stage, request_echo]
        .iter()
        .chain(middle_stages(outcome))
    {
        stage(&mut root, &data);
    }
    teardown(root)
}

fn middle_stages(outcome: &VerbOutcome) -> &'static [Stage] {
    match outcome {
        VerbOutcome::Identify { .. } => &[identify],
        VerbOutcome::ListMetadataFormats => &[list_metadata_formats, metadata_format],
        VerbOutcome::ListIdentifiers(_) => &[list_identifiers, resumption_token],
        VerbOutcome::ListSets { .. } => &[list_sets],
        VerbOutcome::GetRecord(_) => &[get_record],
        VerbOutcome::ListRecords(_) => &[list_records, resumption_token],
        VerbOutcome::Error(_) => &[protocol_error],
    }
}

/// Root envelope element with the protocol namespaces.
fn setup() -> Element {
    let mut root = Element::new("OAI-PMH");
    root.set_attr("xmlns", OAI_NS);
    root.set_attr("xmlns:xsi", XSI_NS);
    root.set_attr("xsi:schemaLocation", OAI_SCHEMA_LOCATION);
    root
}

/// Current UTC timestamp in the protocol's second granularity.
fn response_date(xml: &mut Element, _data: &PipelineData) {
    let now = chrono::Utc::now();
    xml.child("responseDate")
        .set_text(now.format("%Y-%m-%dT%H:%M:%SZ").to_string());
}

/// Echo of the request: every argument as an attribute, base URL as text.
fn request_echo(xml: &mut Element, data: &PipelineData) {
    let request = xml.child("request");
    for (key, value) in data.request {
        request.set_attr(key, value);
    }
    request.set_text(data.base_url);
}

fn identify(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::Identify { earliest_datestamp } = data.outcome else {
        return;
    };
    let config = data.config;
    let node = xml.child("Identify");
    node.child("repositoryName").set_text(&config.repository_name);
    node.child("baseURL").set_text(data.base_url);
    node.child("protocolVersion").set_text(&config.protocol_version);
    node.child("adminEmail").set_text(&config.admin_email);
    node.child("earliestDatestamp").set_text(earliest_datestamp);
    node.child("deletedRecord").set_text(&config.deleted_record);
    node.child("granularity").set_text(&config.granularity);
}

fn list_metadata_formats(xml: &mut Element, _data: &PipelineData) {
    xml.child("ListMetadataFormats");
}

fn metadata_format(xml: &mut Element, data: &PipelineData) {
    let Some(listing) = xml.find_child_mut("ListMetadataFormats") else {
        return;
    };
    for format in &data.config.formats {
        let node = listing.child("metadataFormat");
        node.child("metadataPrefix").set_text(&format.prefix);
        node.child("schema").set_text(&format.schema);
        node.child("metadataNamespace").set_text(&format.namespace);
    }
}

fn list_identifiers(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::ListIdentifiers(page) = data.outcome else {
        return;
    };
    let listing = xml.child("ListIdentifiers");
    for record in &page.records {
        listing.append(header_element(record));
    }
}

fn list_sets(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::ListSets { publishers } = data.outcome else {
        return;
    };
    let listing = xml.child("ListSets");
    for publisher in publishers {
        let set = listing.child("set");
        set.child("setSpec").set_text(dublin_core::slugify(publisher));
        set.child("setName").set_text(publisher);
    }
}

fn get_record(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::GetRecord(page) = data.outcome else {
        return;
    };
    let node = xml.child("GetRecord");
    if let Some(record) = page.records.first() {
        node.append(record_element(record, data.config));
    }
}

fn list_records(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::ListRecords(page) = data.outcome else {
        return;
    };
    let listing = xml.child("ListRecords");
    for record in &page.records {
        listing.append(record_element(record, data.config));
    }
}

/// Pagination cursor element for the list verbs.
///
/// Carries the next page index while pages remain; present but empty on
/// the final page, signalling the end of the result set.
fn resumption_token(xml: &mut Element, data: &PipelineData) {
    let page = match data.outcome {
        VerbOutcome::ListIdentifiers(page) | VerbOutcome::ListRecords(page) => page,
        _ => return,
    };
    let node = xml.child("resumptionToken");
    if !page.finished(data.config.items_per_page) {
        node.set_text((page.token + 1).to_string());
    }
}

fn protocol_error(xml: &mut Element, data: &PipelineData) {
    let VerbOutcome::Error(error) = data.outcome else {
        return;
    };
    let node = xml.child("error");
    node.set_attr("code", error.code());
    if let Some(message) = error.message() {
        node.set_text(message);
    }
}

/// Nested per-record sub-pipeline: header, then metadata unless the
/// record is a tombstone.
fn record_element(record: &BookRecord, config: &RepositoryConfig) -> Element {
    let mut node = Element::new("record");
    node.append(header_element(record));
    if let Some(dc) = dublin_core::metadata(record, &config.identifier_base) {
        node.append(metadata_element(&dc));
    }
    node
}

fn header_element(record: &BookRecord) -> Element {
    let header = dublin_core::header(record);
    let mut node = Element::new("header");
    if header.deleted {
        node.set_attr("status", "deleted");
    }
    node.child("identifier").set_text(header.identifier);
    node.child("datestamp").set_text(header.datestamp);
    node.child("setSpec").set_text(header.set_spec);
    node
}

fn metadata_element(dc: &dublin_core::DublinCore) -> Element {
    let mut node = Element::new("metadata");
    let body = node.child("oai_dc:dc");
    body.set_attr("xmlns:oai_dc", OAI_DC_NS);
    body.set_attr("xmlns:dc", DC_NS);
    body.set_attr("xmlns:xsi", XSI_NS);
    body.set_attr("xsi:schemaLocation", OAI_DC_SCHEMA_LOCATION);

    body.child("dc:title").set_text(&dc.title);
    for creator in &dc.creator {
        body.child("dc:creator").set_text(creator);
    }
    for contributor in &dc.contributor {
        body.child("dc:contributor").set_text(contributor);
    }
    body.child("dc:description").set_text(&dc.description);
    body.child("dc:publisher").set_text(&dc.publisher);
    body.child("dc:date").set_text(&dc.date);
    body.child("dc:type").set_text(dc.dc_type);
    for format in &dc.format {
        body.child("dc:format").set_text(format);
    }
    body.child("dc:identifier").set_text(&dc.identifier);
    body.child("dc:language").set_text(&dc.language);
    node
}

/// Discard the payload; only the finished tree leaves the pipeline.
fn teardown(root: Element) -> Result<String> {
    root.to_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::filter::Page;
    use crate::record::CreatorRole;

    fn args(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn render_outcome(outcome: &VerbOutcome, request: &IndexMap<String, String>) -> String {
        render(
            outcome,
            request,
            "http://books.scielo.org/oai/",
            &RepositoryConfig::default(),
        )
        .expect("pipeline renders")
    }

    fn book(id: &str) -> BookRecord {
        BookRecord::builder(id)
            .title("Compendio")
            .publisher("Teste OAI-PMH")
            .language("pt")
            .date("2009")
            .description("A synopsis")
            .datestamp_str("2014-02-12")
            .expect("valid fixture date")
            .format("pdf")
            .creator(CreatorRole::Organizer, "Souza, Maria", None)
            .build()
    }

    #[test]
    fn test_every_response_carries_the_envelope() {
        let request = args(&[("verb", "Identify")]);
        let outcome = VerbOutcome::Identify {
            earliest_datestamp: "1909-04-01".to_string(),
        };
        let doc = render_outcome(&outcome, &request);

        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains(
            "<OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\" \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:schemaLocation=\"http://www.openarchives.org/OAI/2.0/ \
             http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd\">"
        ));
        assert!(doc.contains("<responseDate>"));
        assert!(doc.ends_with("</OAI-PMH>"));
    }

    #[test]
    fn test_response_date_has_second_granularity() {
        let request = args(&[("verb", "Identify")]);
        let outcome = VerbOutcome::Identify {
            earliest_datestamp: "1909-04-01".to_string(),
        };
        let doc = render_outcome(&outcome, &request);

        let start = doc.find("<responseDate>").expect("stamp present") + "<responseDate>".len();
        let end = doc.find("</responseDate>").expect("stamp closed");
        let stamp = &doc[start..end];
        assert!(
            chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%SZ").is_ok(),
            "unexpected responseDate shape: {stamp}"
        );
    }

    #[test]
    fn test_request_echoes_arguments_and_base_url() {
        let request = args(&[
            ("verb", "GetRecord"),
            ("metadataPrefix", "oai_dc"),
            ("identifier", "37t"),
        ]);
        let outcome = VerbOutcome::Error(ProtocolError::IdDoesNotExist);
        let doc = render_outcome(&outcome, &request);

        assert!(doc.contains(
            "<request verb=\"GetRecord\" metadataPrefix=\"oai_dc\" identifier=\"37t\">\
             http://books.scielo.org/oai/</request>"
        ));
    }

    #[test]
    fn test_identify_body() {
        let request = args(&[("verb", "Identify")]);
        let outcome = VerbOutcome::Identify {
            earliest_datestamp: "1909-04-01".to_string(),
        };
        let doc = render_outcome(&outcome, &request);

        assert!(doc.contains("<repositoryName>SciELO Books</repositoryName>"));
        assert!(doc.contains("<baseURL>http://books.scielo.org/oai/</baseURL>"));
        assert!(doc.contains("<protocolVersion>2.0</protocolVersion>"));
        assert!(doc.contains("<adminEmail>scielo.books@scielo.org</adminEmail>"));
        assert!(doc.contains("<earliestDatestamp>1909-04-01</earliestDatestamp>"));
        assert!(doc.contains("<deletedRecord>persistent</deletedRecord>"));
        assert!(doc.contains("<granularity>YYYY-MM-DD</granularity>"));
    }

    #[test]
    fn test_list_metadata_formats_body() {
        let request = args(&[("verb", "ListMetadataFormats")]);
        let doc = render_outcome(&VerbOutcome::ListMetadataFormats, &request);

        assert!(doc.contains("<ListMetadataFormats><metadataFormat>"));
        assert!(doc.contains("<metadataPrefix>oai_dc</metadataPrefix>"));
        assert!(doc.contains("<schema>http://www.openarchives.org/OAI/2.0/oai_dc.xsd</schema>"));
        assert!(doc.contains(
            "<metadataNamespace>http://www.openarchives.org/OAI/2.0/oai_dc/</metadataNamespace>"
        ));
    }

    #[test]
    fn test_list_identifiers_emits_one_header_per_record() {
        let request = args(&[("verb", "ListIdentifiers"), ("metadataPrefix", "oai_dc")]);
        let page = Page {
            records: vec![book("xpto"), book("xvzp")],
            total: 2,
            token: 0,
        };
        let doc = render_outcome(&VerbOutcome::ListIdentifiers(page), &request);

        assert_eq!(doc.matches("<header>").count(), 2);
        assert!(doc.contains("<identifier>xpto</identifier>"));
        assert!(doc.contains("<identifier>xvzp</identifier>"));
        assert!(doc.contains("<setSpec>teste-oai-pmh</setSpec>"));
        // Headers only, never metadata bodies.
        assert!(!doc.contains("<metadata>"));
    }

    #[test]
    fn test_list_sets_body() {
        let request = args(&[("verb", "ListSets")]);
        let outcome = VerbOutcome::ListSets {
            publishers: vec!["Teste OAI-PMH".to_string(), "OAI-PMH SciELO".to_string()],
        };
        let doc = render_outcome(&outcome, &request);

        assert!(doc.contains(
            "<set><setSpec>teste-oai-pmh</setSpec><setName>Teste OAI-PMH</setName></set>"
        ));
        assert!(doc.contains(
            "<set><setSpec>oai-pmh-scielo</setSpec><setName>OAI-PMH SciELO</setName></set>"
        ));
    }

    #[test]
    fn test_record_body_shape() {
        let request = args(&[
            ("verb", "GetRecord"),
            ("identifier", "xpto"),
            ("metadataPrefix", "oai_dc"),
        ]);
        let page = Page {
            records: vec![book("xpto")],
            total: 1,
            token: 0,
        };
        let doc = render_outcome(&VerbOutcome::GetRecord(page), &request);

        assert_eq!(doc.matches("<record>").count(), 1);
        assert!(doc.contains("<dc:title>Compendio</dc:title>"));
        assert!(doc.contains("<dc:creator>Souza, Maria</dc:creator>"));
        assert!(doc.contains("<dc:publisher>Teste OAI-PMH</dc:publisher>"));
        assert!(doc.contains("<dc:type>book</dc:type>"));
        assert!(doc.contains("<dc:format>pdf</dc:format>"));
        assert!(doc.contains("<dc:identifier>http://books.scielo.org/id/xpto</dc:identifier>"));
        assert!(doc.contains("<dc:language>pt</dc:language>"));
        assert!(doc.contains("xmlns:oai_dc=\"http://www.openarchives.org/OAI/2.0/oai_dc/\""));
    }

    #[test]
    fn test_deleted_record_renders_header_only() {
        let request = args(&[
            ("verb", "GetRecord"),
            ("identifier", "xpto"),
            ("metadataPrefix", "oai_dc"),
        ]);
        let mut tombstone = book("xpto");
        tombstone.deleted = true;
        let page = Page {
            records: vec![tombstone],
            total: 1,
            token: 0,
        };
        let doc = render_outcome(&VerbOutcome::GetRecord(page), &request);

        assert!(doc.contains("<header status=\"deleted\">"));
        assert!(!doc.contains("<metadata>"));
    }

    #[test]
    fn test_resumption_token_carries_next_page_index() {
        let request = args(&[("verb", "ListRecords"), ("metadataPrefix", "oai_dc")]);
        let page = Page {
            records: vec![book("a"), book("b")],
            total: 500,
            token: 0,
        };
        let doc = render_outcome(&VerbOutcome::ListRecords(page), &request);
        assert!(doc.contains("<resumptionToken>1</resumptionToken>"));
    }

    #[test]
    fn test_resumption_token_is_empty_on_last_page() {
        let request = args(&[("verb", "ListRecords"), ("metadataPrefix", "oai_dc")]);
        let page = Page {
            records: vec![book("a")],
            total: 1,
            token: 0,
        };
        let doc = render_outcome(&VerbOutcome::ListRecords(page), &request);
        assert!(doc.contains("<resumptionToken/>"));
    }

    #[test]
    fn test_error_bodies() {
        let request = args(&[("verb", "bla")]);
        let doc = render_outcome(&VerbOutcome::Error(ProtocolError::BadVerb), &request);
        assert!(doc.contains("<error code=\"badVerb\">Illegal OAI verb</error>"));

        let doc = render_outcome(&VerbOutcome::Error(ProtocolError::NoRecordsMatch), &request);
        assert!(doc.contains("<error code=\"noRecordsMatch\"/>"));

        let doc = render_outcome(&VerbOutcome::Error(ProtocolError::IdDoesNotExist), &request);
        assert!(doc.contains("<error code=\"idDoesNotExist\">No matching identifier</error>"));
    }
}
