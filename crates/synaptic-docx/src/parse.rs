//! Reading paragraph text and core properties out of an OOXML package.
//!
//! A `.docx` file is a ZIP archive. The body lives in `word/document.xml`
//! and the core properties in `docProps/core.xml`:
//!
//! ```xml
//! <dc:creator>Jane Doe</dc:creator>
//! <cp:revision>2</cp:revision>
//! <dcterms:created xsi:type="dcterms:W3CDTF">2024-06-09T21:17:00Z</dcterms:created>
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::NsReader;
use serde_json::Value;
use synaptic_core::SynapticError;
use zip::ZipArchive;

/// Prefix added to every core-property metadata key.
pub const METADATA_PREFIX: &str = "docx_";

/// How a core property is stored in document metadata.
#[derive(Clone, Copy)]
enum PropertyKind {
    Text,
    Date,
    Integer,
}

const WORDML_NS: &[u8] = b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DC_NS: &[u8] = b"http://purl.org/dc/elements/1.1/";
const DCTERMS_NS: &[u8] = b"http://purl.org/dc/terms/";
const CP_NS: &[u8] = b"http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

/// Core property name, its element namespace and local name in
/// `docProps/core.xml`, and its kind.
const CORE_PROPERTIES: &[(&str, &[u8], &[u8], PropertyKind)] = &[
    ("author", DC_NS, b"creator", PropertyKind::Text),
    ("category", CP_NS, b"category", PropertyKind::Text),
    ("comments", DC_NS, b"description", PropertyKind::Text),
    ("content_status", CP_NS, b"contentStatus", PropertyKind::Text),
    ("created", DCTERMS_NS, b"created", PropertyKind::Date),
    ("identifier", DC_NS, b"identifier", PropertyKind::Text),
    ("keywords", CP_NS, b"keywords", PropertyKind::Text),
    ("language", DC_NS, b"language", PropertyKind::Text),
    ("last_modified_by", CP_NS, b"lastModifiedBy", PropertyKind::Text),
    ("last_printed", CP_NS, b"lastPrinted", PropertyKind::Date),
    ("modified", DCTERMS_NS, b"modified", PropertyKind::Date),
    ("revision", CP_NS, b"revision", PropertyKind::Integer),
    ("subject", DC_NS, b"subject", PropertyKind::Text),
    ("title", DC_NS, b"title", PropertyKind::Text),
    ("version", CP_NS, b"version", PropertyKind::Text),
];

/// Text and core properties of one parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocxContent {
    /// Top-level body paragraphs, in document order.
    pub paragraphs: Vec<String>,
    /// Non-empty core properties keyed `docx_<name>`.
    pub properties: HashMap<String, Value>,
}

impl DocxContent {
    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Parse a `.docx` package held in memory.
pub fn parse_docx(data: &[u8]) -> Result<DocxContent, SynapticError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| SynapticError::Parsing(format!("not a docx package: {e}")))?;

    let document_xml = read_entry(&mut archive, "word/document.xml")?
        .ok_or_else(|| SynapticError::Parsing("missing word/document.xml".to_string()))?;
    let paragraphs = parse_paragraphs(&document_xml)?;

    // Packages without core properties are still valid documents.
    let properties = match read_entry(&mut archive, "docProps/core.xml")? {
        Some(core_xml) => parse_core_properties(&core_xml)?,
        None => HashMap::new(),
    };

    Ok(DocxContent {
        paragraphs,
        properties,
    })
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, SynapticError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(SynapticError::Parsing(format!("reading {name}: {e}"))),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| SynapticError::Parsing(format!("reading {name}: {e}")))?;
    Ok(Some(content))
}

/// Collect the text of every paragraph that is a direct child of `w:body`.
///
/// Elements are matched by namespace, so any prefix bound to the
/// WordprocessingML namespace works. Paragraphs inside tables, text boxes and
/// other containers are skipped. Inside a run, `w:t` contributes its text,
/// `w:tab` and `w:ptab` a tab, `w:noBreakHyphen` a hyphen, and `w:cr` or a
/// line-type `w:br` a newline. Page and column breaks contribute nothing.
pub(crate) fn parse_paragraphs(xml: &str) -> Result<Vec<String>, SynapticError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    // Local names of open elements; `None` outside the WordprocessingML namespace.
    let mut path: Vec<Option<Vec<u8>>> = Vec::new();
    // Number of open w:p elements; only depth one is a body paragraph.
    let mut paragraph_depth = 0usize;
    let mut current: Option<String> = None;
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = wordml_name(&reader, e.name());
                if matches!(name.as_deref(), Some(b"p")) {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && parent_is(&path, b"body") {
                        current = Some(String::new());
                    }
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = wordml_name(&reader, e.name());
                if matches!(name.as_deref(), Some(b"p")) {
                    if paragraph_depth == 0 && parent_is(&path, b"body") {
                        paragraphs.push(String::new());
                    }
                } else if paragraph_depth == 1 && parent_is(&path, b"r") {
                    if let Some(text) = current.as_mut() {
                        match name.as_deref() {
                            Some(b"tab" | b"ptab") => text.push('\t'),
                            Some(b"noBreakHyphen") => text.push('-'),
                            Some(b"cr") => text.push('\n'),
                            Some(b"br") if is_line_break(&reader, &e)? => text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if paragraph_depth == 1 && parent_is(&path, b"t") {
                    if let Some(text) = current.as_mut() {
                        let unescaped = e
                            .unescape()
                            .map_err(|e| SynapticError::Parsing(format!("document.xml: {e}")))?;
                        text.push_str(&unescaped);
                    }
                }
            }
            Ok(Event::End(e)) => {
                path.pop();
                if matches!(wordml_name(&reader, e.name()).as_deref(), Some(b"p")) {
                    if paragraph_depth == 1 {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SynapticError::Parsing(format!(
                    "document.xml at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn parent_is(path: &[Option<Vec<u8>>], name: &[u8]) -> bool {
    matches!(path.last(), Some(Some(last)) if last.as_slice() == name)
}

fn is_bound_to(ns: &ResolveResult, uri: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == uri)
}

/// Local name of `name` when it belongs to the WordprocessingML namespace.
fn wordml_name<R>(reader: &NsReader<R>, name: QName) -> Option<Vec<u8>> {
    let (ns, local) = reader.resolve_element(name);
    is_bound_to(&ns, WORDML_NS).then(|| local.as_ref().to_vec())
}

/// A `w:br` without `w:type`, or with `w:type="textWrapping"`, is a line break.
fn is_line_break<R>(reader: &NsReader<R>, element: &BytesStart) -> Result<bool, SynapticError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| SynapticError::Parsing(format!("document.xml: {e}")))?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        if is_bound_to(&ns, WORDML_NS) && local.as_ref() == b"type" {
            return Ok(attr.value.as_ref() == b"textWrapping");
        }
    }
    Ok(true)
}

/// Read the core properties that are present and non-empty.
pub(crate) fn parse_core_properties(xml: &str) -> Result<HashMap<String, Value>, SynapticError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut raw: HashMap<&'static str, String> = HashMap::new();
    let mut current: Option<(&'static str, PropertyKind)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (ns, local) = reader.resolve_element(e.name());
                current = CORE_PROPERTIES
                    .iter()
                    .find(|(_, uri, element, _)| {
                        is_bound_to(&ns, uri) && *element == local.as_ref()
                    })
                    .map(|(name, _, _, kind)| (*name, *kind));
            }
            Ok(Event::Text(e)) => {
                if let Some((name, _)) = current {
                    let text = e
                        .unescape()
                        .map_err(|e| SynapticError::Parsing(format!("core.xml: {e}")))?;
                    raw.entry(name).or_default().push_str(&text);
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SynapticError::Parsing(format!(
                    "core.xml at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    let mut properties = HashMap::new();
    for (name, _, _, kind) in CORE_PROPERTIES {
        let Some(text) = raw.get(name).map(|t| t.trim()).filter(|t| !t.is_empty()) else {
            continue;
        };
        let value = match kind {
            PropertyKind::Text => Some(Value::String(text.to_string())),
            PropertyKind::Date => parse_w3cdtf(text)
                .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            PropertyKind::Integer => text.parse::<u64>().ok().map(Value::from),
        };
        if let Some(value) = value {
            properties.insert(format!("{METADATA_PREFIX}{name}"), value);
        }
    }
    Ok(properties)
}

/// Parse a W3CDTF timestamp. Values without a zone are taken as UTC.
fn parse_w3cdtf(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{inner}</w:body></w:document>"#
        )
    }

    #[test]
    fn runs_are_concatenated() {
        let xml = body(r#"<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#);
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["Hello world"]);
    }

    #[test]
    fn tabs_and_breaks_become_whitespace() {
        let xml = body(r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#);
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["a\tb\nc"]);
    }

    #[test]
    fn page_and_column_breaks_are_dropped() {
        let xml = body(
            r#"<w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:t>b</w:t><w:br w:type="column"/><w:t>c</w:t><w:br w:type="textWrapping"/><w:t>d</w:t></w:r></w:p>"#,
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["abc\nd"]);
    }

    #[test]
    fn hyphens_and_carriage_returns_in_runs() {
        let xml = body(r#"<w:p><w:r><w:t>e</w:t><w:noBreakHyphen/><w:t>mail</w:t><w:cr/><w:t>x</w:t></w:r></w:p>"#);
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["e-mail\nx"]);
    }

    #[test]
    fn any_prefix_bound_to_wordml_is_accepted() {
        let xml = r#"<doc:document xmlns:doc="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><doc:body><doc:p><doc:r><doc:t>hi</doc:t></doc:r></doc:p></doc:body></doc:document>"#;
        assert_eq!(parse_paragraphs(xml).unwrap(), vec!["hi"]);
    }

    #[test]
    fn foreign_namespace_with_the_w_prefix_is_ignored() {
        let xml = r#"<w:document xmlns:w="urn:other"><w:body><w:p><w:r><w:t>no</w:t></w:r></w:p></w:body></w:document>"#;
        assert!(parse_paragraphs(xml).unwrap().is_empty());
    }

    #[test]
    fn core_properties_resolve_by_namespace() {
        let xml = r#"<props xmlns:a="http://purl.org/dc/elements/1.1/" xmlns:b="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"><a:title>Report</a:title><b:revision>3</b:revision><title>unqualified</title></props>"#;
        let props = parse_core_properties(xml).unwrap();
        assert_eq!(props["docx_title"], Value::from("Report"));
        assert_eq!(props["docx_revision"], Value::from(3u64));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn tab_stops_in_paragraph_properties_are_ignored() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#,
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["x"]);
    }

    #[test]
    fn table_paragraphs_are_skipped() {
        let xml = body(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p/>"#,
        );
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["before", ""]);
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let xml = body(r#"<w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p>"#);
        assert_eq!(parse_paragraphs(&xml).unwrap(), vec!["Fish & chips"]);
    }

    #[test]
    fn dates_without_zone_are_utc() {
        let dt = parse_w3cdtf("2024-06-09T21:17:00").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true), "2024-06-09T21:17:00Z");
        assert!(parse_w3cdtf("2024-06-09").is_some());
        assert!(parse_w3cdtf("yesterday").is_none());
    }
}
