//! Match record extraction from result XML.
//!
//! InterProScan result documents nest matches under
//! `<protein><matches>`, with one element per hit whose name varies by
//! analysis type (`hmmer3-match`, `panther-match`, `coils-match`, ...).
//! Locations follow the same pattern under `<locations>`. Extraction
//! therefore keys off document structure, a direct-child relationship,
//! rather than element names.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a result document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The XML itself is malformed.
    #[error("malformed result document: {0}")]
    Malformed(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("bad attribute in result document: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document ended with elements still open.
    #[error("result document truncated inside <{0}>")]
    Truncated(String),
}

/// An integrated InterPro entry attached to a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
    /// Entry accession, e.g. `IPR017896`.
    pub accession: String,
    /// Short entry name.
    pub name: String,
    /// Entry type, e.g. `DOMAIN` or `FAMILY`.
    pub entry_type: String,
}

/// A residue interval reported for a match, 1-based inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLocation {
    pub start: u32,
    pub end: u32,
}

/// One signature match extracted from a result document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Signature accession (`signature@ac`).
    pub signature_ac: String,
    /// Signature name, when the analysis provides one.
    pub signature_name: Option<String>,
    /// Raw member-database name (`signature-library-release@library`).
    pub library: String,
    /// Integrated InterPro entry; absent for unintegrated signatures.
    pub entry: Option<EntryRef>,
    /// Match locations in sequence coordinates.
    pub locations: Vec<MatchLocation>,
}

/// Parsed form of one result document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultDocument {
    /// Number of `<protein>` elements seen.
    pub proteins: usize,
    /// Every match record, in document order.
    pub matches: Vec<MatchRecord>,
}

impl ResultDocument {
    /// Parse a raw result document.
    ///
    /// Match records missing their signature accession or library are
    /// dropped (logged at debug) rather than failing the document, so a
    /// single odd record never discards an otherwise usable result.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the XML is not well formed or an
    /// attribute cannot be decoded.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut doc = ResultDocument::default();
        // Stack of open element names; parents identify what a wildcard
        // element is.
        let mut stack: Vec<String> = Vec::new();
        let mut current: Option<PendingMatch> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = local_name(&e);
                    open_element(&e, &name, &stack, &mut doc, &mut current)?;
                    stack.push(name);
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    open_element(&e, &name, &stack, &mut doc, &mut current)?;
                    // A self-closing direct child of <matches> is a
                    // complete (if empty) match record.
                    if parent_is(&stack, "matches") {
                        commit(&mut current, &mut doc);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                    if parent_is(&stack, "matches") {
                        commit(&mut current, &mut doc);
                    }
                }
                Event::Eof => {
                    if let Some(open) = stack.pop() {
                        return Err(DocumentError::Truncated(open));
                    }
                    break;
                }
                _ => {}
            }
        }
        Ok(doc)
    }
}

/// Partially assembled match record.
#[derive(Default)]
struct PendingMatch {
    signature_ac: Option<String>,
    signature_name: Option<String>,
    library: Option<String>,
    entry: Option<EntryRef>,
    locations: Vec<MatchLocation>,
}

impl PendingMatch {
    fn finish(self) -> Option<MatchRecord> {
        match (self.signature_ac, self.library) {
            (Some(signature_ac), Some(library)) => Some(MatchRecord {
                signature_ac,
                signature_name: self.signature_name,
                library,
                entry: self.entry,
                locations: self.locations,
            }),
            _ => {
                debug!("dropping match record without signature accession or library");
                None
            }
        }
    }
}

fn open_element(
    e: &BytesStart<'_>,
    name: &str,
    stack: &[String],
    doc: &mut ResultDocument,
    current: &mut Option<PendingMatch>,
) -> Result<(), DocumentError> {
    if name == "protein" {
        doc.proteins += 1;
        return Ok(());
    }
    if parent_is(stack, "matches") {
        *current = Some(PendingMatch::default());
        return Ok(());
    }
    let Some(pending) = current.as_mut() else {
        return Ok(());
    };
    if name == "signature" {
        pending.signature_ac = attr(e, "ac")?;
        pending.signature_name = attr(e, "name")?;
    } else if parent_is(stack, "signature") && name == "entry" {
        pending.entry = Some(EntryRef {
            accession: attr(e, "ac")?.unwrap_or_default(),
            name: attr(e, "name")?.unwrap_or_default(),
            entry_type: attr(e, "type")?.unwrap_or_default(),
        });
    } else if parent_is(stack, "signature") && name == "signature-library-release" {
        pending.library = attr(e, "library")?;
    } else if parent_is(stack, "locations") {
        // Direct children only; <location-fragment> elements nest one
        // level deeper and carry start/end of their own.
        match (coord(attr(e, "start")?), coord(attr(e, "end")?)) {
            (Some(start), Some(end)) => pending.locations.push(MatchLocation { start, end }),
            _ => debug!(element = name, "location without usable start/end"),
        }
    }
    Ok(())
}

fn commit(current: &mut Option<PendingMatch>, doc: &mut ResultDocument) {
    if let Some(record) = current.take().and_then(PendingMatch::finish) {
        doc.matches.push(record);
    }
}

fn parent_is(stack: &[String], name: &str) -> bool {
    stack.last().map(String::as_str) == Some(name)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, DocumentError> {
    match e.try_get_attribute(name)? {
        Some(value) => {
            let text = value.unescape_value().map_err(quick_xml::Error::from)?;
            Ok(Some(text.into_owned()))
        }
        None => Ok(None),
    }
}

fn coord(value: Option<String>) -> Option<u32> {
    value.and_then(|v| v.parse().ok())
}
