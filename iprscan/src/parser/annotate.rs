//! Match records to sequence annotations.

use crate::annotation::{Annotation, AnnotationSet};
use crate::config::FeatureMode;
use crate::parser::document::{EntryRef, MatchRecord, ResultDocument};

/// Category label for whole-sequence InterPro term annotations.
pub const INTERPRO_TERM_CATEGORY: &str = "InterPro Term";

/// Annotation name marking a scan that produced no matches.
pub const NO_RESULTS_NAME: &str = "No InterProScan Results";

/// Annotation name marking a scan that failed or produced an unusable
/// document.
pub const SCAN_ERROR_NAME: &str = "InterProScan Error";

/// Name shown for signatures the analysis did not name.
const UNNAMED_SIGNATURE: &str = "unknown";

/// Entry name and type reported for unintegrated signatures.
const UNINTEGRATED: &str = "Unintegrated";

const ENTRY_URL_PREFIX: &str = "http://www.ebi.ac.uk/interpro/entry/";

/// Convert a parsed result document into annotations for one sequence.
///
/// Each match record becomes one annotation named after its signature
/// name (`unknown` when the analysis supplies none), categorized under
/// the member database's display name, with `Database`/`Id`/`Name`
/// qualifiers carrying the raw library, accession, and name. One
/// interval per location. The feature mode decides how integrated
/// InterPro entries are surfaced: folded into per-match qualifiers, or
/// emitted once per distinct entry as a whole-sequence annotation.
///
/// A document with no match records degrades to the no-results
/// placeholder when `extra_features` is set, and to an empty set
/// otherwise.
pub fn annotate_document(
    doc: &ResultDocument,
    sequence_length: usize,
    mode: FeatureMode,
    extra_features: bool,
) -> AnnotationSet {
    if doc.matches.is_empty() {
        return placeholder(NO_RESULTS_NAME, sequence_length, extra_features);
    }
    let mut set = AnnotationSet::new();
    let mut seen_entries: Vec<&str> = Vec::new();
    for record in &doc.matches {
        set.push(match_annotation(record, mode));
        if mode == FeatureMode::Separate {
            if let Some(entry) = &record.entry {
                if !entry.accession.is_empty() && !seen_entries.contains(&entry.accession.as_str())
                {
                    seen_entries.push(&entry.accession);
                    set.push(entry_annotation(entry, sequence_length));
                }
            }
        }
    }
    set
}

/// Annotations for a scan whose document never arrived or failed to
/// parse: the error placeholder when `extra_features` is set, otherwise
/// an empty set.
pub fn annotate_failure(sequence_length: usize, extra_features: bool) -> AnnotationSet {
    placeholder(SCAN_ERROR_NAME, sequence_length, extra_features)
}

fn match_annotation(record: &MatchRecord, mode: FeatureMode) -> Annotation {
    let name = record.signature_name.as_deref().unwrap_or(UNNAMED_SIGNATURE);
    let mut annotation = Annotation::new(name, pretty_library_name(&record.library));
    annotation.add_qualifier("Database", record.library.clone());
    annotation.add_qualifier("Id", record.signature_ac.clone());
    annotation.add_qualifier("Name", name);
    if mode == FeatureMode::Qualifiers {
        let (id, name, entry_type) = match &record.entry {
            Some(entry) => (
                entry.accession.as_str(),
                entry.name.as_str(),
                entry.entry_type.as_str(),
            ),
            None => ("", UNINTEGRATED, UNINTEGRATED),
        };
        annotation.add_qualifier("InterPro ID", entry_link(id));
        annotation.add_qualifier("InterPro Name", name);
        annotation.add_qualifier("InterPro Type", entry_type);
    }
    for location in &record.locations {
        annotation.add_interval(location.start, location.end);
    }
    annotation
}

fn entry_annotation(entry: &EntryRef, sequence_length: usize) -> Annotation {
    let mut annotation = Annotation::new(entry.name.clone(), INTERPRO_TERM_CATEGORY);
    annotation.add_qualifier("id", entry_link(&entry.accession));
    annotation.add_qualifier("type", entry.entry_type.clone());
    annotation.add_interval(1, sequence_length as u32);
    annotation
}

fn placeholder(name: &str, sequence_length: usize, extra_features: bool) -> AnnotationSet {
    let mut set = AnnotationSet::new();
    if extra_features {
        let mut annotation = Annotation::new(name, INTERPRO_TERM_CATEGORY);
        annotation.add_interval(1, sequence_length as u32);
        set.push(annotation);
    }
    set
}

fn entry_link(id: &str) -> String {
    format!("<a href=\"{}{}\">{}</a>", ENTRY_URL_PREFIX, id, id)
}

/// Display names for member databases whose service names read poorly.
/// Unlisted names pass through unchanged.
fn pretty_library_name(library: &str) -> &str {
    match library {
        "SIGNALP" => "SignalP",
        "PFAM" => "Pfam",
        "SUPERFAMILY" => "Superfamily",
        "GENE3D" => "Gene3D",
        "PRODOM" => "ProDom",
        "PANTHER" => "Panther",
        other => other,
    }
}
