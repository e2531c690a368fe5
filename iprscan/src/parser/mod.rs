//! Result document parsing.
//!
//! Two layers, both pure: [`document`] extracts match records from the
//! raw XML, [`annotate`] maps them into sequence annotations. The
//! scheduler feeds one result document per finished job through both.

mod annotate;
mod document;

pub use annotate::{
    annotate_document, annotate_failure, INTERPRO_TERM_CATEGORY, NO_RESULTS_NAME, SCAN_ERROR_NAME,
};
pub use document::{DocumentError, EntryRef, MatchLocation, MatchRecord, ResultDocument};
