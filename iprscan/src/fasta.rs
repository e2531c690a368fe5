//! FASTA input parsing.
//!
//! Reads the plain-text FASTA shape: a `>` header line naming the
//! sequence, followed by one or more residue lines. The name is the
//! first whitespace-delimited token after the `>`; the rest of the
//! header line is a free-form description and is ignored. Residue
//! lines are concatenated with all internal whitespace removed.

use std::io::{BufRead, BufReader, Read};

use thiserror::Error;

use crate::sequence::SequenceRecord;

/// Problems with the FASTA input stream.
#[derive(Debug, Error)]
pub enum FastaError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    /// Residue data appeared before any `>` header.
    #[error("line {line}: sequence data before the first '>' header")]
    MissingHeader { line: usize },
    /// A `>` line with no name on it.
    #[error("line {line}: '>' header has no sequence name")]
    BlankHeader { line: usize },
    /// A header with no residue lines under it.
    #[error("sequence '{name}' has no residues")]
    EmptyRecord { name: String },
}

/// Parse every record from a FASTA stream.
pub fn parse_fasta<R: Read>(input: R) -> Result<Vec<SequenceRecord>, FastaError> {
    let mut records = Vec::new();
    let mut current: Option<(String, String)> = None;

    for (number, line) in BufReader::new(input).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('>') {
            if let Some((name, residues)) = current.take() {
                records.push(finish(name, residues)?);
            }
            let name = rest
                .split_whitespace()
                .next()
                .ok_or(FastaError::BlankHeader { line: number + 1 })?;
            current = Some((name.to_string(), String::new()));
        } else {
            let Some((_, residues)) = current.as_mut() else {
                return Err(FastaError::MissingHeader { line: number + 1 });
            };
            for chunk in trimmed.split_whitespace() {
                residues.push_str(chunk);
            }
        }
    }
    if let Some((name, residues)) = current {
        records.push(finish(name, residues)?);
    }
    Ok(records)
}

fn finish(name: String, residues: String) -> Result<SequenceRecord, FastaError> {
    if residues.is_empty() {
        return Err(FastaError::EmptyRecord { name });
    }
    Ok(SequenceRecord::new(name, residues))
}
