//! Protein sequence input model.

/// A named protein sequence queued for annotation.
///
/// The residue string is normalized at construction: a single trailing `*`
/// stop symbol is stripped, and the recorded length reflects the stripped
/// sequence. Whole-sequence annotation intervals are synthesized from that
/// length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    name: String,
    residues: String,
}

impl SequenceRecord {
    /// Create a record, stripping one trailing stop symbol if present.
    pub fn new(name: impl Into<String>, residues: impl Into<String>) -> Self {
        let residues = residues.into();
        let residues = match residues.strip_suffix('*') {
            Some(trimmed) => trimmed.to_string(),
            None => residues,
        };
        Self {
            name: name.into(),
            residues,
        }
    }

    /// Display name used in progress and log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Residues as submitted to the remote service.
    pub fn residues(&self) -> &str {
        &self.residues
    }

    /// Sequence length after terminator stripping.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// True when the record holds no residues.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
