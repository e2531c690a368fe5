//! Annotation output model.

/// A 1-based inclusive residue interval. No strand or direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

/// A single annotation produced for a sequence.
///
/// Qualifiers keep insertion order and may repeat keys; consumers that
/// want a map semantics use [`Annotation::qualifier`] which returns the
/// first value for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    name: String,
    category: String,
    qualifiers: Vec<(String, String)>,
    intervals: Vec<Interval>,
}

impl Annotation {
    /// Create an annotation with no qualifiers or intervals yet.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            qualifiers: Vec::new(),
            intervals: Vec::new(),
        }
    }

    /// Append a qualifier, preserving insertion order.
    pub fn add_qualifier(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.qualifiers.push((key.into(), value.into()));
    }

    /// Append a 1-based inclusive interval.
    pub fn add_interval(&mut self, start: u32, end: u32) {
        self.intervals.push(Interval { start, end });
    }

    /// Feature type name, e.g. a signature accession.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category label, e.g. the member database display name.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// All qualifiers in insertion order.
    pub fn qualifiers(&self) -> &[(String, String)] {
        &self.qualifiers
    }

    /// First value recorded for a qualifier key, if any.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All intervals in insertion order.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

/// All annotations produced for one input sequence.
///
/// `Default` is the empty set, which is what failed sequences record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Annotations in the order they were produced.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Number of annotations in the set.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True when no annotations were produced.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
