//! Scan request options.

/// Member-database applications selected by default, in display order.
///
/// These are the application names the EBI dispatcher recognizes. The
/// selection is carried on [`ScanOptions`] for callers that surface it,
/// but the submission endpoint falls back to all applications when none
/// are transmitted, so the client does not send it.
pub const DEFAULT_APPLICATIONS: [&str; 21] = [
    "CDD",
    "Phobius",
    "SignalP_EUK",
    "Coils",
    "PIRSF",
    "SignalP_GRAM_NEGATIVE",
    "Gene3d",
    "PRINTS",
    "SignalP_GRAM_POSITIVE",
    "HAMAP",
    "PrositePatterns",
    "SMART",
    "MobiDBLite",
    "PrositeProfiles",
    "SuperFamily",
    "Panther",
    "SFLD",
    "NCBIfam",
    "PfamA",
    "SignalP",
    "TMHMM",
];

/// How integrated InterPro entries are surfaced on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureMode {
    /// One extra whole-sequence annotation per distinct InterPro entry.
    #[default]
    Separate,
    /// InterPro entry details folded into each match annotation's
    /// qualifiers.
    Qualifiers,
}

impl FeatureMode {
    /// Display token for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureMode::Separate => "separately",
            FeatureMode::Qualifiers => "qualifiers",
        }
    }
}

/// Options describing what to ask the remote service for and how to
/// render the results.
///
/// # Example
///
/// ```
/// use iprscan::config::{FeatureMode, ScanOptions};
///
/// let options = ScanOptions::new("someone@example.org")
///     .with_goterms(true)
///     .with_feature_mode(FeatureMode::Qualifiers);
/// assert!(options.goterms());
/// assert!(!options.pathways());
/// assert_eq!(options.email(), "someone@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    email: String,
    applications: Vec<String>,
    feature_mode: FeatureMode,
    goterms: bool,
    pathways: bool,
    extra_features: bool,
}

impl ScanOptions {
    /// Create options with the given contact email and all defaults.
    ///
    /// The service requires a contact address for error reporting; the
    /// library transmits it as given, syntactic validation is a caller
    /// concern.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            applications: DEFAULT_APPLICATIONS.iter().map(|s| s.to_string()).collect(),
            feature_mode: FeatureMode::default(),
            goterms: false,
            pathways: false,
            extra_features: false,
        }
    }

    /// Replace the selected member-database applications.
    pub fn with_applications(mut self, applications: Vec<String>) -> Self {
        self.applications = applications;
        self
    }

    /// Set how InterPro entries are surfaced.
    pub fn with_feature_mode(mut self, mode: FeatureMode) -> Self {
        self.feature_mode = mode;
        self
    }

    /// Request GO term annotation from the service.
    pub fn with_goterms(mut self, enabled: bool) -> Self {
        self.goterms = enabled;
        self
    }

    /// Request pathway annotation from the service.
    pub fn with_pathways(mut self, enabled: bool) -> Self {
        self.pathways = enabled;
        self
    }

    /// Annotate sequences that returned no results or failed.
    pub fn with_extra_features(mut self, enabled: bool) -> Self {
        self.extra_features = enabled;
        self
    }

    /// Contact email transmitted with each submission.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Selected member-database applications.
    pub fn applications(&self) -> &[String] {
        &self.applications
    }

    /// How InterPro entries are surfaced.
    pub fn feature_mode(&self) -> FeatureMode {
        self.feature_mode
    }

    /// Whether GO term annotation is requested.
    pub fn goterms(&self) -> bool {
        self.goterms
    }

    /// Whether pathway annotation is requested.
    pub fn pathways(&self) -> bool {
        self.pathways
    }

    /// Whether no-result and failed sequences get placeholder annotations.
    pub fn extra_features(&self) -> bool {
        self.extra_features
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new("")
    }
}
