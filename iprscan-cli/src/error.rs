//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and a single exit path.

use std::fmt;
use std::process;

use iprscan::client::ClientError;
use iprscan::error::ScanError;
use iprscan::fasta::FastaError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Failed to construct the HTTP client
    ClientInit(ClientError),
    /// Failed to read the input file
    InputRead { path: String, error: std::io::Error },
    /// The input file is not usable FASTA
    Fasta(FastaError),
    /// The input file parsed but held no sequences
    NoSequences { path: String },
    /// The scan run failed as a whole
    Scan(ScanError),
    /// Failed to write results
    OutputWrite { path: String, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if matches!(self, CliError::Scan(ScanError::Cancelled)) {
            eprintln!();
            eprintln!("The scan was interrupted before completing; no results were written.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::ClientInit(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::InputRead { path, error } => {
                write!(f, "Failed to read input '{}': {}", path, error)
            }
            CliError::Fasta(e) => write!(f, "Invalid FASTA input: {}", e),
            CliError::NoSequences { path } => {
                write!(f, "No sequences found in '{}'", path)
            }
            CliError::Scan(e) => write!(f, "Scan failed: {}", e),
            CliError::OutputWrite { path, error } => {
                write!(f, "Failed to write results to '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::ClientInit(e) => Some(e),
            CliError::InputRead { error, .. } => Some(error),
            CliError::Fasta(e) => Some(e),
            CliError::Scan(e) => Some(e),
            CliError::OutputWrite { error, .. } => Some(error),
            CliError::NoSequences { .. } => None,
        }
    }
}

impl From<FastaError> for CliError {
    fn from(e: FastaError) -> Self {
        CliError::Fasta(e)
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        CliError::Scan(e)
    }
}
