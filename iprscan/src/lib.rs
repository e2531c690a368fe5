//! iprscan - Batch protein annotation through the EBI InterProScan 5
//! REST service.
//!
//! The library submits protein sequences to the remote service, polls
//! them to completion, and turns the XML result documents into plain
//! annotation records. The pieces stack up as:
//!
//! - [`client`] - REST submission, status polling, result download
//! - [`parser`] - XML result extraction and annotation mapping
//! - [`admission`] - process-wide queue serializing whole batches
//! - [`scheduler`] - sliding-window driver tying the above together
//!
//! # High-Level API
//!
//! ```ignore
//! use iprscan::client::EbiClient;
//! use iprscan::config::ScanOptions;
//! use iprscan::scheduler::ScanScheduler;
//! use tokio_util::sync::CancellationToken;
//!
//! let options = ScanOptions::new("you@example.org");
//! let scheduler = ScanScheduler::new(EbiClient::new()?, options);
//! let results = scheduler.run(&sequences, &CancellationToken::new()).await?;
//! ```

pub mod admission;
pub mod annotation;
pub mod client;
pub mod config;
pub mod error;
pub mod fasta;
pub mod logging;
pub mod parser;
pub mod scheduler;
pub mod sequence;

/// Version of the iprscan library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
