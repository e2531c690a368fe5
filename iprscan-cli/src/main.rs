//! iprscan CLI - Command-line interface
//!
//! Reads protein sequences from a FASTA file, scans them through the
//! EBI InterProScan 5 REST service, and writes the annotations as
//! tab-separated values.

mod error;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use iprscan::annotation::AnnotationSet;
use iprscan::client::EbiClient;
use iprscan::config::{FeatureMode, ScanOptions};
use iprscan::fasta::parse_fasta;
use iprscan::logging::{init_logging, DEFAULT_LOG_DIR};
use iprscan::scheduler::{
    ScanScheduler, SchedulerConfig, TracingProgress, DEFAULT_MAX_CONCURRENT_JOBS,
};
use iprscan::sequence::SequenceRecord;
use iprscan::VERSION;

use error::CliError;

#[derive(Debug, Clone, ValueEnum)]
enum FeatureModeArg {
    /// Annotate each InterPro entry once as a whole-sequence feature
    Separately,
    /// Fold InterPro entry details into each match's qualifiers
    Qualifiers,
}

impl From<FeatureModeArg> for FeatureMode {
    fn from(arg: FeatureModeArg) -> Self {
        match arg {
            FeatureModeArg::Separately => FeatureMode::Separate,
            FeatureModeArg::Qualifiers => FeatureMode::Qualifiers,
        }
    }
}

#[derive(Parser)]
#[command(name = "iprscan")]
#[command(version = VERSION)]
#[command(about = "Scan protein sequences with the EBI InterProScan service", long_about = None)]
struct Args {
    /// FASTA file with the protein sequences to scan
    #[arg(long)]
    input: String,

    /// Contact email transmitted to the EBI service with each job
    #[arg(long, value_parser = parse_email)]
    email: String,

    /// Output file for tab-separated results (stdout if omitted)
    #[arg(long)]
    output: Option<String>,

    /// How integrated InterPro entries are reported
    #[arg(long, value_enum, default_value = "separately")]
    feature_mode: FeatureModeArg,

    /// Request GO term annotation
    #[arg(long)]
    goterms: bool,

    /// Request pathway annotation
    #[arg(long)]
    pathways: bool,

    /// Annotate sequences that returned no results or failed
    #[arg(long)]
    extra_features: bool,

    /// Member-database applications to report (comma-separated)
    #[arg(long, value_delimiter = ',')]
    applications: Vec<String>,

    /// Maximum jobs in flight at once
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_JOBS, value_parser = parse_max_jobs)]
    max_jobs: usize,

    /// Alternate service base URL (for mirrors and testing)
    #[arg(long)]
    base_url: Option<String>,

    /// Directory for the log file
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let _guard = init_logging(&args.log_dir).map_err(CliError::LoggingInit)?;
    info!(version = VERSION, "iprscan starting");

    let input = File::open(&args.input).map_err(|error| CliError::InputRead {
        path: args.input.clone(),
        error,
    })?;
    let sequences = parse_fasta(input)?;
    if sequences.is_empty() {
        return Err(CliError::NoSequences {
            path: args.input.clone(),
        });
    }
    info!(path = %args.input, sequences = sequences.len(), "input loaded");

    let client = match &args.base_url {
        Some(url) => EbiClient::with_base_url(url),
        None => EbiClient::new(),
    }
    .map_err(CliError::ClientInit)?;
    let mut options = ScanOptions::new(&args.email)
        .with_feature_mode(args.feature_mode.clone().into())
        .with_goterms(args.goterms)
        .with_pathways(args.pathways)
        .with_extra_features(args.extra_features);
    if !args.applications.is_empty() {
        options = options.with_applications(args.applications.clone());
    }
    let config = SchedulerConfig::new().with_max_concurrent_jobs(args.max_jobs);
    let scheduler = ScanScheduler::new(client, options)
        .with_config(config)
        .with_progress(Arc::new(TracingProgress));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling scan");
                cancel.cancel();
            }
        });
    }

    let results = scheduler.run(&sequences, &cancel).await?;
    write_results(&sequences, &results, args.output.as_deref())?;

    let with_annotations = results.iter().filter(|set| !set.is_empty()).count();
    info!(
        sequences = results.len(),
        with_annotations, "scan complete"
    );
    Ok(())
}

/// Write results as TSV, one row per annotation interval.
fn write_results(
    sequences: &[SequenceRecord],
    results: &[AnnotationSet],
    output: Option<&str>,
) -> Result<(), CliError> {
    let to_output_error = |error: io::Error| CliError::OutputWrite {
        path: output.unwrap_or("stdout").to_string(),
        error,
    };
    match output {
        Some(path) => {
            let file = File::create(path).map_err(to_output_error)?;
            let mut writer = BufWriter::new(file);
            render_results(&mut writer, sequences, results).map_err(to_output_error)
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render_results(&mut writer, sequences, results).map_err(to_output_error)
        }
    }
}

fn render_results(
    writer: &mut impl Write,
    sequences: &[SequenceRecord],
    results: &[AnnotationSet],
) -> io::Result<()> {
    writeln!(writer, "sequence\tname\tcategory\tstart\tend\tqualifiers")?;
    for (record, set) in sequences.iter().zip(results) {
        for annotation in set.annotations() {
            let qualifiers = annotation
                .qualifiers()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("; ");
            for interval in annotation.intervals() {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    record.name(),
                    annotation.name(),
                    annotation.category(),
                    interval.start,
                    interval.end,
                    qualifiers
                )?;
            }
        }
    }
    writer.flush()
}

/// Parse the in-flight window cap. The scheduler needs a window that
/// can admit at least one job.
fn parse_max_jobs(value: &str) -> Result<usize, String> {
    let jobs: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if jobs == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(jobs)
}

/// Validate the contact email well enough to catch obvious typos before
/// the service sees it.
fn parse_email(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("email must not be empty".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        return Err("email must not contain whitespace".to_string());
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err("email must contain '@'".to_string());
    };
    if local.is_empty() {
        return Err("email must have a name before the '@'".to_string());
    }
    if domain.contains('@') {
        return Err("email must contain exactly one '@'".to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(format!("'{}' is not a valid email domain", domain));
    }
    Ok(value.to_string())
}
