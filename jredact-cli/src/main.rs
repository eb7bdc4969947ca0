//! jredact CLI - Command-line tool for streaming JSON redaction
//!
//! Reads a top-level JSON array from a file or stdin and writes the same
//! array with every sensitive key's value masked or hashed. Exit status:
//! 0 success, 1 configuration error, 2 input or key file not found,
//! 3 malformed input (including non-string values in hash mode).

use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use jredact_format::error::{EXIT_CONFIG, EXIT_SUCCESS};
use jredact_io::{
    execute_redact_with_progress, InputSource, KeySource, OutputSink, OutputStyle, ReaderLimits,
    RedactError, RedactOptions, RedactRequest, RedactSummary, RedactionMode,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "jredact")]
#[command(about = "Redact or hash sensitive keys in a streamed JSON array")]
#[command(version)]
struct Cli {
    /// Input file holding a top-level JSON array (defaults to stdin)
    input: Option<String>,
    /// Comma-separated list of sensitive keys (case-insensitive); an empty
    /// list counts as not given
    #[arg(long)]
    keys: Option<String>,
    /// File whose first line is a comma-separated list of sensitive keys
    #[arg(long)]
    key_file: Option<PathBuf>,
    /// (Default) Replace sensitive values with "***REDACTED***"
    #[arg(long, conflicts_with = "hash")]
    mask: bool,
    /// Replace sensitive values with a deterministic SHA-256 hex digest
    #[arg(long)]
    hash: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Pretty-print each element
    #[arg(long)]
    pretty: bool,
    /// Largest accepted element, in bytes
    #[arg(long, default_value = "67108864")]
    max_element_bytes: usize,
    /// Deepest accepted nesting inside an element
    #[arg(long, default_value = "128")]
    max_depth: usize,
    /// Show progress spinner while redacting
    #[arg(long)]
    progress: bool,
    /// Print a run summary to stderr
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_CONFIG,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match handle_redact(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_redact(cli: Cli) -> Result<(), RedactError> {
    let start = Instant::now();
    let key_source = resolve_key_source(cli.keys, cli.key_file)?;
    let options = RedactOptions {
        mode: if cli.hash {
            RedactionMode::Hash
        } else {
            RedactionMode::Mask
        },
        style: if cli.pretty {
            OutputStyle::Pretty
        } else {
            OutputStyle::Compact
        },
        limits: ReaderLimits {
            max_element_bytes: cli.max_element_bytes,
            max_depth: cli.max_depth,
        },
        require_objects: true,
    };
    options.limits.validate()?;

    let keys = key_source.load()?;
    tracing::debug!(keys = ?keys.sorted(), mode = options.mode.as_str(), "resolved configuration");

    let request = RedactRequest {
        input: resolve_input(cli.input.as_deref()),
        output: cli.output.clone().map_or(OutputSink::Stdout, OutputSink::Path),
        keys,
        options,
    };

    let mut progress_bar = cli.progress.then(|| create_spinner("Redacting elements"));
    let result = execute_redact_with_progress(request, |count| {
        if let Some(pb) = progress_bar.as_ref() {
            pb.set_position(count as u64);
        }
    });
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(pb) = progress_bar.take() {
                pb.abandon();
            }
            return Err(err);
        }
    };

    let elapsed = start.elapsed();
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    let rec_rate = summary.elements_written as f64 / secs;
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Redacted {} elements ({} values) in {:.2?} ({:.1} elem/s)",
            summary.elements_written, summary.values_replaced, elapsed, rec_rate
        ));
    }
    tracing::info!(
        elements = summary.elements_written,
        replaced = summary.values_replaced,
        "redaction complete"
    );
    if cli.stats {
        report_summary(&summary, cli.output.as_deref(), elapsed, rec_rate)?;
    }
    Ok(())
}

fn resolve_key_source(
    keys: Option<String>,
    key_file: Option<PathBuf>,
) -> Result<KeySource, RedactError> {
    match (keys.filter(|list| !list.is_empty()), key_file) {
        (Some(_), Some(_)) => Err(RedactError::Config(
            "Only one of '--keys' or '--key-file' options must be provided.".to_string(),
        )),
        (Some(list), None) => Ok(KeySource::Inline(list)),
        (None, Some(path)) => Ok(KeySource::File(path)),
        (None, None) => Err(RedactError::Config(
            "One of '--keys' or '--key-file' options must be provided.".to_string(),
        )),
    }
}

fn resolve_input(input: Option<&str>) -> InputSource {
    match input {
        None | Some("") => InputSource::Stdin,
        Some(path) => InputSource::Path(PathBuf::from(path)),
    }
}

fn report_summary(
    summary: &RedactSummary,
    output: Option<&Path>,
    elapsed: Duration,
    rec_rate: f64,
) -> Result<(), RedactError> {
    let destination = output
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Redacted to {} (elements: {}, values {}: {}, bytes read: {}, elapsed: {:.2?}, {:.1} elem/s)",
        destination,
        summary.elements_written,
        match summary.mode {
            RedactionMode::Mask => "masked",
            RedactionMode::Hash => "hashed",
        },
        summary.values_replaced,
        summary.bytes_read,
        elapsed,
        rec_rate
    )?;
    Ok(())
}

fn report_error(err: &RedactError) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(&mut stderr, "{}", err);
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
