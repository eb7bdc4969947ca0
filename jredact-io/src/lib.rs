//! jredact I/O - Streaming redaction of JSON array documents
//!
//! This crate provides the I/O layer of jredact:
//!
//! - An incremental reader that yields one array element at a time
//! - A delayed writer that emits a well-formed array without trailing commas
//! - The pipeline wiring reader, redactor, and writer together
//! - Key-source loading and input/output plumbing for the CLI

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod pipeline;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use jredact_format::{
    FileKind, ReaderLimits, RedactError, RedactionMode, Redactor, Result, SensitiveKeySet,
    MASK_PLACEHOLDER,
};
pub use pipeline::{redact_stream, RedactOptions, RedactSummary};
pub use reader::JsonArrayStream;
pub use writer::{DelayedArrayWriter, OutputStyle};

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where the sensitive key list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Comma-separated list given directly
    Inline(String),
    /// File whose first line is a comma-separated list
    File(PathBuf),
}

impl KeySource {
    /// Load and case-fold the key list.
    pub fn load(&self) -> Result<SensitiveKeySet> {
        let keys = match self {
            KeySource::Inline(list) => SensitiveKeySet::parse(list),
            KeySource::File(path) => {
                let file = open_file(path, FileKind::Key)?;
                let mut line = String::new();
                BufReader::new(file).read_line(&mut line)?;
                let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                debug!(path = %path.display(), "loaded key file");
                SensitiveKeySet::parse(line)
            }
        };

        if keys.has_empty_key() {
            warn!("key list contains an empty entry; it only matches an empty JSON key");
        }
        Ok(keys)
    }
}

/// Input source for a redaction run
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A file on disk
    Path(PathBuf),
    /// Any reader
    Reader(Box<dyn Read + Send>),
}

/// Output destination for a redaction run
pub enum OutputSink {
    /// Standard output
    Stdout,
    /// A file on disk, created or truncated
    Path(PathBuf),
    /// Any writer
    Writer(Box<dyn Write + Send>),
}

/// A complete redaction run
pub struct RedactRequest {
    /// Where the JSON array is read from
    pub input: InputSource,
    /// Where the redacted array is written
    pub output: OutputSink,
    /// Sensitive keys to match
    pub keys: SensitiveKeySet,
    /// Mode, style, and limits
    pub options: RedactOptions,
}

/// Run a redaction request to completion
pub fn execute_redact(request: RedactRequest) -> Result<RedactSummary> {
    execute_redact_with_progress(request, |_| {})
}

/// Run a redaction request, reporting the running element count after each element
pub fn execute_redact_with_progress<F>(request: RedactRequest, on_element: F) -> Result<RedactSummary>
where
    F: FnMut(usize),
{
    let RedactRequest {
        input,
        output,
        keys,
        options,
    } = request;

    // Input is opened first so a missing file produces no output at all.
    let reader: Box<dyn BufRead> = match input {
        InputSource::Stdin => Box::new(io::stdin().lock()),
        InputSource::Path(path) => Box::new(BufReader::new(open_file(&path, FileKind::Input)?)),
        InputSource::Reader(reader) => Box::new(BufReader::new(reader)),
    };

    let writer: Box<dyn Write> = match output {
        OutputSink::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
        OutputSink::Path(path) => Box::new(BufWriter::new(File::create(&path)?)),
        OutputSink::Writer(writer) => Box::new(BufWriter::new(writer)),
    };

    let (summary, _) = redact_stream(reader, writer, keys, &options, on_element)?;
    Ok(summary)
}

fn open_file(path: &Path, kind: FileKind) -> Result<File> {
    File::open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            RedactError::NotFound {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            RedactError::Io(err)
        }
    })
}
