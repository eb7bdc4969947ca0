//! Sequential read → redact → write pipeline

use crate::reader::JsonArrayStream;
use crate::writer::{DelayedArrayWriter, OutputStyle};
use jredact_format::{
    type_name, ReaderLimits, RedactError, RedactionMode, Redactor, Result, SensitiveKeySet,
};
use std::io::{BufRead, Write};
use tracing::{debug, trace};

/// Options for a redaction run
#[derive(Debug, Clone)]
pub struct RedactOptions {
    /// Replacement strategy for sensitive values
    pub mode: RedactionMode,
    /// Element serialization style
    pub style: OutputStyle,
    /// Per-element framing limits
    pub limits: ReaderLimits,
    /// Reject elements that are not JSON objects
    pub require_objects: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            mode: RedactionMode::Mask,
            style: OutputStyle::Compact,
            limits: ReaderLimits::default(),
            require_objects: true,
        }
    }
}

/// Counters reported after a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactSummary {
    /// Elements written to the output array
    pub elements_written: usize,
    /// Sensitive values masked or hashed
    pub values_replaced: usize,
    /// Bytes consumed from the input
    pub bytes_read: u64,
    /// Mode the run used
    pub mode: RedactionMode,
}

/// Stream `input` through the redactor into `output`.
///
/// `on_element` is called with the running element count after each element.
/// On failure the array is left unterminated: whatever was written before the
/// failing element stays in `output`, the held-back element is dropped, and
/// the closing bracket is never written.
pub fn redact_stream<R, W, F>(
    input: R,
    output: W,
    keys: SensitiveKeySet,
    options: &RedactOptions,
    mut on_element: F,
) -> Result<(RedactSummary, W)>
where
    R: BufRead,
    W: Write,
    F: FnMut(usize),
{
    options.limits.validate()?;
    debug!(
        mode = options.mode.as_str(),
        keys = keys.len(),
        "starting redaction stream"
    );

    let redactor = Redactor::new(keys, options.mode);
    let mut stream = JsonArrayStream::with_limits(input, options.limits.clone());
    let mut writer = DelayedArrayWriter::new(output, options.style);

    let values_replaced = match drive(
        &mut stream,
        &mut writer,
        &redactor,
        options.require_objects,
        &mut on_element,
    ) {
        Ok(count) => count,
        Err(err) => {
            debug!(
                index = err.element_index(),
                written = writer.elements_written(),
                "aborting redaction stream"
            );
            // The original failure matters more than a flush error here.
            let _ = writer.abandon();
            return Err(err);
        }
    };

    let elements_written = stream.elements_read();
    let bytes_read = stream.bytes_read();
    let output = writer.finish()?;

    let summary = RedactSummary {
        elements_written,
        values_replaced,
        bytes_read,
        mode: options.mode,
    };
    debug!(
        elements = summary.elements_written,
        replaced = summary.values_replaced,
        bytes = summary.bytes_read,
        "finished redaction stream"
    );
    Ok((summary, output))
}

fn drive<R, W, F>(
    stream: &mut JsonArrayStream<R>,
    writer: &mut DelayedArrayWriter<W>,
    redactor: &Redactor,
    require_objects: bool,
    on_element: &mut F,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(usize),
{
    let mut values_replaced = 0;
    writer.begin()?;

    for (index, item) in stream.enumerate() {
        let value = item?;
        if require_objects && !value.is_object() {
            return Err(RedactError::MalformedInput {
                index,
                reason: format!("element is {}, expected an object", type_name(&value)),
            });
        }

        let redacted = redactor
            .redact(value)
            .map_err(|source| RedactError::TypeMismatch { index, source })?;
        trace!(index, replaced = redacted.replaced, "element redacted");
        values_replaced += redacted.replaced;

        writer.push(redacted.value)?;
        on_element(index + 1);
    }

    Ok(values_replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;

    fn run(input: &str, keys: &str, options: &RedactOptions) -> (Result<RedactSummary>, String) {
        let mut output = Vec::new();
        let result = redact_stream(
            Cursor::new(input.as_bytes()),
            &mut output,
            SensitiveKeySet::parse(keys),
            options,
            |_| {},
        )
        .map(|(summary, _)| summary);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn masks_and_frames_output() {
        let input = r#"[{"user":"alice","password":"a"},{"user":"bob","Password":"b"}]"#;
        let (result, out) = run(input, "password", &RedactOptions::default());
        let summary = result.unwrap();
        assert_eq!(summary.elements_written, 2);
        assert_eq!(summary.values_replaced, 2);
        assert_eq!(summary.bytes_read, input.len() as u64);
        assert_eq!(
            out,
            "[\n{\"user\":\"alice\",\"password\":\"***REDACTED***\"},\n{\"user\":\"bob\",\"Password\":\"***REDACTED***\"}\n]\n"
        );
    }

    #[test]
    fn empty_input_array() {
        let (result, out) = run("[]", "password", &RedactOptions::default());
        assert_eq!(result.unwrap().elements_written, 0);
        assert_eq!(out, "[\n]\n");
    }

    #[test]
    fn truncated_input_leaves_partial_output() {
        let input = r#"[{"a":1},{"a":2},{"a":3},{"a":"#;
        let (result, out) = run(input, "password", &RedactOptions::default());
        let err = result.unwrap_err();
        assert_eq!(err.element_index(), Some(3));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(out, "[\n{\"a\":1},\n{\"a\":2},\n");
        assert!(!out.contains(']'));
    }

    #[test]
    fn hash_type_mismatch_reports_index() {
        let options = RedactOptions {
            mode: RedactionMode::Hash,
            ..RedactOptions::default()
        };
        let (result, _) = run(
            r#"[{"password":"ok"},{"password":12345}]"#,
            "password",
            &options,
        );
        match result.unwrap_err() {
            RedactError::TypeMismatch { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source.key, "password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_element_is_malformed_when_required() {
        let (result, _) = run(r#"[{"a":1}, 5]"#, "a", &RedactOptions::default());
        match result.unwrap_err() {
            RedactError::MalformedInput { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_elements_pass_through_when_allowed() {
        let options = RedactOptions {
            require_objects: false,
            ..RedactOptions::default()
        };
        let (result, out) = run(r#"[1, "password", [{"password": "x"}]]"#, "password", &options);
        assert_eq!(result.unwrap().values_replaced, 0);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([1, "password", [{"password": "x"}]]));
    }

    #[test]
    fn progress_callback_counts_elements() {
        let mut seen = Vec::new();
        let mut output = Vec::new();
        redact_stream(
            Cursor::new(br#"[{"a":1},{"a":2},{"a":3}]"#.as_slice()),
            &mut output,
            SensitiveKeySet::parse("a"),
            &RedactOptions::default(),
            |count| seen.push(count),
        )
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn invalid_limits_fail_before_output() {
        let options = RedactOptions {
            limits: ReaderLimits {
                max_depth: 0,
                ..ReaderLimits::default()
            },
            ..RedactOptions::default()
        };
        let (result, out) = run("[]", "a", &options);
        assert!(matches!(result, Err(RedactError::Config(_))));
        assert!(out.is_empty());
    }
}
