//! Streaming writer for JSON array output
//!
//! Holds the most recent element back by one step: an element is only
//! written once the next one arrives (followed by a comma) or the stream is
//! finished (without one), so the output never carries a trailing comma.

use jredact_format::{RedactError, Result};
use serde_json::Value;
use std::io::Write;

/// How each element is serialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputStyle {
    /// One element per line
    #[default]
    Compact,
    /// Indented, multi-line elements
    Pretty,
}

/// JSON array writer with a one-element delay buffer
pub struct DelayedArrayWriter<W: Write> {
    writer: W,
    style: OutputStyle,
    pending: Option<Value>,
    opened: bool,
    elements_written: usize,
}

impl<W: Write> DelayedArrayWriter<W> {
    /// Create a writer; nothing is written until [`begin`](Self::begin) or the first push
    pub fn new(writer: W, style: OutputStyle) -> Self {
        Self {
            writer,
            style,
            pending: None,
            opened: false,
            elements_written: 0,
        }
    }

    /// Write the opening bracket. Idempotent.
    pub fn begin(&mut self) -> Result<()> {
        if !self.opened {
            self.writer.write_all(b"[\n")?;
            self.opened = true;
        }
        Ok(())
    }

    /// Buffer `value`, writing the previously buffered element with a separator
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.begin()?;
        if let Some(previous) = self.pending.replace(value) {
            self.write_element(&previous)?;
            self.writer.write_all(b",\n")?;
        }
        Ok(())
    }

    /// Element held back awaiting the next push or finish
    pub fn pending(&self) -> Option<&Value> {
        self.pending.as_ref()
    }

    /// Elements fully written so far (excludes the pending one)
    pub fn elements_written(&self) -> usize {
        self.elements_written
    }

    /// Write the pending element and closing bracket, flush, and return the sink
    pub fn finish(mut self) -> Result<W> {
        self.begin()?;
        if let Some(last) = self.pending.take() {
            self.write_element(&last)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(b"]\n")?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    /// Flush what has been written without closing the array.
    ///
    /// Used on the failure path so partial output reaches the sink; the
    /// pending element is dropped.
    pub fn abandon(mut self) -> Result<W> {
        self.pending = None;
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_element(&mut self, value: &Value) -> Result<()> {
        match self.style {
            OutputStyle::Compact => serde_json::to_writer(&mut self.writer, value),
            OutputStyle::Pretty => serde_json::to_writer_pretty(&mut self.writer, value),
        }
        .map_err(write_error)?;
        self.elements_written += 1;
        Ok(())
    }
}

// Sink failures surface as I/O errors, not as JSON errors.
fn write_error(err: serde_json::Error) -> RedactError {
    if err.is_io() {
        RedactError::Io(err.into())
    } else {
        RedactError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(values: Vec<Value>, style: OutputStyle) -> String {
        let mut writer = DelayedArrayWriter::new(Vec::new(), style);
        writer.begin().unwrap();
        for value in values {
            writer.push(value).unwrap();
        }
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn empty_array_has_brackets_on_own_lines() {
        assert_eq!(render(vec![], OutputStyle::Compact), "[\n]\n");
    }

    #[test]
    fn finish_without_begin_still_frames() {
        let writer = DelayedArrayWriter::new(Vec::new(), OutputStyle::Compact);
        assert_eq!(writer.finish().unwrap(), b"[\n]\n");
    }

    #[test]
    fn single_element_has_no_comma() {
        assert_eq!(
            render(vec![json!({"a": 1})], OutputStyle::Compact),
            "[\n{\"a\":1}\n]\n"
        );
    }

    #[test]
    fn elements_are_comma_separated() {
        let out = render(
            vec![json!({"a": 1}), json!({"b": 2}), json!({"c": 3})],
            OutputStyle::Compact,
        );
        assert_eq!(out, "[\n{\"a\":1},\n{\"b\":2},\n{\"c\":3}\n]\n");
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([{"a": 1}, {"b": 2}, {"c": 3}]));
    }

    #[test]
    fn empty_objects_are_kept() {
        let out = render(vec![json!({}), json!({})], OutputStyle::Compact);
        assert_eq!(out, "[\n{},\n{}\n]\n");
    }

    #[test]
    fn pretty_output_parses() {
        let out = render(
            vec![json!({"a": {"b": [1, 2]}}), json!({"c": null})],
            OutputStyle::Pretty,
        );
        assert!(out.starts_with("[\n{\n  \"a\""));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([{"a": {"b": [1, 2]}}, {"c": null}]));
    }

    #[test]
    fn holds_exactly_one_element_back() {
        let mut writer = DelayedArrayWriter::new(Vec::new(), OutputStyle::Compact);
        writer.push(json!(1)).unwrap();
        assert_eq!(writer.pending(), Some(&json!(1)));
        assert_eq!(writer.elements_written(), 0);

        writer.push(json!(2)).unwrap();
        assert_eq!(writer.pending(), Some(&json!(2)));
        assert_eq!(writer.elements_written(), 1);

        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, b"[\n1,\n2\n]\n");
    }

    #[test]
    fn abandon_leaves_array_open() {
        let mut writer = DelayedArrayWriter::new(Vec::new(), OutputStyle::Compact);
        writer.push(json!({"a": 1})).unwrap();
        writer.push(json!({"a": 2})).unwrap();
        let bytes = writer.abandon().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "[\n{\"a\":1},\n");
    }
}
