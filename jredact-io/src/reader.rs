//! Incremental reader for top-level JSON arrays
//!
//! Elements are framed byte by byte (tracking string and bracket state) so
//! that only the element currently being decoded is held in memory. Each
//! framed element is then decoded in full with `serde_json`.

use jredact_format::{RedactError, ReaderLimits, Result};
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, BufRead};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet; expecting `[`.
    Start,
    /// Just after `[`; expecting an element or `]`.
    First,
    /// After an element; expecting `,` or `]`.
    Separator,
    /// Closing bracket consumed and trailing bytes checked.
    Done,
    /// An error was returned; iteration is over.
    Failed,
}

/// Iterator over the elements of a top-level JSON array
///
/// Yields one fully decoded element per call. Stops after the closing `]` or
/// after the first error.
pub struct JsonArrayStream<R: BufRead> {
    reader: R,
    limits: ReaderLimits,
    state: State,
    elements_read: usize,
    bytes_read: u64,
    scratch: Vec<u8>,
}

impl<R: BufRead> JsonArrayStream<R> {
    /// Create a stream with default limits
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, ReaderLimits::default())
    }

    /// Create a stream with explicit limits
    pub fn with_limits(reader: R, limits: ReaderLimits) -> Self {
        Self {
            reader,
            limits,
            state: State::Start,
            elements_read: 0,
            bytes_read: 0,
            scratch: Vec::new(),
        }
    }

    /// Number of elements decoded so far (also the index of the next one)
    pub fn elements_read(&self) -> usize {
        self.elements_read
    }

    /// Bytes consumed from the underlying reader
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// True once the closing bracket has been consumed without error
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Consume the stream and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn advance(&mut self) -> Result<Option<Value>> {
        loop {
            match self.state {
                State::Start => {
                    self.skip_bom()?;
                    match self.next_token()? {
                        Some(b'[') => self.state = State::First,
                        Some(other) => {
                            return Err(self.malformed(format!(
                                "expected '[' at start of input, found {}",
                                describe_byte(other)
                            )))
                        }
                        None => {
                            return Err(self.malformed(
                                "expected '[' at start of input, found end of input".to_string(),
                            ))
                        }
                    }
                }
                State::First => match self.peek_token()? {
                    Some(b']') => {
                        self.consume(1);
                        self.finish_trailing()?;
                        return Ok(None);
                    }
                    Some(_) => return self.read_element().map(Some),
                    None => {
                        return Err(self.malformed("unexpected end of input".to_string()));
                    }
                },
                State::Separator => match self.next_token()? {
                    Some(b',') => match self.peek_token()? {
                        Some(b']') => {
                            return Err(self.malformed("trailing comma before ']'".to_string()));
                        }
                        Some(_) => return self.read_element().map(Some),
                        None => {
                            return Err(self.malformed("unexpected end of input".to_string()));
                        }
                    },
                    Some(b']') => {
                        self.finish_trailing()?;
                        return Ok(None);
                    }
                    Some(other) => {
                        return Err(self.malformed(format!(
                            "expected ',' or ']' after element, found {}",
                            describe_byte(other)
                        )));
                    }
                    None => {
                        return Err(self.malformed("unexpected end of input".to_string()));
                    }
                },
                State::Done | State::Failed => return Ok(None),
            }
        }
    }

    fn read_element(&mut self) -> Result<Value> {
        self.scratch.clear();
        self.frame_element()?;

        let value = decode(&self.scratch).map_err(|err| self.malformed(err.to_string()))?;
        self.elements_read += 1;
        self.state = State::Separator;
        Ok(value)
    }

    /// Copy the bytes of one element into `scratch`, leaving the reader on
    /// the first byte after it.
    fn frame_element(&mut self) -> Result<()> {
        let first = match self.peek_byte()? {
            Some(byte) => byte,
            None => return Err(self.malformed("unexpected end of input".to_string())),
        };

        if first != b'{' && first != b'[' && first != b'"' {
            // Bare scalar: runs until a delimiter, which is left unread. End of
            // input here means the array was cut short, possibly mid-number.
            loop {
                match self.peek_byte()? {
                    Some(byte) if byte == b',' || byte == b']' || is_whitespace(byte) => {
                        return Ok(())
                    }
                    Some(byte) => {
                        self.push_scratch(byte)?;
                        self.consume(1);
                    }
                    None => return Err(self.malformed("unexpected end of input".to_string())),
                }
            }
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        loop {
            let byte = match self.peek_byte()? {
                Some(byte) => byte,
                None => return Err(self.malformed("unexpected end of input".to_string())),
            };
            self.push_scratch(byte)?;
            self.consume(1);

            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                continue;
            }

            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => {
                    depth += 1;
                    if depth > self.limits.max_depth {
                        return Err(self.limit_exceeded(format!(
                            "nesting depth exceeds {} levels",
                            self.limits.max_depth
                        )));
                    }
                }
                b'}' | b']' => {
                    // Mismatched brackets are left for the decoder to reject.
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn finish_trailing(&mut self) -> Result<()> {
        match self.next_token()? {
            None => {
                self.state = State::Done;
                Ok(())
            }
            Some(other) => Err(self.malformed(format!(
                "trailing data after closing ']': {}",
                describe_byte(other)
            ))),
        }
    }

    fn push_scratch(&mut self, byte: u8) -> Result<()> {
        if self.scratch.len() >= self.limits.max_element_bytes {
            return Err(self.limit_exceeded(format!(
                "element larger than {} bytes",
                self.limits.max_element_bytes
            )));
        }
        self.scratch.push(byte);
        Ok(())
    }

    fn skip_bom(&mut self) -> Result<()> {
        if self.peek_byte()? != Some(UTF8_BOM[0]) {
            return Ok(());
        }
        for expected in UTF8_BOM {
            match self.peek_byte()? {
                Some(byte) if byte == expected => self.consume(1),
                _ => return Err(self.malformed("invalid byte-order mark".to_string())),
            }
        }
        Ok(())
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        Ok(fill_buf(&mut self.reader)?.first().copied())
    }

    fn consume(&mut self, amount: usize) {
        self.reader.consume(amount);
        self.bytes_read += amount as u64;
    }

    /// Skip whitespace and return the next byte without consuming it.
    fn peek_token(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = fill_buf(&mut self.reader)?;
            if buf.is_empty() {
                return Ok(None);
            }
            let skip = buf.iter().take_while(|byte| is_whitespace(**byte)).count();
            let next = buf.get(skip).copied();
            self.consume(skip);
            if next.is_some() {
                return Ok(next);
            }
        }
    }

    /// Skip whitespace and consume the next byte.
    fn next_token(&mut self) -> Result<Option<u8>> {
        let next = self.peek_token()?;
        if next.is_some() {
            self.consume(1);
        }
        Ok(next)
    }

    fn malformed(&self, reason: String) -> RedactError {
        RedactError::MalformedInput {
            index: self.elements_read,
            reason,
        }
    }

    fn limit_exceeded(&self, reason: String) -> RedactError {
        RedactError::LimitExceeded {
            index: self.elements_read,
            reason,
        }
    }
}

impl<R: BufRead> Iterator for JsonArrayStream<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => None,
            Err(err) => {
                self.state = State::Failed;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for JsonArrayStream<R> {}

fn fill_buf<R: BufRead>(reader: &mut R) -> io::Result<&[u8]> {
    loop {
        match reader.fill_buf() {
            Ok(_) => break,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    // Already buffered, so this second call does not read again.
    reader.fill_buf()
}

/// Decode one framed element. Nesting was already bounded by `max_depth`
/// while framing, so serde_json's own recursion cap is lifted.
fn decode(bytes: &[u8]) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn describe_byte(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("byte 0x{:02x}", byte)
    }
}
