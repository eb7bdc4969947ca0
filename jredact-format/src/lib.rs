//! jredact Format - Core primitives for streaming JSON redaction
//!
//! This crate provides the I/O-free building blocks of jredact:
//!
//! - Case-insensitive sensitive key sets
//! - The recursive mask/hash redaction transform
//! - Error types and exit-status mapping
//! - Reader limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod limits;
pub mod redact;

// Re-export commonly used types
pub use error::{FileKind, RedactError, Result, UnhashableValue};
pub use keys::SensitiveKeySet;
pub use limits::ReaderLimits;
pub use redact::{type_name, Redacted, RedactionMode, Redactor, MASK_PLACEHOLDER};
