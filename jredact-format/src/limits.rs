//! Reader limits and configuration

use crate::error::{RedactError, Result};

/// Limits applied while framing array elements, bounding per-element memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderLimits {
    /// Maximum encoded size of a single element (default: 64 MiB, hard: 1 GiB)
    pub max_element_bytes: usize,
    /// Maximum nesting depth inside an element (default: 128, hard: 512)
    pub max_depth: usize,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        Self {
            max_element_bytes: 64 * 1024 * 1024,
            max_depth: 128,
        }
    }
}

impl ReaderLimits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_element_bytes: 1024 * 1024 * 1024,
            max_depth: 512,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();

        if self.max_element_bytes == 0 || self.max_element_bytes > hard.max_element_bytes {
            return Err(RedactError::Config(format!(
                "max_element_bytes must be between 1 and {} (got {})",
                hard.max_element_bytes, self.max_element_bytes
            )));
        }

        if self.max_depth == 0 || self.max_depth > hard.max_depth {
            return Err(RedactError::Config(format!(
                "max_depth must be between 1 and {} (got {})",
                hard.max_depth, self.max_depth
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_within_hard_max() {
        assert!(ReaderLimits::default().validate().is_ok());
        assert!(ReaderLimits::hard_maximums().validate().is_ok());
    }

    #[test]
    fn rejects_values_over_hard_max() {
        let limits = ReaderLimits {
            max_depth: 513,
            ..ReaderLimits::default()
        };
        let err = limits.validate().unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn rejects_zero_element_size() {
        let limits = ReaderLimits {
            max_element_bytes: 0,
            ..ReaderLimits::default()
        };
        assert!(matches!(limits.validate(), Err(RedactError::Config(_))));
    }
}
