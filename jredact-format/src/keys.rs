//! Case-insensitive set of sensitive key names

use ahash::AHashSet;
use std::borrow::Cow;

/// Immutable set of case-folded key names whose values must be redacted.
///
/// Built once per run. An empty set is legal and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveKeySet {
    keys: AHashSet<String>,
}

impl SensitiveKeySet {
    /// Build a set from a comma-separated list.
    ///
    /// Tokens are case-folded but otherwise kept as written, so a trailing
    /// comma contributes the empty key and `"a, b"` contributes `" b"`.
    pub fn parse(list: &str) -> Self {
        Self::from_keys(list.split(','))
    }

    /// Build a set from individual key names.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|key| fold_case(key.as_ref()).into_owned())
                .collect(),
        }
    }

    /// Whether `key` names a sensitive value, ignoring case.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(fold_case(key).as_ref())
    }

    /// Number of distinct case-folded keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no keys are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when the list contained an empty token.
    pub fn has_empty_key(&self) -> bool {
        self.keys.contains("")
    }

    /// Case-folded keys in sorted order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl From<&str> for SensitiveKeySet {
    fn from(list: &str) -> Self {
        Self::parse(list)
    }
}

/// Full Unicode default case folding, so `"straße"` and `"STRASSE"` match.
fn fold_case(key: &str) -> Cow<'_, str> {
    if key.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase()) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(caseless::default_case_fold_str(key))
    }
}
