//! Word extraction from buffer lines
//!
//! A buffer's candidate set is the list of distinct matches of the host's
//! keyword pattern, in the order they first appear (line order, then left to
//! right within a line). The pattern is compiled per request: the host owns
//! it and may change it between calls.

pub mod pages;

use std::collections::HashSet;

use regex::Regex;

use crate::error::SourceError;

pub use pages::split_ranges;

/// Pattern used when the host does not resolve one: underscores, Unicode
/// letters and digits.
pub const DEFAULT_KEYWORD_PATTERN: &str = r"[_\p{L}\d]+";

/// A compiled keyword pattern together with the source string it came from.
#[derive(Debug, Clone)]
pub struct WordPattern {
    source: String,
    regex: Regex,
}

impl WordPattern {
    /// Compile a host-supplied pattern.
    ///
    /// # Errors
    /// Returns [`SourceError::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, SourceError> {
        let regex = Regex::new(pattern).map_err(|source| SourceError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern string this was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Iterate over every non-empty match in `line`, left to right.
    pub fn matches<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex
            .find_iter(line)
            .map(|m| m.as_str())
            .filter(|word| !word.is_empty())
    }
}

impl Default for WordPattern {
    fn default() -> Self {
        Self {
            source: DEFAULT_KEYWORD_PATTERN.to_string(),
            regex: Regex::new(DEFAULT_KEYWORD_PATTERN).expect("default keyword pattern compiles"),
        }
    }
}

/// Extract the distinct words of `lines`, preserving first-occurrence order.
pub fn extract_words<S: AsRef<str>>(lines: &[S], pattern: &WordPattern) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut words = Vec::new();

    for line in lines {
        for word in pattern.matches(line.as_ref()) {
            if seen.insert(word) {
                words.push(word.to_string());
            }
        }
    }

    words
}
