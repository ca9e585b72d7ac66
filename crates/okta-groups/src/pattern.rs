//! Group name extraction.
//!
//! A [`GroupPattern`] decides which provider-side group names are in scope
//! and what they map to on the engine side. Matching is case-insensitive and
//! whole-string: a pattern must consume the entire name, substring hits do
//! not count.
//!
//! When the pattern defines capturing groups, the first capture becomes the
//! output name. `trino_group_(.*)` turns `trino_group_developers` into
//! `developers`; the default `.*` passes every name through unchanged.

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// A compiled group name pattern.
///
/// Immutable after compilation; extraction is a pure function, so one
/// instance can serve concurrent resolution calls without locking.
#[derive(Debug, Clone)]
pub struct GroupPattern {
    pattern: String,
    regex: Regex,
    has_captures: bool,
}

impl GroupPattern {
    /// Compiles a case-insensitive, whole-string pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] on invalid regex syntax. Fatal at
    /// construction time.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        // Anchor with a non-capturing wrapper so user capture indices are
        // preserved and the match must span the whole name.
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError {
                pattern: pattern.to_string(),
                source,
            })?;
        let has_captures = regex.captures_len() > 1;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            has_captures,
        })
    }

    /// The pattern string as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Maps a raw provider group name to an output group name.
    ///
    /// Returns `None` for empty names and for names the pattern does not
    /// fully match. On a match:
    ///
    /// - with capturing groups, the first capture is returned when it is
    ///   non-empty; an empty or unmatched first capture falls back to the
    ///   full raw name,
    /// - without capturing groups, the full raw name is returned unchanged.
    ///
    /// The returned name is therefore always non-empty.
    #[must_use]
    pub fn extract(&self, raw_name: &str) -> Option<String> {
        if raw_name.is_empty() {
            return None;
        }

        let captures = self.regex.captures(raw_name)?;
        if self.has_captures {
            if let Some(first) = captures.get(1) {
                let extracted = first.as_str();
                if !extracted.is_empty() {
                    return Some(extracted.to_string());
                }
            }
        }
        Some(raw_name.to_string())
    }
}
