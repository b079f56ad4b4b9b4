//! The name-search state machine.
//!
//! Exactly one of three pattern kinds can be active at a time. The active
//! pattern is stored as a single tagged value, so setting one kind replaces
//! whatever was there before in one assignment, and a failed compile never
//! touches the stored value.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

use crate::error::{Error, Result};

/// Status code reported when no search is active.
pub const NO_SEARCH_CODE: char = 'N';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Substring,
    Glob,
    Regex,
}

impl PatternKind {
    /// Single character shown in the status bar.
    pub fn code(self) -> char {
        match self {
            PatternKind::Substring => 'S',
            PatternKind::Glob => 'G',
            PatternKind::Regex => 'R',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Substring => "substring",
            PatternKind::Glob => "glob",
            PatternKind::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled, non-empty search pattern.
#[derive(Debug, Clone)]
pub enum SearchPattern {
    Substring {
        text: SmartString,
        /// Lowercased copy of `text`, compared against lowercased names.
        lowered: SmartString,
    },
    Glob {
        text: SmartString,
        matcher: GlobMatcher,
    },
    Regex(Regex),
}

impl SearchPattern {
    /// Returns `None` for empty text, which callers treat as "no search".
    pub fn substring(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(SearchPattern::Substring {
            text: text.into(),
            lowered: text.to_lowercase().into(),
        })
    }

    pub fn glob(pattern: &str) -> Result<Self> {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| {
                tracing::debug!(%err, pattern, "Rejected glob pattern");
                Error::InvalidPattern {
                    kind: PatternKind::Glob,
                }
            })?;

        Ok(SearchPattern::Glob {
            text: pattern.into(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| {
                tracing::debug!(%err, pattern, "Rejected regex pattern");
                Error::InvalidPattern {
                    kind: PatternKind::Regex,
                }
            })?;

        Ok(SearchPattern::Regex(regex))
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            SearchPattern::Substring { .. } => PatternKind::Substring,
            SearchPattern::Glob { .. } => PatternKind::Glob,
            SearchPattern::Regex(_) => PatternKind::Regex,
        }
    }

    /// The pattern exactly as the user entered it.
    pub fn as_str(&self) -> &str {
        match self {
            SearchPattern::Substring { text, .. } => text.as_str(),
            SearchPattern::Glob { text, .. } => text.as_str(),
            SearchPattern::Regex(regex) => regex.as_str(),
        }
    }

    #[inline]
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            SearchPattern::Substring { lowered, .. } => contains_ignore_case(name, lowered),
            SearchPattern::Glob { matcher, .. } => matcher.is_match(name),
            SearchPattern::Regex(regex) => regex.is_match(name),
        }
    }
}

impl PartialEq for SearchPattern {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.as_str() == other.as_str()
    }
}

impl Eq for SearchPattern {}

/// Case-insensitive containment. `needle_lower` must already be lowercased.
///
/// Pure ASCII inputs are compared in place with a memchr scan, everything else
/// goes through full Unicode lowercasing of the name.
#[inline]
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    if haystack.is_ascii() && needle_lower.is_ascii() {
        return ascii_case_insensitive_find(haystack.as_bytes(), needle_lower.as_bytes()).is_some();
    }
    haystack.to_lowercase().contains(needle_lower)
}

/// Byte offset of the first ASCII case-insensitive occurrence of
/// `needle_lower` in `haystack`.
///
/// memchr jumps between positions holding either case of the needle's first
/// byte; only those positions get the full byte-wise comparison. Nothing is
/// allocated.
#[inline]
fn ascii_case_insensitive_find(haystack: &[u8], needle_lower: &[u8]) -> Option<usize> {
    if needle_lower.is_empty() {
        return Some(0);
    }
    if haystack.len() < needle_lower.len() {
        return None;
    }

    let first = needle_lower[0];
    let first_upper = first.to_ascii_uppercase();

    for pos in memchr::memchr2_iter(first, first_upper, haystack) {
        if pos + needle_lower.len() > haystack.len() {
            return None;
        }
        let candidate = &haystack[pos..pos + needle_lower.len()];
        if candidate
            .iter()
            .zip(needle_lower.iter())
            .all(|(&h, &n)| h.to_ascii_lowercase() == n)
        {
            return Some(pos);
        }
    }
    None
}

/// The session's search. Starts empty and only changes through the setters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    active: Option<SearchPattern>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty text clears the search. Never fails.
    pub fn set_substring(&mut self, text: &str) {
        self.active = SearchPattern::substring(text);
        tracing::debug!(text, "Search set to substring");
    }

    /// On error the previous search is left in place.
    pub fn set_glob(&mut self, pattern: &str) -> Result<()> {
        if pattern.is_empty() {
            self.clear();
            return Ok(());
        }
        let compiled = SearchPattern::glob(pattern)?;
        self.active = Some(compiled);
        tracing::debug!(pattern, "Search set to glob");
        Ok(())
    }

    /// On error the previous search is left in place.
    pub fn set_regex(&mut self, pattern: &str) -> Result<()> {
        if pattern.is_empty() {
            self.clear();
            return Ok(());
        }
        let compiled = SearchPattern::regex(pattern)?;
        self.active = Some(compiled);
        tracing::debug!(pattern, "Search set to regex");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.active = None;
        tracing::debug!("Search cleared");
    }

    /// Empty names never match, and neither does anything when no search is
    /// active.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.active
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(name))
    }

    pub fn describe_active(&self) -> Option<(PatternKind, &str)> {
        self.active
            .as_ref()
            .map(|pattern| (pattern.kind(), pattern.as_str()))
    }

    pub fn has_any(&self) -> bool {
        self.active.is_some()
    }

    fn pattern_of(&self, kind: PatternKind) -> &str {
        match self.describe_active() {
            Some((active_kind, text)) if active_kind == kind => text,
            _ => "",
        }
    }

    pub fn substring(&self) -> &str {
        self.pattern_of(PatternKind::Substring)
    }

    pub fn glob(&self) -> &str {
        self.pattern_of(PatternKind::Glob)
    }

    pub fn regex(&self) -> &str {
        self.pattern_of(PatternKind::Regex)
    }

    /// `"<code>:<pattern>"` for an active search, the bare no-search code
    /// otherwise.
    pub fn unified(&self) -> String {
        match self.describe_active() {
            Some((kind, text)) => format!("{}:{}", kind.code(), text),
            None => NO_SEARCH_CODE.to_string(),
        }
    }
}
