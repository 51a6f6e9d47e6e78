//! Identifier code extraction and normalization.
//!
//! # Overview
//!
//! Free text (a manifest line, a file name) may carry an identifier of the
//! shape `LETTERS[-]DIGITS`. This module finds it and returns the canonical
//! form `UPPER(LETTERS)-DIGITS`.
//!
//! - LETTERS: 2 to 10 ASCII letters, upper-cased
//! - DIGITS: 2 to 8 ASCII digits, kept verbatim (no zero-padding changes)
//! - CJK ideographs (U+4E00..=U+9FA5) are noise and act as separators
//!
//! A missing match is an ordinary outcome and is reported as `None`.
//!
//! # Example
//!
//! ```
//! use codesweep::codes::normalize;
//!
//! assert_eq!(normalize("xxx ABC-001 yyy").unwrap().as_str(), "ABC-001");
//! assert_eq!(normalize("abc123").unwrap().as_str(), "ABC-123");
//! assert!(normalize("中文无码").is_none());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern for a raw code: letter prefix, optional dash, digit suffix.
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z]{2,10})-?([0-9]{2,8})").expect("code pattern is a valid regex")
});

/// First and last code points of the ideograph block treated as noise.
const NOISE_START: char = '\u{4e00}';
const NOISE_END: char = '\u{9fa5}';

/// A normalized identifier of the form `LETTERS-DIGITS`.
///
/// Only produced by [`normalize`] / [`normalize_all`], so every value is
/// guaranteed to be canonical. Ordering is plain string ordering, which is
/// the order used by every report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalCode(String);

impl CanonicalCode {
    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code and return the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    fn from_parts(letters: &str, digits: &str) -> Self {
        let mut code = String::with_capacity(letters.len() + digits.len() + 1);
        code.push_str(&letters.to_ascii_uppercase());
        code.push('-');
        code.push_str(digits);
        Self(code)
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Replace ideographs with spaces so they split surrounding text.
fn strip_noise(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_noise) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_noise(c) { ' ' } else { c })
            .collect(),
    )
}

fn is_noise(c: char) -> bool {
    (NOISE_START..=NOISE_END).contains(&c)
}

/// Extract the first code found in `text`.
///
/// Returns `None` when nothing in the text matches the pattern.
///
/// ```
/// use codesweep::codes::normalize;
///
/// // Digits are preserved verbatim.
/// assert_ne!(normalize("ABC-1"), normalize("ABC-001"));
/// // One letter is below the minimum prefix length.
/// assert!(normalize("A-1").is_none());
/// ```
#[must_use]
pub fn normalize(text: &str) -> Option<CanonicalCode> {
    let cleaned = strip_noise(text);
    CODE_PATTERN
        .captures(&cleaned)
        .map(|caps| CanonicalCode::from_parts(&caps[1], &caps[2]))
}

/// Extract every non-overlapping code found in `text`, in order of appearance.
///
/// Duplicates are kept; callers collect into a set when they need distinct
/// codes.
#[must_use]
pub fn normalize_all(text: &str) -> Vec<CanonicalCode> {
    let cleaned = strip_noise(text);
    CODE_PATTERN
        .captures_iter(&cleaned)
        .map(|caps| CanonicalCode::from_parts(&caps[1], &caps[2]))
        .collect()
}
