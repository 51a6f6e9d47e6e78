//! Text decoding with an ordered list of fallback encodings.
//!
//! Manifests arrive in whatever encoding the tool that produced them used:
//! UTF-8 with or without a byte-order mark, GBK, or UTF-16. The bytes are
//! decoded with each encoding of an [`EncodingChain`] in turn and the first
//! decoding accepted by the caller wins. When none is accepted, the last
//! attempt is returned. Invalid sequences are dropped, never fatal.
//!
//! # Example
//!
//! ```
//! use codesweep::sources::decode::{decode_with_fallback, EncodingChain};
//!
//! let chain = EncodingChain::default();
//! let decoded = decode_with_fallback(b"\xEF\xBB\xBFABC-001", &chain, |t| t.contains("ABC"));
//! assert_eq!(decoded.text, "ABC-001");
//! assert_eq!(decoded.encoding, "utf-8-sig");
//! ```

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use thiserror::Error;

/// Labels tried, in order, when nothing is configured.
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8-sig", "gbk", "utf-16", "utf-8"];

/// Labels offered as suggestions for a misspelled encoding.
const KNOWN_LABELS: &[&str] = &[
    "utf-8-sig",
    "utf-8",
    "utf-16",
    "utf-16le",
    "utf-16be",
    "gbk",
    "gb18030",
    "big5",
    "shift_jis",
    "euc-jp",
    "euc-kr",
    "windows-1252",
];

/// Errors raised while building an encoding chain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The label is not a recognized encoding.
    #[error("Unknown encoding '{label}'{}", suggestion_suffix(.suggestion))]
    UnknownEncoding {
        /// The label as configured
        label: String,
        /// Closest known label, if any is near enough
        suggestion: Option<String>,
    },

    /// The chain has no encodings at all.
    #[error("Encoding list is empty")]
    Empty,
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

/// How a single configured label decodes bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    /// UTF-8, leading byte-order mark removed
    Utf8Sig,
    /// UTF-16, endianness taken from the byte-order mark, little-endian otherwise
    Utf16,
    /// Any other encoding, decoded without byte-order mark sniffing
    Plain(&'static Encoding),
}

impl Scheme {
    fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_ascii_lowercase().replace('_', "-");
        match lowered.as_str() {
            "utf-8-sig" | "utf8-sig" => Some(Self::Utf8Sig),
            "utf-16" | "utf16" => Some(Self::Utf16),
            _ => Encoding::for_label(lowered.as_bytes()).map(Self::Plain),
        }
    }

    fn decode(self, bytes: &[u8]) -> String {
        let text = match self {
            Self::Utf8Sig => UTF_8.decode_with_bom_removal(bytes).0,
            Self::Utf16 => {
                if bytes.starts_with(&[0xFE, 0xFF]) {
                    UTF_16BE.decode_with_bom_removal(bytes).0
                } else {
                    UTF_16LE.decode_with_bom_removal(bytes).0
                }
            }
            Self::Plain(encoding) => encoding.decode_without_bom_handling(bytes).0,
        };
        // Drop replacement characters so invalid sequences vanish instead of
        // splitting the surrounding text.
        if text.contains('\u{FFFD}') {
            text.chars().filter(|&c| c != '\u{FFFD}').collect()
        } else {
            text.into_owned()
        }
    }
}

/// An ordered, validated list of encodings to try.
#[derive(Debug, Clone)]
pub struct EncodingChain {
    entries: Vec<(String, Scheme)>,
}

impl EncodingChain {
    /// Build a chain from encoding labels.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownEncoding`] for the first label that is not
    /// recognized, or [`DecodeError::Empty`] when `labels` is empty.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, DecodeError> {
        if labels.is_empty() {
            return Err(DecodeError::Empty);
        }
        let entries = labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                Scheme::from_label(label)
                    .map(|scheme| (label.to_string(), scheme))
                    .ok_or_else(|| DecodeError::UnknownEncoding {
                        label: label.to_string(),
                        suggestion: suggest_label(label),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Labels in the order they are tried.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Number of encodings in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain is empty. Never true for a constructed chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EncodingChain {
    fn default() -> Self {
        let entries = DEFAULT_ENCODINGS
            .iter()
            .filter_map(|label| Scheme::from_label(label).map(|s| ((*label).to_string(), s)))
            .collect();
        Self { entries }
    }
}

fn suggest_label(label: &str) -> Option<String> {
    let lowered = label.to_ascii_lowercase();
    KNOWN_LABELS
        .iter()
        .map(|known| (strsim::levenshtein(&lowered, known), *known))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known.to_string())
}

/// Result of a fallback decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded text
    pub text: String,
    /// Label of the encoding that produced `text`
    pub encoding: String,
    /// Whether `accept` approved this decoding
    pub accepted: bool,
}

/// Decode `bytes` with each encoding of `chain` until `accept` approves.
///
/// When no decoding is accepted the last attempted one is returned with
/// `accepted` set to false.
pub fn decode_with_fallback<F>(bytes: &[u8], chain: &EncodingChain, accept: F) -> Decoded
where
    F: Fn(&str) -> bool,
{
    let mut last = Decoded {
        text: String::new(),
        encoding: String::new(),
        accepted: false,
    };

    for (label, scheme) in &chain.entries {
        let text = scheme.decode(bytes);
        if accept(&text) {
            log::trace!("Decoded {} bytes as {}", bytes.len(), label);
            return Decoded {
                text,
                encoding: label.clone(),
                accepted: true,
            };
        }
        last = Decoded {
            text,
            encoding: label.clone(),
            accepted: false,
        };
    }

    last
}
