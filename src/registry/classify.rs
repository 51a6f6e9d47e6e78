//! Duplicate classification of registry entries.
//!
//! Two policies are supported:
//!
//! - [`DuplicatePolicy::Baseline`]: a code is a duplicate when it is in the
//!   baseline source **and** in at least one other source. Codes only in the
//!   baseline, or only in new sources (however many), are not flagged. With
//!   no baseline at all, nothing is flagged.
//! - [`DuplicatePolicy::MultiSource`]: a code is a duplicate when it appears
//!   under two or more labels, whatever they are.

use serde::Serialize;

use super::{Registry, RegistryEntry};
use crate::sources::SourceLabel;

/// Rule deciding whether an entry is a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", content = "baseline", rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Attested in the baseline and freshly rediscovered elsewhere.
    Baseline(Option<SourceLabel>),
    /// Attested in at least two sources.
    MultiSource,
}

/// Applies a [`DuplicatePolicy`] to registry entries.
#[derive(Debug, Clone)]
pub struct DuplicateClassifier {
    policy: DuplicatePolicy,
}

impl DuplicateClassifier {
    /// Create a classifier for `policy`.
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    /// Classifier for the baseline rule.
    #[must_use]
    pub fn with_baseline(baseline: Option<SourceLabel>) -> Self {
        Self::new(DuplicatePolicy::Baseline(baseline))
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> &DuplicatePolicy {
        &self.policy
    }

    /// Whether `entry` is a duplicate under the active policy.
    #[must_use]
    pub fn is_duplicate(&self, entry: &RegistryEntry) -> bool {
        match &self.policy {
            DuplicatePolicy::Baseline(Some(baseline)) => {
                entry.has_label(baseline) && entry.labels().len() > 1
            }
            DuplicatePolicy::Baseline(None) => false,
            DuplicatePolicy::MultiSource => entry.labels().len() > 1,
        }
    }

    /// Classify every registry entry, in ascending code order.
    #[must_use]
    pub fn classify<'a>(&self, registry: &'a Registry) -> Vec<ClassifiedEntry<'a>> {
        registry
            .iter()
            .map(|entry| ClassifiedEntry {
                entry,
                duplicate: self.is_duplicate(entry),
            })
            .collect()
    }
}

/// A registry entry with its duplicate flag.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedEntry<'a> {
    /// The entry
    pub entry: &'a RegistryEntry,
    /// Whether it is a duplicate
    pub duplicate: bool,
}
