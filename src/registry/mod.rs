//! Code registry and duplicate classification.
//!
//! # Overview
//!
//! The [`Registry`] accumulates, for one run, every code observed by any
//! source together with the set of source labels it was seen under and the
//! total bytes attributed to it. Entries are only ever created or merged
//! into; nothing removes them. Iteration is in ascending code order no
//! matter in which order observations arrived.
//!
//! The [`classify`] submodule decides, per entry, whether a code counts as a
//! duplicate.
//!
//! # Example
//!
//! ```
//! use codesweep::codes::normalize;
//! use codesweep::registry::Registry;
//!
//! let mut registry = Registry::new();
//! let code = normalize("abc-001").unwrap();
//! registry.observe(code.clone(), "history", 0);
//! registry.observe(code.clone(), "E_Media", 1024);
//!
//! let entry = registry.get(&code).unwrap();
//! assert_eq!(entry.labels().len(), 2);
//! assert_eq!(entry.aggregate_size_bytes(), 1024);
//! ```

pub mod classify;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::codes::CanonicalCode;
use crate::sources::{SourceBatch, SourceLabel};

pub use classify::{ClassifiedEntry, DuplicateClassifier, DuplicatePolicy};

/// Everything known about one code after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    code: CanonicalCode,
    labels: BTreeSet<SourceLabel>,
    aggregate_size_bytes: u64,
}

impl RegistryEntry {
    fn new(code: CanonicalCode) -> Self {
        Self {
            code,
            labels: BTreeSet::new(),
            aggregate_size_bytes: 0,
        }
    }

    /// The code.
    #[must_use]
    pub fn code(&self) -> &CanonicalCode {
        &self.code
    }

    /// Labels the code was seen under, sorted.
    #[must_use]
    pub fn labels(&self) -> &BTreeSet<SourceLabel> {
        &self.labels
    }

    /// Total bytes of every file carrying the code.
    #[must_use]
    pub fn aggregate_size_bytes(&self) -> u64 {
        self.aggregate_size_bytes
    }

    /// Whether the code was seen under `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Per-run accumulation of code observations.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<CanonicalCode, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `code` was seen under `label`, adding `size_bytes` to its total.
    ///
    /// The entry is created on first sight; later observations union the
    /// label and accumulate the size.
    pub fn observe(&mut self, code: CanonicalCode, label: &str, size_bytes: u64) {
        let entry = self
            .entries
            .entry(code)
            .or_insert_with_key(|code| RegistryEntry::new(code.clone()));
        if !entry.labels.contains(label) {
            entry.labels.insert(label.to_string());
        }
        entry.aggregate_size_bytes = entry.aggregate_size_bytes.saturating_add(size_bytes);
    }

    /// Record every observation of a batch under the batch label.
    pub fn observe_batch(&mut self, batch: &SourceBatch) {
        for observation in &batch.observations {
            self.observe(observation.code.clone(), &batch.label, observation.size_bytes);
        }
    }

    /// Look up a code.
    #[must_use]
    pub fn get(&self, code: &CanonicalCode) -> Option<&RegistryEntry> {
        self.entries.get(code)
    }

    /// Entries in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no code has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all aggregate sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries
            .values()
            .map(|e| e.aggregate_size_bytes)
            .fold(0u64, u64::saturating_add)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a RegistryEntry;
    type IntoIter = std::collections::btree_map::Values<'a, CanonicalCode, RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
