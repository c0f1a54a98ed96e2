//! Verdict storage shared between the scanner and its readers (made by FontLab https://www.fontlab.com/)

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Tri-state Japanese support classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

impl Verdict {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Verdict::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unknown => "unknown",
            Verdict::Supported => "supported",
            Verdict::Unsupported => "unsupported",
        }
    }
}

/// A candidate together with its current verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub identity: String,
    pub display_label: String,
    pub verdict: Verdict,
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: Vec<(Candidate, Verdict)>,
    index: HashMap<String, usize>,
}

/// Identity → verdict map with monotonic updates.
///
/// Entries keep ingestion order. Every read takes the lock, so a reader on
/// another thread never observes a half-written record.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: RwLock<StoreInner>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate with its initial verdict. Returns `false` (and changes
    /// nothing) if the identity is already present.
    pub fn insert(&self, candidate: Candidate, verdict: Verdict) -> bool {
        let mut inner = self.inner.write();
        if inner.index.contains_key(&candidate.identity) {
            return false;
        }
        let slot = inner.entries.len();
        inner.index.insert(candidate.identity.clone(), slot);
        inner.entries.push((candidate, verdict));
        true
    }

    /// Current verdict, or `None` for identities never ingested.
    pub fn get(&self, identity: &str) -> Option<Verdict> {
        let inner = self.inner.read();
        inner
            .index
            .get(identity)
            .map(|&slot| inner.entries[slot].1)
    }

    /// Resolve an `Unknown` entry. Resolved entries and unknown identities are
    /// left untouched and report `false`.
    pub fn set_if_unknown(&self, identity: &str, verdict: Verdict) -> bool {
        if !verdict.is_resolved() {
            return false;
        }

        let mut inner = self.inner.write();
        let Some(&slot) = inner.index.get(identity) else {
            return false;
        };

        let current = &mut inner.entries[slot].1;
        if current.is_resolved() {
            return false;
        }
        *current = verdict;
        true
    }

    pub fn count_supported(&self) -> usize {
        self.count(Verdict::Supported)
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|(_, v)| *v == verdict)
            .count()
    }

    /// Candidates still awaiting a verdict, in ingestion order.
    pub fn pending(&self) -> Vec<Candidate> {
        self.inner
            .read()
            .entries
            .iter()
            .filter(|(_, v)| !v.is_resolved())
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Consistent copy of every entry, in ingestion order.
    pub fn snapshot(&self) -> Vec<(Candidate, Verdict)> {
        self.inner.read().entries.clone()
    }

    /// Snapshot flattened into serializable rows.
    pub fn entries(&self) -> Vec<ScanEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|(c, v)| ScanEntry {
                identity: c.identity.clone(),
                display_label: c.display_label.clone(),
                verdict: *v,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
