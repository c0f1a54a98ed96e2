//! Candidate records and the sources that enumerate them (made by FontLab https://www.fontlab.com/)

use std::collections::HashSet;
use std::io::BufRead;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// One font under evaluation.
///
/// `identity` is the family name handed to the rendering backend; `display_label`
/// is whatever the host would show a person (often a localized family name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub identity: String,
    pub display_label: String,
}

impl Candidate {
    pub fn new(identity: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_label: display_label.into(),
        }
    }

    /// Candidate whose label is its identity.
    pub fn named(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            display_label: identity.clone(),
            identity,
        }
    }
}

/// Trait for enumerating candidates from some backing store (font database, name list, etc.).
///
/// Enumeration is one-shot and may fail wholesale; a failure means "no
/// candidates at all", never a per-font verdict.
pub trait CandidateSource {
    fn enumerate(&self) -> Result<Vec<Candidate>>;
}

/// Fixed in-memory candidate list.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    candidates: Vec<Candidate>,
}

impl StaticSource {
    pub fn new<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Candidate>,
    {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Build a source from bare family names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Candidate::named))
    }
}

impl CandidateSource for StaticSource {
    fn enumerate(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }
}

/// Newline-delimited `identity[<TAB>label]` records, read once.
#[derive(Debug, Clone)]
pub struct NameListSource {
    text: String,
}

impl NameListSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Drain a reader (typically STDIN) into a source.
    pub fn from_reader(mut reader: impl BufRead) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self { text })
    }
}

impl CandidateSource for NameListSource {
    fn enumerate(&self) -> Result<Vec<Candidate>> {
        let candidates: Vec<Candidate> = self.text.lines().filter_map(parse_record).collect();

        if candidates.is_empty() && !self.text.trim().is_empty() {
            return Err(anyhow!("name list contains no usable records"));
        }

        Ok(candidates)
    }
}

fn parse_record(line: &str) -> Option<Candidate> {
    let mut parts = line.splitn(2, '\t');
    let identity = parts.next()?.trim();
    if identity.is_empty() {
        return None;
    }

    let label = parts
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(identity);

    Some(Candidate::new(identity, label))
}

/// Collapse candidates sharing an identity, keeping the first occurrence and
/// the original order.
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.identity.clone()))
        .collect()
}
