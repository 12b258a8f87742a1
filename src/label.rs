//! Allocation labels and immutable label sequences.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Allocation group tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    A,
    B,
}

impl Label {
    pub const BOTH: [Label; 2] = [Label::A, Label::B];

    pub fn other(self) -> Self {
        match self {
            Label::A => Label::B,
            Label::B => Label::A,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::A => "A",
            Label::B => "B",
        }
    }

    /// Array slot used by per-label tables.
    pub fn index(self) -> usize {
        match self {
            Label::A => 0,
            Label::B => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-group tallies of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub a: usize,
    pub b: usize,
}

impl GroupCounts {
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::A => self.a,
            Label::B => self.b,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b
    }

    pub fn imbalance(&self) -> usize {
        self.a.abs_diff(self.b)
    }
}

/// An ordered, immutable list of labels.
///
/// Sequences are produced fresh by the generator and never mutated once
/// handed out; callers only get shared views of the labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence(Vec<Label>);

impl Sequence {
    pub fn labels(&self) -> &[Label] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }

    pub fn count(&self, label: Label) -> usize {
        self.0.iter().filter(|&&l| l == label).count()
    }

    pub fn counts(&self) -> GroupCounts {
        let a = self.count(Label::A);
        GroupCounts::new(a, self.0.len() - a)
    }

    /// SHA-256 of the compact label string ("ABAB..."), hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for label in &self.0 {
            hasher.update(label.as_str().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl From<Vec<Label>> for Sequence {
    fn from(labels: Vec<Label>) -> Self {
        Self(labels)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(label.as_str())?;
        }
        Ok(())
    }
}
