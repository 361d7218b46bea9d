//! Core data model types for quizline.
//!
//! A `Question` is an immutable multiple-choice record supplied by the bank
//! loader. `TagFilter` selects a topical subset of a bank.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a question, unique within a bank.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: QuestionId,
    /// Question text shown to the learner.
    pub stem: String,
    /// Answer options in display order.
    pub choices: Vec<String>,
    /// Index into `choices` of the correct option.
    pub answer_index: usize,
    /// Tags used for filtering.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Explanation shown once the answer is revealed.
    #[serde(default)]
    pub rationale: String,
}

impl Question {
    /// Whether `choice` is the correct option.
    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer_index
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The text of the correct option.
    #[must_use]
    pub fn correct_choice(&self) -> Option<&str> {
        self.choices.get(self.answer_index).map(String::as_str)
    }
}

/// Tag selection applied to a bank.
///
/// The string form `"all"` is the sentinel meaning "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// Sentinel spelling of [`TagFilter::All`].
    pub const ALL: &'static str = "all";

    pub fn tag(name: impl Into<String>) -> Self {
        TagFilter::Tag(name.into())
    }

    /// Whether `question` belongs to the subset this filter selects.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(tag) => question.has_tag(tag),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            TagFilter::All => Self::ALL,
            TagFilter::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("tag filter cannot be empty".to_string()),
            Self::ALL => Ok(TagFilter::All),
            tag => Ok(TagFilter::Tag(tag.to_string())),
        }
    }
}
