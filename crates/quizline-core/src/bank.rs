//! The immutable, order-preserving question bank.

use std::collections::{HashMap, HashSet};

use crate::error::BankError;
use crate::model::{Question, QuestionId, TagFilter};

/// A validated collection of questions in load order.
///
/// Once built the bank is read-only; share it between sessions with `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    name: String,
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
}

impl QuestionBank {
    /// Build a bank, rejecting any record the session cannot safely use.
    ///
    /// # Errors
    ///
    /// Returns `BankError::TooFewChoices` for questions with fewer than two
    /// choices, `BankError::AnswerOutOfRange` when `answer_index` does not
    /// index into `choices`, and `BankError::DuplicateId` for repeated ids.
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, BankError> {
        let mut by_id = HashMap::with_capacity(questions.len());

        for (index, question) in questions.iter().enumerate() {
            if question.choices.len() < 2 {
                return Err(BankError::TooFewChoices {
                    id: question.id,
                    count: question.choices.len(),
                });
            }
            if question.answer_index >= question.choices.len() {
                return Err(BankError::AnswerOutOfRange {
                    id: question.id,
                    answer_index: question.answer_index,
                    choices: question.choices.len(),
                });
            }
            if by_id.insert(question.id, index).is_some() {
                return Err(BankError::DuplicateId(question.id));
            }
        }

        Ok(Self {
            name: name.into(),
            questions,
            by_id,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All questions in load order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.by_id.get(&id).map(|&index| &self.questions[index])
    }

    /// Questions selected by `filter`, in load order.
    ///
    /// An empty result is a valid outcome, not an error.
    #[must_use]
    pub fn filter_by_tag(&self, filter: &TagFilter) -> Vec<&Question> {
        self.indices_matching(filter)
            .into_iter()
            .map(|index| self.at(index))
            .collect()
    }

    /// Questions whose id is in `ids`, in load order.
    #[must_use]
    pub fn questions_with_ids(&self, ids: &HashSet<QuestionId>) -> Vec<&Question> {
        self.indices_with_ids(ids)
            .into_iter()
            .map(|index| self.at(index))
            .collect()
    }

    /// Distinct tags in first-seen order.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.questions
            .iter()
            .flat_map(|q| q.tags.iter().map(String::as_str))
            .filter(|tag| seen.insert(*tag))
            .collect()
    }

    /// Number of questions carrying each tag, in first-seen tag order.
    #[must_use]
    pub fn tag_counts(&self) -> Vec<(&str, usize)> {
        self.tags()
            .into_iter()
            .map(|tag| (tag, self.questions.iter().filter(|q| q.has_tag(tag)).count()))
            .collect()
    }

    pub(crate) fn indices_matching(&self, filter: &TagFilter) -> Vec<usize> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| filter.matches(q))
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn indices_with_ids(&self, ids: &HashSet<QuestionId>) -> Vec<usize> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| ids.contains(&q.id))
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn at(&self, index: usize) -> &Question {
        &self.questions[index]
    }
}
