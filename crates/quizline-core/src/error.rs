//! Error types for bank construction and session transitions.
//!
//! `BankError` is a configuration error: no session may be built from a bank
//! that fails validation. `SessionError` is a caller contract violation
//! returned by the session mutators.

use thiserror::Error;

use crate::model::{QuestionId, TagFilter};

/// Errors raised while building a `QuestionBank`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// A question offers fewer than two choices.
    #[error("question {id} has {count} choice(s), at least 2 are required")]
    TooFewChoices { id: QuestionId, count: usize },

    /// The answer index does not point at one of the choices.
    #[error("question {id} has answer_index {answer_index} but only {choices} choices")]
    AnswerOutOfRange {
        id: QuestionId,
        answer_index: usize,
        choices: usize,
    },

    /// Two questions share the same id.
    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),
}

/// Errors returned by `QuizSession` mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The working set is empty, so there is no question to act on.
    #[error("no questions available for filter '{filter}'")]
    NoQuestions { filter: TagFilter },

    /// The selected choice is not one of the current question's choices.
    #[error("choice {choice} is out of range for question {id} ({choices} choices)")]
    ChoiceOutOfRange {
        id: QuestionId,
        choice: usize,
        choices: usize,
    },
}
