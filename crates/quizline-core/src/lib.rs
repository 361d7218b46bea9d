//! quizline-core — Question bank and quiz session state machine.
//!
//! This crate defines the question data model, the immutable question bank
//! with tag filtering, the bank file parser, and the `QuizSession` state
//! machine that the presentation layers drive.

pub mod bank;
pub mod error;
pub mod model;
pub mod parser;
pub mod score;
pub mod session;

pub use bank::QuestionBank;
pub use error::{BankError, SessionError};
pub use model::{Question, QuestionId, TagFilter};
pub use score::{Progress, ScoreCard};
pub use session::{AnswerOutcome, Phase, QuizSession};
