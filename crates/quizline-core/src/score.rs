//! Running score and progress for the current run.

use serde::{Deserialize, Serialize};

/// Correct/attempted counters for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub correct: u32,
    pub attempted: u32,
}

impl ScoreCard {
    /// `"correct/attempted"`, e.g. `"3/5"`; `"0/0"` before any attempt.
    #[must_use]
    pub fn ratio(&self) -> String {
        format!("{}/{}", self.correct, self.attempted)
    }

    /// Fraction of attempts answered correctly, if anything was attempted.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        if self.attempted == 0 {
            None
        } else {
            Some(f64::from(self.correct) / f64::from(self.attempted))
        }
    }

    #[must_use]
    pub fn missed(&self) -> u32 {
        self.attempted.saturating_sub(self.correct)
    }

    pub(crate) fn record(&mut self, correct: bool) {
        self.attempted = self.attempted.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
    }
}

/// Position within the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Zero-based index of the current question.
    pub position: usize,
    /// Size of the working set.
    pub total: usize,
}

impl Progress {
    /// `position / total`, or 0 when the working set is empty.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.position as f64 / self.total as f64
        }
    }

    /// Whole-number percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        u8::try_from(self.position * 100 / self.total).unwrap_or(100)
    }

    /// One-based question number for "Question i of n".
    #[must_use]
    pub fn question_number(&self) -> usize {
        self.position + 1
    }
}
