//! The quiz session state machine.
//!
//! A `QuizSession` owns a shuffled working set drawn from a shared
//! `QuestionBank` and moves through three phases:
//!
//! - `Idle`: the working set is empty
//! - `Answering`: the current question has no selection yet
//! - `Revealed`: the current question was answered and feedback is visible
//!
//! Every mutator is a synchronous, atomic transition. The presentation layer
//! calls a mutator and then re-queries the session to render it.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::bank::QuestionBank;
use crate::error::SessionError;
use crate::model::{Question, QuestionId, TagFilter};
use crate::score::{Progress, ScoreCard};

/// Observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Answering,
    Revealed,
}

/// Result of `QuizSession::select_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { answer_index: usize },
    /// The question was already answered; the first answer stands.
    AlreadyAnswered,
}

/// A single learner's run through a filtered, shuffled set of questions.
#[derive(Debug)]
pub struct QuizSession<R = StdRng> {
    bank: Arc<QuestionBank>,
    rng: R,
    active_filter: TagFilter,
    /// Indices into the bank, in presentation order.
    queue: Vec<usize>,
    position: usize,
    /// `Some` exactly when the current question is revealed.
    selected: Option<usize>,
    score: ScoreCard,
    missed: Vec<QuestionId>,
    reset_missed_on_restart: bool,
}

impl QuizSession<StdRng> {
    /// Start a session over `filter` with an OS-seeded random order.
    pub fn start(bank: Arc<QuestionBank>, filter: TagFilter) -> Self {
        Self::start_with_rng(bank, filter, StdRng::from_os_rng())
    }

    /// Start a session whose question order is reproducible from `seed`.
    pub fn seeded(bank: Arc<QuestionBank>, filter: TagFilter, seed: u64) -> Self {
        Self::start_with_rng(bank, filter, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuizSession<R> {
    /// Start a session drawing its shuffles from `rng`.
    pub fn start_with_rng(bank: Arc<QuestionBank>, filter: TagFilter, rng: R) -> Self {
        let queue = bank.indices_matching(&filter);
        let mut session = Self {
            bank,
            rng,
            active_filter: filter,
            queue: Vec::new(),
            position: 0,
            selected: None,
            score: ScoreCard::default(),
            missed: Vec::new(),
            reset_missed_on_restart: false,
        };
        session.begin_run(queue);
        tracing::debug!(
            filter = %session.active_filter,
            questions = session.queue.len(),
            "session started"
        );
        session
    }

    /// Also clear the missed-question history on plain restarts.
    ///
    /// Off by default: missed ids accumulate across plain restarts until a
    /// missed-only review consumes them.
    #[must_use]
    pub fn with_reset_missed_on_restart(mut self, reset: bool) -> Self {
        self.reset_missed_on_restart = reset;
        self
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn active_filter(&self) -> &TagFilter {
        &self.active_filter
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.queue.is_empty() {
            Phase::Idle
        } else if self.selected.is_some() {
            Phase::Revealed
        } else {
            Phase::Answering
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.queue
            .get(self.position)
            .map(|&index| self.bank.at(index))
    }

    /// The working set in presentation order.
    pub fn queue(&self) -> impl Iterator<Item = &Question> + '_ {
        self.queue.iter().map(|&index| self.bank.at(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn selected_choice(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.selected.is_some()
    }

    /// Whether the revealed answer was correct; `None` until revealed.
    #[must_use]
    pub fn is_selected_correct(&self) -> Option<bool> {
        let question = self.current_question()?;
        self.selected.map(|choice| question.is_correct(choice))
    }

    #[must_use]
    pub fn score(&self) -> ScoreCard {
        self.score
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.score.correct
    }

    #[must_use]
    pub fn attempted_count(&self) -> u32 {
        self.score.attempted
    }

    /// Ids answered incorrectly since the history was last cleared.
    #[must_use]
    pub fn missed_ids(&self) -> &[QuestionId] {
        &self.missed
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            position: self.position,
            total: self.queue.len(),
        }
    }

    /// Whether another question follows the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position + 1 < self.queue.len()
    }

    /// End of quiz: the last question has been answered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.queue.is_empty() && !self.has_next() && self.is_revealed()
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    /// Answer the current question with the choice at `choice`.
    ///
    /// Once a question is revealed further calls return
    /// `AnswerOutcome::AlreadyAnswered` and change nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` when the session is idle and
    /// `SessionError::ChoiceOutOfRange` when `choice` is not a valid index.
    pub fn select_answer(&mut self, choice: usize) -> Result<AnswerOutcome, SessionError> {
        let Some(question) = self.current_question() else {
            return Err(SessionError::NoQuestions {
                filter: self.active_filter.clone(),
            });
        };
        if self.selected.is_some() {
            return Ok(AnswerOutcome::AlreadyAnswered);
        }

        let id = question.id;
        let answer_index = question.answer_index;
        let choices = question.choices.len();
        if choice >= choices {
            return Err(SessionError::ChoiceOutOfRange {
                id,
                choice,
                choices,
            });
        }

        let correct = choice == answer_index;
        self.selected = Some(choice);
        self.score.record(correct);
        tracing::trace!(question = %id, choice, correct, "answer recorded");

        if correct {
            Ok(AnswerOutcome::Correct)
        } else {
            self.missed.push(id);
            Ok(AnswerOutcome::Incorrect { answer_index })
        }
    }

    /// Move to the next question.
    ///
    /// Returns `false` without changing anything unless the current question
    /// is revealed and is not the last one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` when the session is idle.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        if self.queue.is_empty() {
            return Err(SessionError::NoQuestions {
                filter: self.active_filter.clone(),
            });
        }
        if !self.is_revealed() || !self.has_next() {
            return Ok(false);
        }
        self.position += 1;
        self.selected = None;
        Ok(true)
    }

    /// Replace the working set with a fresh shuffle of `filter`.
    ///
    /// Counters reset; missed ids are kept unless the session was built with
    /// `with_reset_missed_on_restart(true)`.
    pub fn restart(&mut self, filter: TagFilter) {
        let queue = self.bank.indices_matching(&filter);
        self.active_filter = filter;
        if self.reset_missed_on_restart {
            self.missed.clear();
        }
        self.begin_run(queue);
        tracing::debug!(
            filter = %self.active_filter,
            questions = self.queue.len(),
            missed = self.missed.len(),
            "session restarted"
        );
    }

    /// Replace the working set with the questions missed so far.
    ///
    /// Falls back to the active filter when nothing was missed. The missed
    /// history is cleared either way; the active filter is unchanged.
    pub fn restart_with_missed_only(&mut self) {
        let missed: HashSet<QuestionId> = self.missed.iter().copied().collect();
        let mut queue = self.bank.indices_with_ids(&missed);
        if queue.is_empty() {
            tracing::debug!(
                filter = %self.active_filter,
                "no missed questions, reviewing active filter"
            );
            queue = self.bank.indices_matching(&self.active_filter);
        }
        self.missed.clear();
        self.begin_run(queue);
        tracing::debug!(
            questions = self.queue.len(),
            "missed-only review started"
        );
    }

    fn begin_run(&mut self, mut queue: Vec<usize>) {
        queue.shuffle(&mut self.rng);
        self.queue = queue;
        self.position = 0;
        self.selected = None;
        self.score = ScoreCard::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: u64, tags: &[&str]) -> Question {
        Question {
            id: QuestionId::new(id),
            stem: format!("Q{id}"),
            choices: vec!["zero".into(), "one".into(), "two".into()],
            answer_index: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rationale: format!("because {id}"),
        }
    }

    fn bank() -> Arc<QuestionBank> {
        Arc::new(
            QuestionBank::new("abc", vec![q(1, &["a"]), q(2, &["a", "b"]), q(3, &["b"])])
                .unwrap(),
        )
    }

    fn big_bank(n: u64) -> Arc<QuestionBank> {
        let questions = (1..=n)
            .map(|id| q(id, if id % 2 == 0 { &["even"] } else { &["odd"] }))
            .collect();
        Arc::new(QuestionBank::new("big", questions).unwrap())
    }

    fn sorted_ids<R: Rng>(session: &QuizSession<R>) -> Vec<u64> {
        let mut ids: Vec<u64> = session.queue().map(|q| q.id.value()).collect();
        ids.sort_unstable();
        ids
    }

    fn current_id<R: Rng>(session: &QuizSession<R>) -> u64 {
        session.current_question().unwrap().id.value()
    }

    #[test]
    fn start_filters_and_enters_answering() {
        let session = QuizSession::seeded(bank(), TagFilter::tag("a"), 1);
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(sorted_ids(&session), vec![1, 2]);
        assert!(session.queue().all(|q| q.has_tag("a")));
        assert_eq!(session.position(), 0);
        assert_eq!(session.score(), ScoreCard::default());
        assert!(session.missed_ids().is_empty());
    }

    #[test]
    fn start_with_unknown_tag_is_idle() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("nope"), 1);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.current_question().is_none());
        assert!(!session.is_finished());
        assert_eq!(session.progress().fraction(), 0.0);
        assert!(matches!(
            session.select_answer(0),
            Err(SessionError::NoQuestions { .. })
        ));
        assert!(matches!(
            session.advance(),
            Err(SessionError::NoQuestions { .. })
        ));
    }

    #[test]
    fn shuffle_preserves_filtered_multiset() {
        let bank = big_bank(40);
        for seed in 0..20 {
            let session = QuizSession::seeded(Arc::clone(&bank), TagFilter::tag("even"), seed);
            let expected: Vec<u64> = (1..=40).filter(|id| id % 2 == 0).collect();
            assert_eq!(sorted_ids(&session), expected);
        }
    }

    #[test]
    fn queue_draws_from_bank_queries() {
        let bank = bank();
        let mut session = QuizSession::seeded(Arc::clone(&bank), TagFilter::tag("b"), 6);
        let mut expected: Vec<u64> = bank
            .filter_by_tag(&TagFilter::tag("b"))
            .iter()
            .map(|q| q.id.value())
            .collect();
        expected.sort_unstable();
        assert_eq!(sorted_ids(&session), expected);

        loop {
            session.select_answer(1).unwrap();
            if !session.advance().unwrap() {
                break;
            }
        }
        let missed: HashSet<QuestionId> = session.missed_ids().iter().copied().collect();
        let mut expected: Vec<u64> = bank
            .questions_with_ids(&missed)
            .iter()
            .map(|q| q.id.value())
            .collect();
        expected.sort_unstable();
        session.restart_with_missed_only();
        assert_eq!(sorted_ids(&session), expected);
    }

    #[test]
    fn shuffle_reorders_questions() {
        let bank = big_bank(10);
        let in_bank_order = (0..20).all(|seed| {
            let session = QuizSession::seeded(Arc::clone(&bank), TagFilter::All, seed);
            session
                .queue()
                .map(|q| q.id.value())
                .eq(bank.questions().iter().map(|q| q.id.value()))
        });
        assert!(!in_bank_order);
    }

    #[test]
    fn shuffle_puts_every_question_first_sometimes() {
        let bank = bank();
        let mut firsts = std::collections::HashMap::new();
        for seed in 0..300 {
            let session = QuizSession::seeded(Arc::clone(&bank), TagFilter::All, seed);
            *firsts.entry(current_id(&session)).or_insert(0) += 1;
        }
        for id in 1..=3 {
            assert!(firsts.get(&id).copied().unwrap_or(0) > 50, "{firsts:?}");
        }
    }

    #[test]
    fn correct_answer_counts_and_reveals() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 3);
        let outcome = session.select_answer(0).unwrap();
        assert_eq!(outcome, AnswerOutcome::Correct);
        assert_eq!(session.phase(), Phase::Revealed);
        assert_eq!(session.selected_choice(), Some(0));
        assert_eq!(session.is_selected_correct(), Some(true));
        assert_eq!(session.attempted_count(), 1);
        assert_eq!(session.correct_count(), 1);
        assert!(session.missed_ids().is_empty());
    }

    #[test]
    fn wrong_answer_records_miss() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 3);
        let id = current_id(&session);
        let outcome = session.select_answer(2).unwrap();
        assert_eq!(outcome, AnswerOutcome::Incorrect { answer_index: 0 });
        assert_eq!(session.is_selected_correct(), Some(false));
        assert_eq!(session.attempted_count(), 1);
        assert_eq!(session.correct_count(), 0);
        assert_eq!(session.missed_ids(), &[QuestionId::new(id)]);
    }

    #[test]
    fn second_answer_is_ignored() {
        let mut once = QuizSession::seeded(bank(), TagFilter::All, 9);
        once.select_answer(1).unwrap();

        let mut twice = QuizSession::seeded(bank(), TagFilter::All, 9);
        twice.select_answer(1).unwrap();
        assert_eq!(
            twice.select_answer(0).unwrap(),
            AnswerOutcome::AlreadyAnswered
        );

        assert_eq!(twice.selected_choice(), once.selected_choice());
        assert_eq!(twice.score(), once.score());
        assert_eq!(twice.missed_ids(), once.missed_ids());
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 2);
        let id = session.current_question().unwrap().id;
        assert_eq!(
            session.select_answer(3),
            Err(SessionError::ChoiceOutOfRange {
                id,
                choice: 3,
                choices: 3
            })
        );
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.attempted_count(), 0);
    }

    #[test]
    fn revealed_question_ignores_out_of_range_choice() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 2);
        session.select_answer(0).unwrap();
        assert_eq!(
            session.select_answer(99).unwrap(),
            AnswerOutcome::AlreadyAnswered
        );
    }

    #[test]
    fn advance_requires_reveal() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 4);
        assert!(!session.advance().unwrap());
        assert_eq!(session.position(), 0);

        session.select_answer(0).unwrap();
        assert!(session.advance().unwrap());
        assert_eq!(session.position(), 1);
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.selected_choice(), None);
    }

    #[test]
    fn advance_at_last_question_is_noop() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("b"), 4);
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        session.select_answer(0).unwrap();
        assert!(session.is_finished());

        assert!(!session.advance().unwrap());
        assert_eq!(session.position(), 1);
        assert_eq!(session.phase(), Phase::Revealed);
        assert!(session.is_finished());
    }

    #[test]
    fn restart_resets_counters_but_keeps_missed() {
        let mut session = QuizSession::seeded(bank(), TagFilter::All, 5);
        session.select_answer(1).unwrap();
        let missed = session.missed_ids().to_vec();

        session.restart(TagFilter::tag("b"));
        assert_eq!(session.active_filter(), &TagFilter::tag("b"));
        assert_eq!(sorted_ids(&session), vec![2, 3]);
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.position(), 0);
        assert_eq!(session.score(), ScoreCard::default());
        assert_eq!(session.missed_ids(), missed.as_slice());
    }

    #[test]
    fn restart_can_clear_missed_when_configured() {
        let mut session =
            QuizSession::seeded(bank(), TagFilter::All, 5).with_reset_missed_on_restart(true);
        session.select_answer(1).unwrap();
        session.restart(TagFilter::All);
        assert!(session.missed_ids().is_empty());
    }

    #[test]
    fn missed_accumulate_across_plain_restarts() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("a"), 6);
        let first = current_id(&session);
        session.select_answer(1).unwrap();
        session.restart(TagFilter::tag("a"));
        while current_id(&session) != first {
            session.select_answer(0).unwrap();
            session.advance().unwrap();
        }
        session.select_answer(2).unwrap();

        let id = QuestionId::new(first);
        assert_eq!(session.missed_ids(), &[id, id]);

        session.restart_with_missed_only();
        assert_eq!(sorted_ids(&session), vec![first]);
        assert!(session.missed_ids().is_empty());
    }

    #[test]
    fn missed_only_review_uses_bank_questions_outside_filter() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("a"), 8);
        // miss everything under "a"
        loop {
            session.select_answer(1).unwrap();
            if !session.advance().unwrap() {
                break;
            }
        }
        session.restart(TagFilter::tag("b"));
        session.restart_with_missed_only();
        assert_eq!(sorted_ids(&session), vec![1, 2]);
        assert_eq!(session.active_filter(), &TagFilter::tag("b"));
    }

    #[test]
    fn missed_only_without_misses_falls_back_to_filter() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("b"), 10);
        session.select_answer(0).unwrap();
        session.restart_with_missed_only();
        assert_eq!(sorted_ids(&session), vec![2, 3]);
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.score(), ScoreCard::default());
    }

    #[test]
    fn missed_only_fallback_on_empty_filter_stays_idle() {
        let mut session = QuizSession::seeded(bank(), TagFilter::tag("none"), 10);
        session.restart_with_missed_only();
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn restart_twice_round_trips() {
        let mut session = QuizSession::seeded(big_bank(12), TagFilter::All, 11);
        session.select_answer(2).unwrap();
        session.advance().unwrap();
        session.select_answer(0).unwrap();

        session.restart(TagFilter::tag("odd"));
        session.restart(TagFilter::tag("odd"));
        assert_eq!(session.score(), ScoreCard::default());
        assert_eq!(sorted_ids(&session), vec![1, 3, 5, 7, 9, 11]);
    }

    #[test]
    fn progress_tracks_position() {
        let mut session = QuizSession::seeded(big_bank(4), TagFilter::All, 12);
        assert_eq!(session.progress().percent(), 0);
        session.select_answer(0).unwrap();
        session.advance().unwrap();
        let progress = session.progress();
        assert_eq!(progress.position, 1);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percent(), 25);
        assert_eq!(progress.question_number(), 2);
    }

    #[test]
    fn same_seed_same_order() {
        let bank = big_bank(25);
        let a = QuizSession::seeded(Arc::clone(&bank), TagFilter::All, 77);
        let b = QuizSession::seeded(Arc::clone(&bank), TagFilter::All, 77);
        assert!(a.queue().map(|q| q.id).eq(b.queue().map(|q| q.id)));
    }
}
