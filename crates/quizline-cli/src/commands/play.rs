//! The `quizline play` command.
//!
//! A line-oriented terminal presentation of a `QuizSession`: each input line
//! maps to one session transition, after which the view is re-rendered from
//! the session's read-only queries.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use rand::Rng;

use quizline_core::parser::load_bank;
use quizline_core::{AnswerOutcome, Phase, QuizSession, TagFilter};

use crate::config::load_config_from;

pub fn execute(
    bank_path: Option<PathBuf>,
    filter: Option<String>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let bank_path = bank_path.unwrap_or_else(|| config.bank.clone());
    let bank = Arc::new(load_bank(&bank_path)?);

    let filters = config.offered_filters(&bank)?;
    let initial: TagFilter = filter
        .as_deref()
        .unwrap_or(&config.default_filter)
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;
    if !filters.contains(&initial) {
        anyhow::bail!(
            "filter '{}' is not offered. Available: {}",
            initial,
            join_filters(&filters)
        );
    }

    let title = config
        .title
        .clone()
        .unwrap_or_else(|| bank.name().to_string());
    let session = match seed.or(config.seed) {
        Some(seed) => QuizSession::seeded(Arc::clone(&bank), initial, seed),
        None => QuizSession::start(Arc::clone(&bank), initial),
    };
    let mut session = session.with_reset_missed_on_restart(config.reset_missed_on_restart);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), title, filters);
    console.run(&mut session)
}

/// One line of learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Choose(usize),
    Next,
    Restart(Option<String>),
    Missed,
    Filters,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Next;
    }

    if let Some(rest) = line.strip_prefix(':') {
        let mut words = rest.split_whitespace();
        return match words.next().unwrap_or_default() {
            "next" | "n" => Command::Next,
            "restart" | "r" => Command::Restart(words.next().map(str::to_string)),
            "missed" | "m" => Command::Missed,
            "filters" | "f" => Command::Filters,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };
    }

    let mut chars = line.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() {
            let index = letter.to_ascii_uppercase() as usize - 'A' as usize;
            return Command::Choose(index);
        }
    }

    match line.parse::<usize>() {
        Ok(number) if number > 0 => Command::Choose(number - 1),
        _ => Command::Unknown(line.to_string()),
    }
}

fn choice_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| char::from(b'A' + i))
}

fn join_filters(filters: &[TagFilter]) -> String {
    filters
        .iter()
        .map(TagFilter::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

const HELP: &str = "\
Commands:
  A, B, ... or 1, 2, ...  answer the current question
  Enter or :next          go to the next question
  :restart [tag]          restart with a fresh shuffle (optionally another filter)
  :missed                 review the questions you missed
  :filters                list the available filters
  :help                   show this help
  :quit                   leave the quiz";

/// Terminal presentation bound to an input and an output stream.
pub struct Console<R, W> {
    input: R,
    out: W,
    title: String,
    filters: Vec<TagFilter>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, title: String, filters: Vec<TagFilter>) -> Self {
        Self {
            input,
            out,
            title,
            filters,
        }
    }

    /// Drive `session` until the learner quits or input ends.
    pub fn run<G: Rng>(&mut self, session: &mut QuizSession<G>) -> Result<()> {
        self.render(session)?;

        let mut line = String::new();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }

            match parse_command(&line) {
                Command::Quit => break,
                Command::Choose(choice) => match session.select_answer(choice) {
                    Ok(AnswerOutcome::AlreadyAnswered) => {
                        writeln!(self.out, "Already answered. Press Enter to continue.")?;
                    }
                    Ok(_) => self.render(session)?,
                    Err(e) => writeln!(self.out, "{e}")?,
                },
                Command::Next => match session.advance() {
                    Ok(true) => self.render(session)?,
                    Ok(false) if session.is_finished() => {
                        writeln!(
                            self.out,
                            "End of quiz. Type :missed to review missed questions or :restart to start over."
                        )?;
                    }
                    Ok(false) => writeln!(self.out, "Click an answer to check it.")?,
                    Err(_) => self.render(session)?,
                },
                Command::Restart(tag) => {
                    let filter = match tag {
                        Some(tag) => match self.offered(&tag) {
                            Some(filter) => filter,
                            None => {
                                writeln!(
                                    self.out,
                                    "Unknown filter '{tag}'. Available: {}",
                                    join_filters(&self.filters)
                                )?;
                                continue;
                            }
                        },
                        None => session.active_filter().clone(),
                    };
                    session.restart(filter);
                    self.render(session)?;
                }
                Command::Missed => {
                    session.restart_with_missed_only();
                    self.render(session)?;
                }
                Command::Filters => {
                    writeln!(self.out, "Filters: {}", join_filters(&self.filters))?;
                }
                Command::Help => writeln!(self.out, "{HELP}")?,
                Command::Unknown(input) => {
                    writeln!(self.out, "Unrecognized input '{input}'. Type :help for commands.")?;
                }
            }
        }

        let score = session.score();
        writeln!(self.out, "Final score: {}", score.ratio())?;
        self.out.flush()?;
        Ok(())
    }

    fn offered(&self, tag: &str) -> Option<TagFilter> {
        let filter: TagFilter = tag.parse().ok()?;
        self.filters.contains(&filter).then_some(filter)
    }

    fn render<G: Rng>(&mut self, session: &QuizSession<G>) -> io::Result<()> {
        let progress = session.progress();
        writeln!(self.out)?;
        writeln!(self.out, "== {} ==", self.title)?;

        let Some(question) = session.current_question() else {
            writeln!(self.out, "Filter: {}", session.active_filter())?;
            writeln!(
                self.out,
                "No questions in this bank yet. Use :restart all to reload all questions."
            )?;
            return Ok(());
        };

        writeln!(
            self.out,
            "Filter: {} | Question {} of {} ({}%)",
            session.active_filter(),
            progress.question_number(),
            progress.total,
            progress.percent()
        )?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", question.stem)?;
        if !question.tags.is_empty() {
            writeln!(self.out, "[{}]", question.tags.join(" • "))?;
        }

        let selected = session.selected_choice();
        for (index, choice) in question.choices.iter().enumerate() {
            let mark = match selected {
                Some(_) if question.is_correct(index) => '✔',
                Some(chosen) if chosen == index => '✘',
                _ => ' ',
            };
            writeln!(self.out, "{mark} {}. {choice}", choice_label(index))?;
        }

        if session.phase() != Phase::Revealed {
            return Ok(());
        }

        writeln!(self.out)?;
        if session.is_selected_correct() == Some(true) {
            writeln!(self.out, "Correct")?;
        } else {
            writeln!(self.out, "Incorrect")?;
        }
        if !question.rationale.is_empty() {
            writeln!(self.out, "Explanation: {}", question.rationale)?;
        }
        let score = session.score();
        writeln!(
            self.out,
            "Correct: {}  Attempted: {}  Ratio: {}",
            score.correct,
            score.attempted,
            score.ratio()
        )?;

        if session.has_next() {
            writeln!(self.out, "Press Enter for the next question.")?;
        } else {
            writeln!(self.out, "End of quiz.")?;
            writeln!(
                self.out,
                "Type :missed to review missed questions or :restart to restart all."
            )?;
        }
        Ok(())
    }
}
