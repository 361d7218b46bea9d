//! Question bank file parser.
//!
//! Loads banks from TOML or JSON files (or a directory of them), builds a
//! validated `QuestionBank`, and reports soft issues that do not block a quiz.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::QuestionBank;
use crate::model::{Question, QuestionId};

/// On-disk encoding of a bank file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Toml,
    Json,
}

impl BankFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(BankFormat::Toml),
            Some("json") => Ok(BankFormat::Json),
            _ => anyhow::bail!(
                "unsupported bank file (expected .toml or .json): {}",
                path.display()
            ),
        }
    }
}

/// TOML layout: an optional `[bank]` header and `[[questions]]` tables.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    bank: Option<BankHeader>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct BankHeader {
    #[serde(default)]
    name: Option<String>,
}

/// JSON layout: a bare array of questions or a named object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonBankFile {
    Questions(Vec<Question>),
    Named {
        #[serde(default)]
        name: Option<String>,
        questions: Vec<Question>,
    },
}

/// Questions read from one file, before bank validation.
struct ParsedFile {
    name: Option<String>,
    questions: Vec<Question>,
}

fn parse_file_str(content: &str, format: BankFormat, source_path: &Path) -> Result<ParsedFile> {
    match format {
        BankFormat::Toml => {
            let parsed: TomlBankFile = toml::from_str(content)
                .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
            Ok(ParsedFile {
                name: parsed.bank.and_then(|b| b.name),
                questions: parsed.questions,
            })
        }
        BankFormat::Json => {
            let parsed: JsonBankFile = serde_json::from_str(content)
                .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;
            Ok(match parsed {
                JsonBankFile::Questions(questions) => ParsedFile {
                    name: None,
                    questions,
                },
                JsonBankFile::Named { name, questions } => ParsedFile { name, questions },
            })
        }
    }
}

fn read_file(path: &Path) -> Result<ParsedFile> {
    let format = BankFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    parse_file_str(&content, format, path)
}

fn default_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "questions".to_string())
}

/// Parse a bank from a string (useful for testing).
///
/// The bank is named after the header `name`, falling back to the file stem
/// of `source_path`.
pub fn parse_bank_str(content: &str, format: BankFormat, source_path: &Path) -> Result<QuestionBank> {
    let parsed = parse_file_str(content, format, source_path)?;
    let name = parsed.name.unwrap_or_else(|| default_name(source_path));
    QuestionBank::new(name, parsed.questions)
        .with_context(|| format!("invalid question bank: {}", source_path.display()))
}

/// Parse a single `.toml` or `.json` bank file.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let format = BankFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    parse_bank_str(&content, format, path)
}

/// Load a bank from a file, or merge every bank file in a directory.
///
/// Directory entries are read in file-name order so the load order is
/// stable. Entries without a `.toml` or `.json` extension are ignored; any
/// bank file that cannot be read or parsed fails the whole load, as do
/// invalid questions and ids repeated across files.
pub fn load_bank(path: &Path) -> Result<QuestionBank> {
    let bank = if path.is_dir() {
        load_bank_directory(path)?
    } else {
        parse_bank(path)?
    };
    tracing::info!(
        bank = bank.name(),
        questions = bank.len(),
        "loaded question bank from {}",
        path.display()
    );
    Ok(bank)
}

fn load_bank_directory(dir: &Path) -> Result<QuestionBank> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && BankFormat::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("no question bank files found in {}", dir.display());
    }

    let mut questions = Vec::new();
    for path in &files {
        let parsed = read_file(path)?;
        tracing::debug!(
            questions = parsed.questions.len(),
            "read bank file {}",
            path.display()
        );
        questions.extend(parsed.questions);
    }

    QuestionBank::new(default_name(dir), questions)
        .with_context(|| format!("invalid question bank: {}", dir.display()))
}

/// A soft issue found by `validate_bank`.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: QuestionId, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id),
            message: message.into(),
        }
    }
}

/// Check a bank for issues that still allow a quiz to run.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "bank contains no questions".into(),
        });
    }

    for q in bank.questions() {
        if q.stem.trim().is_empty() {
            warnings.push(ValidationWarning::question(q.id, "stem is empty"));
        }

        let mut seen = HashSet::new();
        for (index, choice) in q.choices.iter().enumerate() {
            let text = choice.trim();
            if text.is_empty() {
                warnings.push(ValidationWarning::question(
                    q.id,
                    format!("choice {} is blank", index + 1),
                ));
            } else if !seen.insert(text) {
                warnings.push(ValidationWarning::question(
                    q.id,
                    format!("duplicate choice text: {text}"),
                ));
            }
        }

        if q.rationale.trim().is_empty() {
            warnings.push(ValidationWarning::question(q.id, "rationale is empty"));
        }

        // Untagged questions only appear under the "all" filter
        if q.tags.is_empty() {
            warnings.push(ValidationWarning::question(q.id, "question has no tags"));
        }
    }

    warnings
}
