//! The `quizline validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizline_core::parser::{load_bank, validate_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = load_bank(&bank_path)?;

    println!("Bank: {} ({} questions)", bank.name(), bank.len());

    let warnings = validate_bank(&bank);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
