//! The `quizline tags` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizline_core::parser::load_bank;
use quizline_core::TagFilter;

use crate::config::load_config_from;

pub fn execute(bank_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let bank_path = match bank_path {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.bank,
    };
    let bank = load_bank(&bank_path)?;

    let mut table = Table::new();
    table.set_header(vec!["Tag", "Questions"]);
    table.add_row(vec![Cell::new(TagFilter::ALL), Cell::new(bank.len())]);
    for (tag, count) in bank.tag_counts() {
        table.add_row(vec![Cell::new(tag), Cell::new(count)]);
    }

    println!("Bank: {}", bank.name());
    println!("{table}");

    Ok(())
}
