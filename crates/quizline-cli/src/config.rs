//! quizline configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizline_core::{QuestionBank, TagFilter};

/// Top-level quizline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizlineConfig {
    /// Bank file or directory. `${VAR}` references are expanded.
    #[serde(default = "default_bank")]
    pub bank: PathBuf,
    /// Filter used when a quiz starts.
    #[serde(default = "default_filter")]
    pub default_filter: String,
    /// Filters offered to the learner. Empty means "all" plus every bank tag.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Fixed shuffle seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Clear the missed-question history on a plain restart.
    #[serde(default)]
    pub reset_missed_on_restart: bool,
    /// Heading shown instead of the bank name.
    #[serde(default)]
    pub title: Option<String>,
}

fn default_bank() -> PathBuf {
    PathBuf::from("banks")
}
fn default_filter() -> String {
    TagFilter::ALL.to_string()
}

impl Default for QuizlineConfig {
    fn default() -> Self {
        Self {
            bank: default_bank(),
            default_filter: default_filter(),
            filters: Vec::new(),
            seed: None,
            reset_missed_on_restart: false,
            title: None,
        }
    }
}

impl QuizlineConfig {
    /// The filters a learner may pick from for `bank`.
    pub fn offered_filters(&self, bank: &QuestionBank) -> Result<Vec<TagFilter>> {
        if self.filters.is_empty() {
            let mut filters = vec![TagFilter::All];
            filters.extend(bank.tags().into_iter().map(TagFilter::tag));
            return Ok(filters);
        }
        self.filters
            .iter()
            .map(|f| f.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
            .collect()
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
        cursor = start + value.len();
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizline.toml` in the current directory
/// 2. `~/.config/quizline/config.toml`
///
/// Environment variable overrides: `QUIZLINE_BANK`, `QUIZLINE_FILTER`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizlineConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizline.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizlineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("using config {}", path.display());
            config
        }
        None => QuizlineConfig::default(),
    };

    if let Ok(bank) = std::env::var("QUIZLINE_BANK") {
        config.bank = PathBuf::from(bank);
    }
    if let Ok(filter) = std::env::var("QUIZLINE_FILTER") {
        config.default_filter = filter;
    }

    config.bank = PathBuf::from(resolve_env_vars(&config.bank.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizline"))
}
