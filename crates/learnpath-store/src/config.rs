//! learnpath configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use learnpath_core::evaluator::EvaluatorConfig;
use learnpath_core::reporter::ReporterConfig;
use learnpath_core::statistics::RoundingPolicy;

/// Top-level learnpath configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnpathConfig {
    /// Rounding for percentages and scores.
    #[serde(default)]
    pub rounding: RoundingPolicy,
    /// Max concurrent module fetches when reporting a classroom.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Directory of module TOML files.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: PathBuf,
    /// JSON file of per-student completion records.
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_modules_dir() -> PathBuf {
    PathBuf::from("./modules")
}
fn default_records_path() -> PathBuf {
    PathBuf::from("./records.json")
}

impl Default for LearnpathConfig {
    fn default() -> Self {
        Self {
            rounding: RoundingPolicy::default(),
            parallelism: default_parallelism(),
            modules_dir: default_modules_dir(),
            records_path: default_records_path(),
        }
    }
}

impl LearnpathConfig {
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            rounding: self.rounding,
        }
    }

    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig {
            parallelism: self.parallelism.max(1),
            rounding: self.rounding,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `learnpath.toml` in the current directory
/// 2. `~/.config/learnpath/config.toml`
///
/// Environment variable overrides: `LEARNPATH_MODULES_DIR`,
/// `LEARNPATH_RECORDS`, `LEARNPATH_ROUNDING`.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnpathConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("learnpath.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<LearnpathConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LearnpathConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("LEARNPATH_MODULES_DIR") {
        config.modules_dir = PathBuf::from(dir);
    }
    if let Ok(records) = std::env::var("LEARNPATH_RECORDS") {
        config.records_path = PathBuf::from(records);
    }
    if let Ok(rounding) = std::env::var("LEARNPATH_ROUNDING") {
        config.rounding = rounding
            .parse()
            .map_err(|e: String| anyhow::anyhow!("LEARNPATH_ROUNDING: {e}"))?;
    }

    config.modules_dir = resolve_path(&config.modules_dir);
    config.records_path = resolve_path(&config.records_path);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnpath"))
}
