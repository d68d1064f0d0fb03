//! Configuration loading and management.

use divvy_netting::NettingConfig;
use divvy_split::{MatcherConfig, SplitPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full configuration for the `divvy` tool.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DivvyConfig {
    /// Split calculator tolerances.
    #[serde(default)]
    pub split: SplitPolicy,

    /// Settlement matcher settings.
    #[serde(default)]
    pub matching: MatcherConfig,

    /// Debt netting settings.
    #[serde(default)]
    pub netting: NettingConfig,

    /// Ledger file settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the JSON ledger file.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./divvy-ledger.json")
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DivvyConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: DivvyConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}
