use crate::core::MAX_DIFFICULTY;
use crate::error::{LedgerError, Result};
use log::{warn, LevelFilter};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults overlaid with the environment, read once per process
pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().unwrap_or_else(|e| {
        warn!("Ignoring environment configuration: {e}");
        Config::default()
    })
});

pub const DEFAULT_DIFFICULTY: u32 = 3;
static DEFAULT_DATA_DIR: &str = "data";
static DEFAULT_LOG_LEVEL: &str = "info";

const DIFFICULTY_KEY: &str = "LEDGER_DIFFICULTY";
const DATA_DIR_KEY: &str = "LEDGER_DATA_DIR";
const LOG_LEVEL_KEY: &str = "LEDGER_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub difficulty: u32,
    pub data_dir: PathBuf,
    pub log_level: String,
}

/// Shape of the optional TOML file; every field may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    difficulty: Option<u32>,
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: DEFAULT_DIFFICULTY,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: String::from(DEFAULT_LOG_LEVEL),
        }
    }
}

impl Config {
    /// Defaults, then the environment
    pub fn from_env() -> Result<Config> {
        let mut config = Config::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults, then the TOML file at `path`, then the environment
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut config = Config::from_toml_str(&text)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Config> {
        let file: FileConfig = toml::from_str(text)?;
        let mut config = Config::default();
        if let Some(difficulty) = file.difficulty {
            config.set_difficulty(difficulty)?;
        }
        if let Some(data_dir) = file.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(log_level) = file.log_level {
            config.set_log_level(&log_level)?;
        }
        Ok(config)
    }

    /// Apply `LEDGER_*` values returned by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(DIFFICULTY_KEY) {
            let difficulty = raw.trim().parse::<u32>().map_err(|e| {
                LedgerError::Config(format!("{DIFFICULTY_KEY}={raw} is not a number: {e}"))
            })?;
            self.set_difficulty(difficulty)?;
        }
        if let Some(dir) = lookup(DATA_DIR_KEY) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(LOG_LEVEL_KEY) {
            self.set_log_level(&level)?;
        }
        Ok(())
    }

    pub fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::Config(format!(
                "Difficulty {difficulty} exceeds maximum of {MAX_DIFFICULTY}"
            )));
        }
        self.difficulty = difficulty;
        Ok(())
    }

    pub fn set_log_level(&mut self, level: &str) -> Result<()> {
        level
            .parse::<LevelFilter>()
            .map_err(|_| LedgerError::Config(format!("Unknown log level: {level}")))?;
        self.log_level = level.to_string();
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn chain_path(&self) -> PathBuf {
        self.data_dir.join("chain")
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state")
    }
}
