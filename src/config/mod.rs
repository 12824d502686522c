use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub classifier: ClassifierConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Lower bound (inclusive) of the randomized metric tick delay.
    pub price_tick_min_ms: u64,
    /// Upper bound (exclusive) of the randomized metric tick delay.
    pub price_tick_max_ms: u64,
    pub age_tick_ms: u64,
    /// JSON file with seed token records. The built-in board is used when unset.
    pub seed_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            price_tick_min_ms: 1000,
            price_tick_max_ms: 3000,
            age_tick_ms: 1000,
            seed_path: None,
            rng_seed: None,
        }
    }
}

impl FeedConfig {
    pub fn age_tick(&self) -> Duration {
        Duration::from_millis(self.age_tick_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub clear_after_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { clear_after_ms: 2500 }
    }
}

impl ClassifierConfig {
    pub fn clear_after(&self) -> Duration {
        Duration::from_millis(self.clear_after_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let feed = &self.feed;
        if feed.price_tick_min_ms == 0 {
            return Err(Error::ConfigError("price_tick_min_ms must be positive".to_string()));
        }
        if feed.price_tick_min_ms >= feed.price_tick_max_ms {
            return Err(Error::ConfigError(format!(
                "price tick range is empty: [{}ms, {}ms)",
                feed.price_tick_min_ms, feed.price_tick_max_ms
            )));
        }
        if feed.age_tick_ms == 0 {
            return Err(Error::ConfigError("age_tick_ms must be positive".to_string()));
        }
        if self.classifier.clear_after_ms == 0 {
            return Err(Error::ConfigError("clear_after_ms must be positive".to_string()));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(Error::ConfigError(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
