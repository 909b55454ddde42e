//! Configuration management
//!
//! This module handles loading and saving the TOML configuration.

use crate::data::SplitRule;
use crate::models::RankDeficiency;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Column to predict; every other column is a feature
    pub target_field: String,
    /// Partition boundary, taken at midnight
    pub split_date: NaiveDate,
    /// Treatment of rows stamped exactly at the boundary
    pub split_rule: SplitRule,
    /// Fail on collinear training features, or take the minimum-norm fit
    pub rank_deficiency: RankDeficiency,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            target_field: "cnt".to_string(),
            split_date: NaiveDate::from_ymd_opt(2012, 7, 1).unwrap_or_default(),
            split_rule: SplitRule::Inclusive,
            rank_deficiency: RankDeficiency::Error,
        }
    }
}

impl EvaluationConfig {
    pub fn with_target_field(mut self, target_field: impl Into<String>) -> Self {
        self.target_field = target_field.into();
        self
    }

    pub fn with_split_date(mut self, split_date: NaiveDate) -> Self {
        self.split_date = split_date;
        self
    }

    pub fn with_split_rule(mut self, split_rule: SplitRule) -> Self {
        self.split_rule = split_rule;
        self
    }

    pub fn with_rank_deficiency(mut self, rank_deficiency: RankDeficiency) -> Self {
        self.rank_deficiency = rank_deficiency;
        self
    }

    /// The split threshold as a timestamp (00:00:00 on `split_date`)
    pub fn threshold(&self) -> NaiveDateTime {
        self.split_date.and_time(chrono::NaiveTime::MIN)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        Config::default().save(path)
    }
}
