//! Configuration management for qbatch
//!
//! TOML-backed settings for data file locations and batch construction,
//! with validation and environment variable overrides.

use crate::error::{QbatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub batch: BatchConfig,
}

/// Input file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Question corpus, `id \t title \t body` (optionally gzipped)
    pub corpus_file: PathBuf,
    /// Pretrained embeddings, `word v1 ... vN` (optionally gzipped)
    pub embeddings_file: PathBuf,
    /// Training annotations, `query \t positives \t pool`
    pub train_file: PathBuf,
    /// Evaluation annotations, same format as `train_file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_file: Option<PathBuf>,
}

/// Batch construction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records per training batch
    pub batch_size: usize,
    /// Cap on sampled negative candidates per record
    pub k_neg: usize,
    /// Maximum body length after encoding
    pub max_body_len: usize,
    /// Seed for every shuffle and the padding-row noise
    pub seed: u64,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QbatchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| QbatchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| QbatchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: QBATCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("QBATCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "BATCH__BATCH_SIZE" => {
                self.batch.batch_size = parse_env(path, value)?;
            }
            "BATCH__K_NEG" => {
                self.batch.k_neg = parse_env(path, value)?;
            }
            "BATCH__MAX_BODY_LEN" => {
                self.batch.max_body_len = parse_env(path, value)?;
            }
            "BATCH__SEED" => {
                self.batch.seed = parse_env(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| QbatchError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("qbatch").join("config.toml"))
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| QbatchError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                corpus_file: PathBuf::from("data/corpus.tsv.gz"),
                embeddings_file: PathBuf::from("data/vectors.txt.gz"),
                train_file: PathBuf::from("data/train_random.txt"),
                eval_file: None,
            },
            batch: BatchConfig {
                batch_size: 40,
                k_neg: 20,
                max_body_len: 100,
                seed: 7,
            },
        }
    }
}
