//! Run configuration: algorithm defaults, optional JSON config file, overrides.

use crate::core::{HashAlgorithm, HashSettings};
use crate::error::ConfigError;
use crate::services::scanner::MediaMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FRAMES_TO_SAMPLE: usize = 20;
pub const DEFAULT_CHUNK_COEF: usize = 4;
pub const MAX_DEFAULT_WORKERS: usize = 10;

pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKERS)
}

/// Settings as they come from a config file or the command line; unset
/// fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub hash_type: Option<HashAlgorithm>,
    pub mode: Option<MediaMode>,
    pub hash_size: Option<u32>,
    pub threshold: Option<u32>,
    pub frames_to_sample: Option<usize>,
    pub workers: Option<usize>,
    pub chunk_coef: Option<usize>,
}

impl PartialConfig {
    /// `<config dir>/mediagroup/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mediagroup").join("config.json"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the default config file if there is one.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Keep the values set here, take the rest from `fallback`.
    pub fn or(self, fallback: Self) -> Self {
        Self {
            hash_type: self.hash_type.or(fallback.hash_type),
            mode: self.mode.or(fallback.mode),
            hash_size: self.hash_size.or(fallback.hash_size),
            threshold: self.threshold.or(fallback.threshold),
            frames_to_sample: self.frames_to_sample.or(fallback.frames_to_sample),
            workers: self.workers.or(fallback.workers),
            chunk_coef: self.chunk_coef.or(fallback.chunk_coef),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub input: PathBuf,
    pub mode: MediaMode,
    pub hash: HashSettings,
    pub threshold: u32,
    pub frames_to_sample: usize,
    pub workers: usize,
    pub chunk_coef: usize,
}

fn positive(value: usize, field: &'static str) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive { field });
    }
    Ok(value)
}

impl RunConfig {
    pub fn resolve(input: impl Into<PathBuf>, partial: PartialConfig) -> Result<Self, ConfigError> {
        let algorithm = partial.hash_type.ok_or(ConfigError::MissingAlgorithm)?;
        let hash = HashSettings::new(algorithm, partial.hash_size)?;

        Ok(Self {
            input: input.into(),
            mode: partial.mode.unwrap_or_default(),
            hash,
            threshold: partial
                .threshold
                .unwrap_or_else(|| algorithm.default_threshold()),
            frames_to_sample: positive(
                partial.frames_to_sample.unwrap_or(DEFAULT_FRAMES_TO_SAMPLE),
                "frames_to_sample",
            )?,
            workers: positive(partial.workers.unwrap_or_else(default_workers), "workers")?,
            chunk_coef: positive(partial.chunk_coef.unwrap_or(DEFAULT_CHUNK_COEF), "chunk_coef")?,
        })
    }

    /// Files handed to a worker at a time.
    pub fn chunk_size(&self, file_count: usize) -> usize {
        (file_count / (self.workers * self.chunk_coef)).max(1)
    }
}
