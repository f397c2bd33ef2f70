//! Layered settings: a TOML file provides the base, individual fields
//! are overridable by `TESSERAE_`-prefixed environment variables. There
//! is no dynamic config object; everything the engine needs to start up
//! is named here up front.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::TesseraeError;

fn default_bigram_store_dir() -> PathBuf {
    PathBuf::from("./data/bigrams")
}

fn default_ingest_workers() -> usize {
    1
}

fn default_search_workers() -> usize {
    4
}

fn default_gc_interval_secs() -> u64 {
    3600
}

/// Settings for one running engine instance. `Default` yields the same
/// values a freshly-written TOML file with no overrides would produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraeConfig {
    /// Base directory under which the bigram store keeps its per-text
    /// per-unit-type per-kind shards (§4.7).
    #[serde(default = "default_bigram_store_dir")]
    pub bigram_store_dir: PathBuf,
    /// Number of workers draining the ingest queue (§5).
    #[serde(default = "default_ingest_workers")]
    pub ingest_workers: usize,
    /// Number of workers draining the search queue (§5).
    #[serde(default = "default_search_workers")]
    pub search_workers: usize,
    /// Interval, in seconds, between sweeps of searches past the 28-day
    /// TTL (§4.9).
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
}

impl Default for TesseraeConfig {
    fn default() -> Self {
        Self {
            bigram_store_dir: default_bigram_store_dir(),
            ingest_workers: default_ingest_workers(),
            search_workers: default_search_workers(),
            gc_interval_secs: default_gc_interval_secs(),
        }
    }
}

impl TesseraeConfig {
    /// Loads settings from a TOML file, then applies any `TESSERAE_*`
    /// environment overrides on top.
    pub fn load(path: &std::path::Path) -> Result<Self, TesseraeError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw).map_err(|e| TesseraeError::Config(e.to_string()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Settings from environment overrides alone, starting from
    /// defaults — used when no config file is present.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("TESSERAE_BIGRAM_STORE_DIR") {
            self.bigram_store_dir = PathBuf::from(dir);
        }
        if let Ok(n) = std::env::var("TESSERAE_INGEST_WORKERS").and_then(|v| v.parse().map_err(|_| std::env::VarError::NotPresent)) {
            self.ingest_workers = n;
        }
        if let Ok(n) = std::env::var("TESSERAE_SEARCH_WORKERS").and_then(|v| v.parse().map_err(|_| std::env::VarError::NotPresent)) {
            self.search_workers = n;
        }
        if let Ok(n) = std::env::var("TESSERAE_GC_INTERVAL_SECS").and_then(|v| v.parse().map_err(|_| std::env::VarError::NotPresent)) {
            self.gc_interval_secs = n;
        }
    }
}
