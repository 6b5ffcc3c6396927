// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::render::DisplayLocale;

pub const DEFAULT_ENDPOINT: &str = "https://zk23ibi8il.execute-api.us-east-1.amazonaws.com/DEV/";

pub const ENV_CONFIG: &str = "TICKERBOARD_CONFIG";
pub const ENV_ENDPOINT: &str = "TICKERBOARD_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "TICKERBOARD_TIMEOUT_SECS";
pub const ENV_OUT_DIR: &str = "TICKERBOARD_OUT_DIR";

/// What happens when a symbol is submitted while another is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// The new submission is dropped without issuing a request.
    #[default]
    RejectWhilePending,
    /// The new submission runs; results of older ones are discarded.
    SupersedePrevious,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL; the symbol is appended as the `ticker` query parameter.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub out_dir: PathBuf,
    pub overlap: OverlapPolicy,
    pub locale: DisplayLocale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            out_dir: PathBuf::from("dashboard"),
            overlap: OverlapPolicy::default(),
            locale: DisplayLocale::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("in config {:?}", path))
    }

    /// Defaults, then the YAML file if one is given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `TICKERBOARD_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be whole seconds, got {:?}", ENV_TIMEOUT_SECS, secs))?;
        }
        if let Some(dir) = lookup(ENV_OUT_DIR) {
            self.out_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
