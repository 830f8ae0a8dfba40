//! Runner configuration for tmsim-cli.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables (`TMSIM_MAX_STEPS`, `TMSIM_SPAN`, `TMSIM_STRICT`)
//! 3. Project-local config file (`./tmsim.toml`)
//! 4. Built-in defaults
//!
//! # Config File Format
//!
//! ```toml
//! # tmsim.toml
//! max_steps = 5000
//! span = 10
//! strict = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tmsim::types::{DEFAULT_MAX_STEPS, DEFAULT_WINDOW_SPAN};

/// Name of the project-local config file.
pub const CONFIG_FILE: &str = "tmsim.toml";

/// Settings that bound and shape execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Step budget for `run`.
    pub max_steps: usize,
    /// Cells shown on each side of the head.
    pub span: usize,
    /// Treat analyzer findings as validation failures.
    pub strict: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            span: DEFAULT_WINDOW_SPAN,
            strict: false,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from the local file and the environment.
    pub fn load() -> Self {
        let mut config = Self::load_from_file(Path::new(CONFIG_FILE)).unwrap_or_default();
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Apply environment variable overrides read through `var`.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("TMSIM_MAX_STEPS") {
            match value.parse() {
                Ok(max_steps) => self.max_steps = max_steps,
                Err(e) => log::warn!("Ignoring TMSIM_MAX_STEPS={value}: {e}"),
            }
        }
        if let Some(value) = var("TMSIM_SPAN") {
            match value.parse() {
                Ok(span) => self.span = span,
                Err(e) => log::warn!("Ignoring TMSIM_SPAN={value}: {e}"),
            }
        }
        if let Some(value) = var("TMSIM_STRICT") {
            self.strict = matches!(value.as_str(), "1" | "true" | "yes");
        }
    }
}
