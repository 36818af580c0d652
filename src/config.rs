//! Tool configuration.
//!
//! Handles loading and validating `icolib.toml`. The file is optional and
//! every key in it is too; command-line flags override the result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! templates_dir = "templates"   # Where <name>.xml templates are stored
//! output_dir = "output"         # Export root
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked for in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "icolib.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `icolib.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IcolibConfig {
    /// Directory holding template files.
    pub templates_dir: String,
    /// Root directory exports are written under.
    pub output_dir: String,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for IcolibConfig {
    fn default() -> Self {
        Self {
            templates_dir: "templates".to_string(),
            output_dir: "output".to_string(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl IcolibConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.templates_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "templates_dir must not be empty".into(),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn templates_path(&self) -> PathBuf {
        PathBuf::from(&self.templates_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel export workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Parse and validate config text. Keys left out keep their defaults.
pub fn parse_config(content: &str) -> Result<IcolibConfig, ConfigError> {
    let config: IcolibConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to defaults if it is absent.
pub fn load_config(path: &Path) -> Result<IcolibConfig, ConfigError> {
    if !path.exists() {
        return Ok(IcolibConfig::default());
    }
    let config = parse_config(&fs::read_to_string(path)?)?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// A fully-commented stock `icolib.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# icolib Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# This file is read from the working directory (or from --config <path>).
# Command-line flags --templates-dir and --output override it.
# Unknown keys will cause an error.

# Directory holding export templates, one <name>.xml per template.
# `icolib gen-templates` writes the built-in iOS and Android templates here.
templates_dir = "templates"

# Root directory for exports. Each template writes into its own
# outputDirectory beneath this.
output_dir = "output"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel export workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
