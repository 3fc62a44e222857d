//! Driver configuration and logger setup.

use anyhow::{bail, Context, Result};
use numlab_core::RootSettings;
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`.
    pub log_level: String,
    pub roots: RootSettings,
    /// RK4 steps used to cross-check each ODE basis term.
    pub verify_steps: usize,
    pub verify_x_end: f64,
    /// Seed for the random distributions of the information demo.
    pub seed: u64,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            roots: RootSettings::default(),
            verify_steps: 1000,
            verify_x_end: 1.0,
            seed: 2024,
        }
    }
}

impl LabConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LabConfig = toml::from_str(text).context("Invalid configuration file.")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        level_filter(&self.log_level)?;
        if self.verify_steps == 0 {
            bail!("verify_steps must be greater than zero.");
        }
        if !(self.verify_x_end.is_finite() && self.verify_x_end > 0.0) {
            bail!("verify_x_end must be positive and finite.");
        }
        let roots = &self.roots;
        if !(0..=15).contains(&roots.rounding_digits) {
            bail!("roots.rounding_digits must lie in 0..=15.");
        }
        if !(roots.cluster_spread > 0.0 && roots.residual_factor > 0.0) {
            bail!("roots.cluster_spread and roots.residual_factor must be positive.");
        }
        if !(roots.pair_tolerance >= 0.0) {
            bail!("roots.pair_tolerance must be non-negative.");
        }
        Ok(())
    }
}

pub fn level_filter(level: &str) -> Result<LevelFilter> {
    Ok(match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        other => bail!("log_level must be off, error, warn, info, debug or trace, got \"{other}\"."),
    })
}

/// Installs a terminal logger on stderr. A second call is a no-op.
pub fn init_logger(level: LevelFilter) {
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
    if logger_instance.is_err() {
        log::debug!("logger already initialised");
    }
}
