//! Command-line argument parsing
//!
//! Supports:
//! - Running as an editor plugin over stdin/stdout (no arguments)
//! - Highlighting a file once and printing the line batches
//! - Overriding the config file and request concurrency

use clap::Parser;
use std::path::PathBuf;

use crate::config::HighlightConfig;

/// Go syntax highlighter plugin
#[derive(Parser, Debug)]
#[command(name = "go-highlight", version, about = "Incremental Go syntax highlighter")]
pub struct CliArgs {
    /// Highlight this file once and print one JSON batch per line
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of line requests in flight
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

/// How the process talks to the outside world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    /// Serve the editor protocol on stdin/stdout
    Plugin,
    /// Highlight a single file and exit
    File(PathBuf),
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub mode: StartupMode,
    pub config: HighlightConfig,
}

impl CliArgs {
    /// Resolve the startup mode and the effective configuration
    pub fn into_config(self) -> Result<StartupConfig, String> {
        let mut config = match &self.config {
            Some(path) => HighlightConfig::load_from(path)?,
            None => HighlightConfig::load(),
        };
        self.apply_overrides(&mut config)?;

        let mode = match self.file {
            Some(path) => StartupMode::File(path),
            None => StartupMode::Plugin,
        };
        Ok(StartupConfig { mode, config })
    }

    /// Command-line values win over the config file
    pub fn apply_overrides(&self, config: &mut HighlightConfig) -> Result<(), String> {
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("--concurrency must be at least 1".to_string());
            }
            config.concurrency = concurrency;
        }
        Ok(())
    }
}
