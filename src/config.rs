//! Highlighter configuration
//!
//! Read from `~/.config/go-highlight/config.yaml`. Every field is optional:
//!
//! ```yaml
//! concurrency: 10
//! span_queue_capacity: 10
//! palette:
//!   identifier: "ff323333"
//!   literal: "ff183792"
//!   field: "ffed6a43"
//!   punctuation: "ff96989f"
//!   keyword: "ffa71e77"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::palette::{Color, Palette};
use crate::pipeline::{PipelineOptions, DEFAULT_CONCURRENCY, DEFAULT_SPAN_QUEUE_CAPACITY};

/// Colors as hex strings (`RRGGBB` or `AARRGGBB`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub identifier: String,
    pub literal: String,
    pub field: String,
    pub punctuation: String,
    pub keyword: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            identifier: palette.identifier.to_string(),
            literal: palette.literal.to_string(),
            field: palette.field.to_string(),
            punctuation: palette.punctuation.to_string(),
            keyword: palette.keyword.to_string(),
        }
    }
}

impl PaletteConfig {
    /// Parse every entry, naming the first one that is invalid
    pub fn to_palette(&self) -> Result<Palette, String> {
        let parse = |name: &str, value: &str| {
            Color::from_hex(value).map_err(|e| format!("palette.{}: {}", name, e))
        };
        Ok(Palette {
            identifier: parse("identifier", &self.identifier)?,
            literal: parse("literal", &self.literal)?,
            field: parse("field", &self.field)?,
            punctuation: parse("punctuation", &self.punctuation)?,
            keyword: parse("keyword", &self.keyword)?,
        })
    }
}

/// Tuning and colors for the highlighter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Maximum number of line requests outstanding at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Capacity of the walker → aggregator queue
    #[serde(default = "default_span_queue_capacity")]
    pub span_queue_capacity: usize,

    #[serde(default)]
    pub palette: PaletteConfig,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_span_queue_capacity() -> usize {
    DEFAULT_SPAN_QUEUE_CAPACITY
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            span_queue_capacity: default_span_queue_capacity(),
            palette: PaletteConfig::default(),
        }
    }
}

impl HighlightConfig {
    /// Load config from the default location, or return defaults
    ///
    /// A missing, unreadable, or invalid file is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load and validate config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config at {}: {}", path.display(), e))?;
        config
            .validate()
            .map_err(|e| format!("Invalid config at {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.span_queue_capacity == 0 {
            return Err("span_queue_capacity must be at least 1".to_string());
        }
        self.palette.to_palette().map(|_| ())
    }

    pub fn palette(&self) -> Result<Palette, String> {
        self.palette.to_palette()
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            concurrency: self.concurrency,
            span_queue_capacity: self.span_queue_capacity,
        }
    }
}
