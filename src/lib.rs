//! go-highlight - incremental Go syntax highlighting for editor plugins
//!
//! The editor owns the document. On each `ping_from_editor` the plugin:
//!
//! 1. fetches every line with a bounded number of requests in flight
//! 2. parses the joined text as Go
//! 3. walks the tree, emitting colored spans in source order
//! 4. groups the spans per line and sends one `set_line_fg_spans` per line

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod palette;
pub mod pipeline;
pub mod plugin;
pub mod rpc;
pub mod store;
pub mod syntax;

// Re-export commonly used types
pub use config::HighlightConfig;
pub use palette::Palette;
pub use pipeline::{HighlightError, Pipeline, PipelineOptions, RunSummary};
pub use plugin::PluginHost;
