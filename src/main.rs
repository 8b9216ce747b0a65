use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use go_highlight::cli::{CliArgs, StartupMode};
use go_highlight::notify::JsonLinesNotifier;
use go_highlight::store::RopeLineStore;
use go_highlight::{logging, Palette, Pipeline, PipelineOptions, PluginHost};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init();

    let startup = args.into_config().map_err(anyhow::Error::msg)?;
    let palette = startup.config.palette().map_err(anyhow::Error::msg)?;
    let options = startup.config.pipeline_options();

    match startup.mode {
        StartupMode::File(path) => highlight_file(&path, &palette, options),
        StartupMode::Plugin => {
            tracing::info!("Serving plugin protocol on stdio");
            let host = PluginHost::new(io::stdout(), palette, options);
            host.serve(io::stdin().lock())
        }
    }
}

/// Run the pipeline over a local file, printing one JSON batch per line
fn highlight_file(path: &Path, palette: &Palette, options: PipelineOptions) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let store = RopeLineStore::new(&text);
    let notifier = JsonLinesNotifier::new(io::stdout());

    let summary = Pipeline::new(&store, &notifier, palette, options)
        .run()
        .with_context(|| format!("Failed to highlight {}", path.display()))?;
    tracing::info!(
        "Highlighted {}: {} lines, {} batches",
        path.display(),
        summary.lines,
        summary.batches
    );
    Ok(())
}
