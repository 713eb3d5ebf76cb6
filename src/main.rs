mod app;
mod config;
mod flow;
mod geometry;
mod util;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ViewerConfig;
use crate::flow::{DocumentStore, JsonFileStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document to view and edit.
    #[arg(long, default_value = "diagram.json")]
    data: PathBuf,

    /// Optional JSON file overriding canvas, timing and summary settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Defaults when no file is given; a bad file is logged and returned.
fn load_config(path: Option<&Path>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::load(path).inspect_err(|error| error!("{error:#}")),
        None => Ok(ViewerConfig::default()),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    let store = JsonFileStore::new(args.data);
    info!(path = %store.path().display(), "starting fundflow viewer");
    let store: Arc<dyn DocumentStore> = Arc::new(store);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "fundflow",
        options,
        Box::new(move |cc| Ok(Box::new(app::FlowViewerApp::new(cc, store, config)))),
    )
    .map_err(|error| anyhow!("failed to run the viewer window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn no_config_path_means_defaults() {
        assert_eq!(load_config(None).unwrap(), ViewerConfig::default());
    }

    #[test]
    fn malformed_config_is_an_error_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        fs::write(&path, "{ \"canvas\": ").unwrap();

        let error = load_config(Some(&path)).unwrap_err();

        assert!(format!("{error:#}").contains("invalid config file"));
    }
}
