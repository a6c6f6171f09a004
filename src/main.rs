mod app;
mod config;
mod knowledge;
mod layout;
mod progress;
mod stats;
mod util;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::{AppConfig, Args};

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "devverse=info".to_owned());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from(Args::parse());
    tracing::info!(
        theme = config.theme.label(),
        progress_file = %config.progress_file.display(),
        "starting devverse"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_title("DevVerse"),
        ..Default::default()
    };

    eframe::run_native(
        "DevVerse",
        options,
        Box::new(move |cc| Ok(Box::new(app::UniverseApp::new(cc, config)))),
    )
    .map_err(|error| anyhow::anyhow!("event loop failed: {error}"))
}
