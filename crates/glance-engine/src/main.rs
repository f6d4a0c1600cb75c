//! # Glance
//!
//! Headless demo of the data-driven interaction system.
//!
//! Loads interaction assets, builds a small level around a scanning player,
//! and drives it with a timed input script:
//! - Gameplay: focus scanning, requirements and hold input
//! - Tools: the interaction debug overlay
//!
//! Usage: `glance [config.toml]`, or `glance --write-config [path]` to write
//! the default configuration. Logging follows `RUST_LOG`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod asset_loader;
mod config;
mod script;
mod timing;

use anyhow::{Context as _, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::GlanceConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("glance=info".parse()?))
        .init();

    info!("Project Glance starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--write-config") {
        let path = args.get(1).map_or(config::CONFIG_FILE, String::as_str);
        GlanceConfig::default()
            .save_to(path)
            .with_context(|| format!("writing default config to {path}"))?;
        return Ok(());
    }

    let config = match args.first() {
        Some(path) => GlanceConfig::load_from(path),
        None => GlanceConfig::load(),
    };

    let summary = app::run(config)?;
    info!("Demo summary: {}", serde_json::to_string_pretty(&summary)?);

    info!("Project Glance shutdown complete");
    Ok(())
}
