use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use ctile_core::coord::TileParams;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod fixture;

use fixture::InMemoryFacade;

#[derive(Parser, Debug)]
#[command(name = "ctile-cli", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a single `(z, x, y)` vector tile from a synthetic graph
    /// fixture and write the MVT bytes to a file.
    Render {
        /// Zoom level, 0..=22.
        z: u8,
        /// Tile column.
        x: u32,
        /// Tile row.
        y: u32,
        /// Path to a JSON fixture describing nodes, geometries, edges, and
        /// contraction-hierarchy shortcuts.
        #[arg(long)]
        fixture: PathBuf,
        /// Where to write the produced `.mvt` bytes.
        #[arg(long, default_value = "tile.mvt")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { z, x, y, fixture, out } => {
            let params = TileParams::new(z, x, y)
                .map_err(|e| anyhow!("invalid tile coordinates: {e}"))?;

            info!(path = %fixture.display(), "loading fixture");
            let facade = InMemoryFacade::load(&fixture)?;

            let started = std::time::Instant::now();
            let bytes = ctile_core::handle_request(&facade, params)
                .map_err(|e| anyhow!("failed to render tile: {e}"))?;
            info!(
                z, x, y,
                bytes = bytes.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "tile rendered"
            );

            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write tile to {}", out.display()))?;
            info!(path = %out.display(), "wrote tile");
            Ok(())
        }
    }
}
