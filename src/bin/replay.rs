//! grid-view-replay binary
//!
//! Replays a JSON-lines transcript of channel traffic and user input through
//! the view synchronizer and prints the rendered frames and the intents the
//! view would have sent.
//!
//! ## Configuration (env / TOML via `config` crate)
//!
//! | Key                        | Default | Description                      |
//! |----------------------------|---------|----------------------------------|
//! | `GRID_VIEW_GRID_SIZE`      | `9`     | Side length of the grid          |
//! | `GRID_VIEW_CELL_SIZE`      | `60.0`  | Cell size in pixels (for clicks) |
//! | `GRID_VIEW_EVENT_LINGER_MS`| `500`   | Fade time for removed events     |

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use grid_view::replay::{self, ReplayOptions};
use tokio::io::{AsyncBufRead, BufReader};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "grid-view-replay", about = "Grid View transcript replay", version)]
struct Args {
    /// Transcript file; reads stdin when omitted or `-`
    transcript: Option<String>,

    /// View config file (TOML, JSON, …)
    #[arg(long, env = "GRID_VIEW_CONFIG")]
    config: Option<String>,

    /// Override the grid side length
    #[arg(long)]
    grid_size: Option<usize>,

    /// Override the cell size in pixels
    #[arg(long)]
    cell_size: Option<f64>,

    /// Pause between transcript lines (milliseconds)
    #[arg(long, env = "GRID_VIEW_PACE_MS", default_value_t = 0)]
    pace_ms: u64,

    /// Print a frame after every line
    #[arg(long)]
    every_frame: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grid_view=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = replay::load_config(args.config.as_deref())?;
    if let Some(n) = args.grid_size {
        config.grid_size = n;
    }
    if let Some(size) = args.cell_size {
        config.cell_size = size;
    }

    tracing::info!(
        grid_size = config.grid_size,
        cell_size = config.cell_size,
        "starting grid-view-replay"
    );

    let input: Box<dyn AsyncBufRead + Unpin> = match args.transcript.as_deref() {
        None | Some("-") => Box::new(BufReader::new(tokio::io::stdin())),
        Some(path) => Box::new(BufReader::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening transcript {path}"))?,
        )),
    };

    let options = ReplayOptions {
        pace: Duration::from_millis(args.pace_ms),
        every_frame: args.every_frame,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    tokio::select! {
        res = replay::run(input, &mut out, config, &options) => {
            let stats = res?;
            tracing::info!(
                lines = stats.lines,
                inbound = stats.inbound,
                dropped = stats.dropped,
                intents = stats.intents,
                "replay finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("replay interrupted (SIGINT)");
        }
    }

    Ok(())
}
