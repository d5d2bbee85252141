//! Replay a recorded mirror and print the documents it serves
//!
//! ```text
//! rf2-replay race.jsonl --endpoint /scoring/
//! rf2-replay race.jsonl --follow --speed 4
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rf2_pitwall::{Endpoint, Pitwall, PitwallConfig, ReplayProvider};

#[derive(Parser)]
#[command(name = "rf2-replay")]
#[command(about = "Replay a recorded rFactor 2 mirror and print one endpoint's document")]
struct Cli {
    /// JSON-lines recording of mirror updates
    recording: PathBuf,

    /// Endpoint path to render, e.g. /session/ or /scoring
    #[arg(short, long, default_value = "/session/")]
    endpoint: String,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Playback speed multiplier, overrides the configuration
    #[arg(short, long)]
    speed: Option<f64>,

    /// Print the session view after every update instead of once at the end
    #[arg(short, long)]
    follow: bool,

    /// Pretty-print documents
    #[arg(long)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let endpoint = Endpoint::parse(&cli.endpoint)?;

    let mut config = match &cli.config {
        Some(path) => PitwallConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PitwallConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.replay.speed = speed;
    }

    let provider = ReplayProvider::open(&cli.recording, &config.replay)
        .with_context(|| format!("opening recording {}", cli.recording.display()))?;
    let pitwall = Pitwall::start(provider, &config);

    if cli.follow {
        let mut sessions = Box::pin(pitwall.session_updates());
        while let Some(session) = sessions.next().await {
            print(&serde_json::to_value(&session)?, cli.pretty)?;
        }
    } else {
        pitwall.wait_for_data(Duration::from_secs(5)).await?;

        let mut mirror = pitwall.mirror().clone();
        while mirror.changed().await.is_ok() {}
        info!("Recording finished after {} updates", mirror.state().generation);

        let response = pitwall.handle(endpoint)?;
        if response.stale {
            warn!("{} was rendered from a torn snapshot", endpoint);
        }
        print(&response.document, cli.pretty)?;
    }

    pitwall.shutdown().await;
    Ok(())
}

fn print(document: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    println!("{text}");
    Ok(())
}
