use std::path::PathBuf;

use backend::{build_resolver, config::UpstreamConfig, convert::convert};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Convert a Google Maps route link into a GPX track file"
)]
struct Args {
    /// Google Maps directions or short link
    #[arg(long)]
    url: String,

    /// Track name written into the GPX metadata
    #[arg(long)]
    name: Option<String>,

    /// Travel mode used for timing, overriding the one in the link
    #[arg(long)]
    mode: Option<String>,

    /// Output file; defaults to "<name>_<date>.gpx" in the current directory
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    upstream: UpstreamConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let resolver = build_resolver(&args.upstream)?;
    let conversion = convert(
        &resolver,
        &args.url,
        args.name.as_deref(),
        args.mode.as_deref(),
    )
    .await?;

    for place in conversion.route.skipped_places() {
        tracing::warn!("skipped waypoint {place:?}: no geocoding match");
    }
    if !conversion.road_following() {
        tracing::info!("track uses straight lines between waypoints");
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&conversion.filename));
    std::fs::write(&output, &conversion.gpx)?;
    tracing::info!(
        "wrote {} points ({:.1} km, {}) to {:?}",
        conversion.track.points.len(),
        conversion.track.distance_m / 1_000.0,
        conversion.track.mode,
        output
    );

    Ok(())
}
