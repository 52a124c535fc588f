// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, hand over to the UI.
// - Returns `anyhow::Result` so a fatal session error exits non-zero.

use clap::Parser;
use immich_album_cli::ui::run_session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Add a local photo folder (and everything below it) to an Immich album.
#[derive(Parser, Debug)]
#[command(name = "immich-album", version, about)]
struct Args {
    /// Resolve everything but do not create albums or add assets
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr and stay quiet by default so they do not mix with
    // the prompts; set RUST_LOG=debug to see every request.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // Blocks until the user is done or the session hits a fatal error.
    run_session(args.dry_run)?;
    Ok(())
}
