//! # wpmigrate: WordPress to Static Site Migration
//!
//! This is the main entry point for the `wpmigrate` command-line interface.
//! It is a thin entrypoint; all logic lives in the `wpmigrate_cli` library crate.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use wpmigrate_cli::{exit_code, run, Cli};

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env if present
    dotenvy::dotenv().ok();

    // 2. Setup logging on stderr so stdout stays clean for command output
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wpmigrate=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 3. Parse CLI arguments
    let cli = Cli::parse();

    // 4. Run and map failures to exit codes
    if let Err(e) = run(cli).await {
        eprintln!("[wpmigrate error] {e:?}");
        std::process::exit(exit_code(&e));
    }

    Ok(())
}
