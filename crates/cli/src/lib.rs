//! # `wpmigrate` CLI Library Crate
//!
//! Argument parsing and command handlers for the `wpmigrate` binary. The
//! binary itself only sets up logging and maps errors to exit codes.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use wpmigrate::{get_config, MigrateError, Migration, MigrationConfig, OutputFormat};

/// Exit code for a run interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

// --- CLI Argument Structs ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate WordPress posts and their images to static files
    Migrate(MigrateArgs),
    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Path to a YAML config file. Defaults to ./wpmigrate.yml when present.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// WordPress REST API base, e.g. https://example.com/wp-json/wp/v2
    #[arg(long)]
    pub api_url: Option<String>,
    /// Public site URL used for default canonical links.
    #[arg(long)]
    pub site_url: Option<String>,
    /// Directory for the per-post output files.
    #[arg(long)]
    pub posts_dir: Option<PathBuf>,
    /// Root directory for localized images.
    #[arg(long)]
    pub images_dir: Option<PathBuf>,
    /// Path of the aggregated index file.
    #[arg(long)]
    pub index_file: Option<PathBuf>,
    /// Output format: json or markdown.
    #[arg(long)]
    pub format: Option<OutputFormat>,
    /// Posts requested per API page (1-100).
    #[arg(long)]
    pub per_page: Option<u32>,
    /// Pages to fetch; 0 fetches all.
    #[arg(long)]
    pub max_pages: Option<u32>,
    /// Posts processed at the same time.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl MigrateArgs {
    /// Applies the flags that were given on top of the loaded configuration.
    pub fn apply(&self, config: &mut MigrationConfig) {
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(site_url) = &self.site_url {
            config.site_url = site_url.clone();
        }
        if let Some(posts_dir) = &self.posts_dir {
            config.posts_dir = posts_dir.clone();
        }
        if let Some(images_dir) = &self.images_dir {
            config.images_dir = images_dir.clone();
        }
        if let Some(index_file) = &self.index_file {
            config.index_file = index_file.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(per_page) = self.per_page {
            config.per_page = per_page;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a YAML config file. Defaults to ./wpmigrate.yml when present.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

// --- Public Entrypoint ---

/// The main entry point for the `wpmigrate` library.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Migrate(args) => handle_migrate(args).await,
        Commands::Config(args) => handle_config(args),
    }
}

/// Maps a failed run to the process exit code.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<MigrateError>() {
        Some(MigrateError::Cancelled) => EXIT_INTERRUPTED,
        _ => 1,
    }
}

// --- Command Handlers ---

async fn handle_migrate(args: MigrateArgs) -> Result<()> {
    let mut config = get_config(args.config.as_deref())?;
    args.apply(&mut config);
    info!("Starting migration with config: {:?}", config);

    let migration = Migration::new(config)?;
    println!(
        "🚚 Migrating posts from '{}' as {}...",
        migration.config().api_url,
        migration.config().format
    );

    let report = migration.run_until(shutdown_signal()).await?;

    println!("✅ {report}");
    for post in report.posts_with_failures() {
        for failure in &post.failures {
            println!(
                "   ⚠️  {} [{}] {}: {}",
                post.slug, failure.role, failure.url, failure.error
            );
        }
    }
    for slug in &report.skipped_posts {
        println!("   ⏭️  skipped post with unusable slug {slug:?}");
    }
    for failed in &report.failed_posts {
        println!("   ❌ {}: {}", failed.slug, failed.error);
    }
    Ok(())
}

fn handle_config(args: ConfigArgs) -> Result<()> {
    let config = get_config(args.config.as_deref())?;
    let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
    print!("{yaml}");
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
