//! # WordPress to Static Site Migration
//!
//! This crate reads posts from a WordPress REST API, downloads every image a
//! post references (featured, in-body and social), re-encodes them as WebP
//! under a per-post folder, rewrites the post body to the local paths and
//! writes one JSON or Markdown file per post plus an aggregated index.
//!
//! ```no_run
//! use wpmigrate::{get_config, Migration};
//!
//! # async fn run() -> Result<(), wpmigrate::MigrateError> {
//! let config = get_config(None)?;
//! let report = Migration::new(config)?.run().await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod images;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod seo;
pub mod transform;
pub mod types;

pub use client::{build_http_client, PostPage, WordPressClient};
pub use crate::config::{get_config, MigrationConfig};
pub use errors::{AssetError, MigrateError};
pub use images::ImageFetcher;
pub use output::{OutputFormat, PostEncoder};
pub use pipeline::Migration;
pub use report::{AssetFailure, MigrationReport, PostFailure, PostReport};
pub use types::{ImageRole, Post, PostRecord, SeoBlock};
