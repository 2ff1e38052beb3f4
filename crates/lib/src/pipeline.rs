//! # Pipeline Driver
//!
//! Fetches the post list, pushes every post through the [`PostTransformer`],
//! writes one file per post and finally the aggregated index. Posts are
//! processed `concurrency` at a time with their order preserved, so the index
//! always lists posts in API order.
//!
//! Only a failure to obtain the post list or to write the index aborts a run;
//! in that case no index is written. A post that cannot be written is logged,
//! reported in [`MigrationReport::failed_posts`] and left out of the index.

use crate::client::{build_http_client, WordPressClient};
use crate::config::MigrationConfig;
use crate::errors::MigrateError;
use crate::images::ImageFetcher;
use crate::output::PostEncoder;
use crate::report::{MigrationReport, PostFailure, PostReport};
use crate::transform::PostTransformer;
use crate::types::Post;
use futures::{stream, StreamExt};
use std::future::Future;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// A slug is used as a file stem and a folder name, so it must stay inside them.
fn is_safe_slug(slug: &str) -> bool {
    !slug.trim().is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains('\0')
}

/// What happened to one post.
enum PostOutcome {
    Migrated(PostReport, serde_json::Value),
    Skipped,
    Failed(MigrateError),
}

/// A configured migration, ready to run.
pub struct Migration {
    config: MigrationConfig,
    client: WordPressClient,
    fetcher: ImageFetcher,
    encoder: Box<dyn PostEncoder>,
    base: Url,
}

impl Migration {
    pub fn new(config: MigrationConfig) -> Result<Self, MigrateError> {
        config.validate()?;
        let http = build_http_client(&config)?;
        let base = config.site_base()?;
        Ok(Self {
            client: WordPressClient::new(http.clone(), &config),
            fetcher: ImageFetcher::new(http, config.asset_timeout()),
            encoder: config.format.encoder(),
            base,
            config,
        })
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Runs the migration to completion.
    pub async fn run(&self) -> Result<MigrationReport, MigrateError> {
        self.execute().await
    }

    /// Runs the migration until it completes or `shutdown` resolves.
    ///
    /// On shutdown all in-flight downloads are dropped, the index is not
    /// written and [`MigrateError::Cancelled`] is returned.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<MigrationReport, MigrateError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.execute() => result,
            () = shutdown => {
                warn!("Shutdown requested; abandoning migration without writing the index");
                Err(MigrateError::Cancelled)
            }
        }
    }

    async fn execute(&self) -> Result<MigrationReport, MigrateError> {
        create_dir(&self.config.posts_dir).await?;
        create_dir(&self.config.images_dir).await?;

        info!("Fetching posts from {}", self.client.posts_url());
        let posts = self.client.fetch_posts().await?;
        info!("Migrating {} post(s) as {}", posts.len(), self.config.format);

        let transformer = PostTransformer::new(
            &self.config,
            &self.fetcher,
            self.encoder.as_ref(),
            &self.base,
        );

        let outcomes: Vec<PostOutcome> = stream::iter(posts.iter())
            .map(|post| self.migrate_post(&transformer, post))
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut report = MigrationReport {
            index_path: self.config.index_file.clone(),
            ..Default::default()
        };
        let mut index = Vec::with_capacity(outcomes.len());
        for (post, outcome) in posts.iter().zip(outcomes) {
            match outcome {
                PostOutcome::Migrated(post_report, entry) => {
                    report.posts.push(post_report);
                    index.push(entry);
                }
                PostOutcome::Skipped => report.skipped_posts.push(post.slug.clone()),
                PostOutcome::Failed(e) => report.failed_posts.push(PostFailure {
                    slug: post.slug.clone(),
                    error: e.to_string(),
                }),
            }
        }
        report.posts_processed = report.posts.len();

        if let Some(parent) = self.config.index_file.parent() {
            create_dir(parent).await?;
        }
        let json = serde_json::to_string_pretty(&index)?;
        tokio::fs::write(&self.config.index_file, json)
            .await
            .map_err(|e| MigrateError::io(&self.config.index_file, e))?;

        info!("{report}");
        Ok(report)
    }

    async fn migrate_post(&self, transformer: &PostTransformer<'_>, post: &Post) -> PostOutcome {
        if !is_safe_slug(&post.slug) {
            warn!("Skipping post with unusable slug {:?}", post.slug);
            return PostOutcome::Skipped;
        }

        match self.write_post(transformer, post).await {
            Ok((report, entry)) => PostOutcome::Migrated(report, entry),
            Err(e) => {
                warn!("Failed to migrate post '{}': {e}", post.slug);
                PostOutcome::Failed(e)
            }
        }
    }

    async fn write_post(
        &self,
        transformer: &PostTransformer<'_>,
        post: &Post,
    ) -> Result<(PostReport, serde_json::Value), MigrateError> {
        let transformed = transformer.transform(post).await?;
        let encoded = self.encoder.encode(&transformed.record)?;
        let entry = self.encoder.index_entry(&transformed.record)?;

        let output_path = self
            .config
            .posts_dir
            .join(self.encoder.file_name(&post.slug));
        tokio::fs::write(&output_path, encoded)
            .await
            .map_err(|e| MigrateError::io(&output_path, e))?;
        info!(
            "Wrote '{}' ({} image failure(s))",
            output_path.display(),
            transformed.failures.len()
        );

        let report = PostReport {
            slug: post.slug.clone(),
            output_path,
            failures: transformed.failures,
            html_anomalies: transformed.html_anomalies,
        };
        Ok((report, entry))
    }
}

async fn create_dir(path: &Path) -> Result<(), MigrateError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}
