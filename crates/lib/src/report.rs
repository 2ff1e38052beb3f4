//! # Run Report
//!
//! A structured account of what a migration run produced, so operators do not
//! have to reconstruct data completeness from the warning stream.

use crate::types::ImageRole;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One image that could not be localized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub role: ImageRole,
    pub url: String,
    pub error: String,
}

/// The outcome for a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostReport {
    pub slug: String,
    pub output_path: PathBuf,
    pub failures: Vec<AssetFailure>,
    /// Number of problems the HTML parser recovered from in the post body.
    pub html_anomalies: usize,
}

/// A post that could not be written, e.g. because its slug is not a valid file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostFailure {
    pub slug: String,
    pub error: String,
}

/// The outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub posts_processed: usize,
    pub index_path: PathBuf,
    pub posts: Vec<PostReport>,
    /// Slugs of posts that were not migrated because their slug is unusable as a path.
    pub skipped_posts: Vec<String>,
    /// Posts that failed on their own; they are missing from the index.
    pub failed_posts: Vec<PostFailure>,
}

impl MigrationReport {
    /// Total number of images that could not be localized.
    pub fn failed_assets(&self) -> usize {
        self.posts.iter().map(|p| p.failures.len()).sum()
    }

    /// Posts with at least one failed image.
    pub fn posts_with_failures(&self) -> impl Iterator<Item = &PostReport> {
        self.posts.iter().filter(|p| !p.failures.is_empty())
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} post(s) migrated, index written to {}",
            self.posts_processed,
            self.index_path.display()
        )?;
        let failed = self.failed_assets();
        if failed > 0 {
            write!(
                f,
                "; {failed} image(s) failed across {} post(s)",
                self.posts_with_failures().count()
            )?;
        }
        if !self.skipped_posts.is_empty() {
            write!(f, "; {} post(s) skipped", self.skipped_posts.len())?;
        }
        if !self.failed_posts.is_empty() {
            write!(f, "; {} post(s) failed", self.failed_posts.len())?;
        }
        Ok(())
    }
}
