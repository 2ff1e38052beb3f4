use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a migration run.
///
/// Anything that happens to a single image is an [`AssetError`] instead and is
/// recorded in the run report rather than propagated.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to fetch posts from {url}: {source}")]
    FetchPosts {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("WordPress API at {url} returned status {status}: {body}")]
    ApiStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Failed to parse the post list from {url}: {source}")]
    ParsePosts {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render frontmatter: {0}")]
    Frontmatter(#[from] serde_yaml::Error),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Migration cancelled before completion")]
    Cancelled,
}

impl MigrateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<::config::ConfigError> for MigrateError {
    fn from(err: ::config::ConfigError) -> Self {
        MigrateError::Config(err.to_string())
    }
}

/// Errors that affect a single image slot.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Invalid image URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to fetch image {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Image request for {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("Failed to transcode image {url}: {source}")]
    Transcode {
        url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out after {secs}s while localizing {url}")]
    Timeout { url: String, secs: u64 },
    #[error("Transcoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
