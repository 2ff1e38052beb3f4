//! # Migration Configuration
//!
//! This module defines [`MigrationConfig`] and the logic for loading it from an
//! optional `wpmigrate.yml` file and environment variables. Layers, lowest
//! priority first:
//!
//! 1. Built-in defaults (the `default_*` functions below).
//! 2. The YAML file, after `${VAR}` substitution from the environment.
//! 3. `WPMIGRATE_*` environment variables (e.g. `WPMIGRATE_API_URL`).
//!
//! The CLI applies its own flags on top of the loaded value.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_ASSET_URL_PREFIX, DEFAULT_CONFIG_FILE, DEFAULT_IMAGES_DIR,
    DEFAULT_INDEX_FILE, DEFAULT_POSTS_DIR, DEFAULT_SITE_URL, ENV_PREFIX, MAX_PER_PAGE,
};
use crate::errors::MigrateError;
use crate::output::OutputFormat;
use ::config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;
use url::Url;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("env substitution pattern is a valid regex")
});

/// Everything a migration run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// WordPress REST API base; posts are read from `<api_url>/posts`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Public site base used for default canonical URLs and relative image sources.
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
    /// Site-relative prefix for rewritten image paths.
    #[serde(default = "default_asset_url_prefix")]
    pub asset_url_prefix: String,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Pages to fetch; `0` fetches until the API runs out of posts.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Posts transformed at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound for one image download plus transcode.
    #[serde(default = "default_asset_timeout_secs")]
    pub asset_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_site_url() -> String {
    DEFAULT_SITE_URL.to_string()
}
fn default_posts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_POSTS_DIR)
}
fn default_images_dir() -> PathBuf {
    PathBuf::from(DEFAULT_IMAGES_DIR)
}
fn default_index_file() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_FILE)
}
fn default_asset_url_prefix() -> String {
    DEFAULT_ASSET_URL_PREFIX.to_string()
}
fn default_per_page() -> u32 {
    MAX_PER_PAGE
}
fn default_max_pages() -> u32 {
    1
}
fn default_concurrency() -> usize {
    1
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_asset_timeout_secs() -> u64 {
    60
}
fn default_user_agent() -> String {
    format!("wpmigrate/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            site_url: default_site_url(),
            posts_dir: default_posts_dir(),
            images_dir: default_images_dir(),
            index_file: default_index_file(),
            asset_url_prefix: default_asset_url_prefix(),
            format: OutputFormat::default(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            asset_timeout_secs: default_asset_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl MigrationConfig {
    /// Checks the values that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(MigrateError::Config(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        if self.concurrency == 0 {
            return Err(MigrateError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 || self.asset_timeout_secs == 0 {
            return Err(MigrateError::Config(
                "timeouts must be at least one second".to_string(),
            ));
        }
        self.site_base()?;
        Ok(())
    }

    /// The parsed `site_url`, used to resolve relative image sources.
    pub fn site_base(&self) -> Result<Url, MigrateError> {
        Url::parse(&self.site_url).map_err(|e| {
            MigrateError::Config(format!("Invalid site_url '{}': {e}", self.site_url))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    /// The folder holding one post's images.
    pub fn image_folder(&self, slug: &str) -> PathBuf {
        self.images_dir.join(slug)
    }

    /// The site-relative path of a localized image.
    pub fn asset_path(&self, slug: &str, file_name: &str) -> String {
        format!(
            "{}/{slug}/{file_name}",
            self.asset_url_prefix.trim_end_matches('/')
        )
    }

    /// The default canonical URL for a post when SEO data provides none.
    pub fn default_canonical(&self, slug: &str) -> String {
        format!("{}/{slug}/", self.site_url.trim_end_matches('/'))
    }
}

// Reads a file and substitutes `${VAR}` references with environment values.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &Path) -> Result<Option<String>, MigrateError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
    let expanded = ENV_VAR_RE.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the configuration from a YAML file and `WPMIGRATE_*` environment variables.
///
/// With `config_path` set, the file must exist. Without it, `wpmigrate.yml` in
/// the working directory is used when present, and defaults otherwise.
pub fn get_config(config_path: Option<&Path>) -> Result<MigrationConfig, MigrateError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            MigrateError::Config(format!("Config file not found at '{}'", path.display()))
        })?),
        None => read_and_substitute(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    if let Some(content) = file_content {
        info!(
            "Loading configuration from '{}'.",
            config_path
                .unwrap_or(Path::new(DEFAULT_CONFIG_FILE))
                .display()
        );
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: MigrationConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MigrationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let config = MigrationConfig {
            per_page: 101,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MigrateError::Config(_))));

        let config = MigrationConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MigrateError::Config(_))));

        let config = MigrationConfig {
            site_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MigrateError::Config(_))));
    }

    #[test]
    fn test_asset_path_and_default_canonical() {
        let config = MigrationConfig {
            site_url: "https://site.test/".to_string(),
            asset_url_prefix: "/assets/images/blog-images/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.asset_path("hello", "kep0.webp"),
            "/assets/images/blog-images/hello/kep0.webp"
        );
        assert_eq!(config.default_canonical("hello"), "https://site.test/hello/");
    }
}
