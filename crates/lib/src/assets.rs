//! # Asset Localization
//!
//! Ties the image fetcher to one post's image folder and rewrites the post
//! body to point at the localized files.

use crate::config::MigrationConfig;
use crate::images::{resolve_image_url, ImageFetcher};
use crate::report::AssetFailure;
use crate::types::{ImageRef, ImageRole};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;
use wpmigrate_html::replace_urls;

/// Localizes images for a single post.
pub struct AssetLocalizer<'a> {
    fetcher: &'a ImageFetcher,
    config: &'a MigrationConfig,
    base: &'a Url,
    slug: &'a str,
    folder: PathBuf,
}

impl<'a> AssetLocalizer<'a> {
    pub fn new(
        fetcher: &'a ImageFetcher,
        config: &'a MigrationConfig,
        base: &'a Url,
        slug: &'a str,
    ) -> Self {
        Self {
            fetcher,
            config,
            base,
            slug,
            folder: config.image_folder(slug),
        }
    }

    /// The folder this post's images are written to.
    pub fn folder(&self) -> &PathBuf {
        &self.folder
    }

    /// Downloads `src` into the slot for `role` and returns its site-relative path.
    ///
    /// Failures are logged as warnings naming the URL and returned as an
    /// [`AssetFailure`] for the run report; they never propagate further.
    pub async fn localize(&self, role: ImageRole, src: &str) -> Result<String, AssetFailure> {
        let file_name = role.file_name();
        let result = match resolve_image_url(src, self.base) {
            Ok(url) => {
                self.fetcher
                    .fetch_and_transcode(&url, &self.folder.join(&file_name))
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!("Saved {role} for '{}': {src} -> {file_name}", self.slug);
                Ok(self.config.asset_path(self.slug, &file_name))
            }
            Err(e) => {
                warn!("Failed to localize {role} for '{}' ({src}): {e}", self.slug);
                Err(AssetFailure {
                    role,
                    url: src.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }
}

/// Rewrites every occurrence of each localized remote URL in `html` to
/// `<asset_url_prefix>/<slug>/<local file>`.
///
/// When a URL appears in `refs` more than once, the last entry wins. The
/// `&amp;`-escaped spelling of each URL is mapped as well, because the parser
/// hands back decoded attribute values while the raw HTML keeps entities.
pub fn rewrite(html: &str, config: &MigrationConfig, slug: &str, refs: &[ImageRef]) -> String {
    let mut replacements = HashMap::with_capacity(refs.len() * 2);
    for image in refs {
        let local = config.asset_path(slug, &image.local_file_name);
        let escaped = image.remote_url.replace('&', "&amp;");
        if escaped != image.remote_url {
            replacements.insert(escaped, local.clone());
        }
        replacements.insert(image.remote_url.clone(), local);
    }
    replace_urls(html, &replacements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(remote: &str, local: &str) -> ImageRef {
        ImageRef {
            remote_url: remote.to_string(),
            local_file_name: local.to_string(),
        }
    }

    #[test]
    fn test_rewrite_uses_asset_prefix_and_slug() {
        let config = MigrationConfig::default();
        let html = r#"<img src="https://cdn.test/u1.jpg"><img src="https://cdn.test/u2.jpg">"#;
        let rewritten = rewrite(
            html,
            &config,
            "hello",
            &[
                image("https://cdn.test/u1.jpg", "kep0.webp"),
                image("https://cdn.test/u2.jpg", "kep1.webp"),
            ],
        );
        assert_eq!(
            rewritten,
            r#"<img src="/assets/images/blog-images/hello/kep0.webp"><img src="/assets/images/blog-images/hello/kep1.webp">"#
        );
    }

    #[test]
    fn test_rewrite_with_no_refs_is_identity() {
        let config = MigrationConfig::default();
        let html = r#"<img src="https://cdn.test/u1.jpg">"#;
        assert_eq!(rewrite(html, &config, "hello", &[]), html);
    }

    #[test]
    fn test_rewrite_duplicate_url_uses_last_slot() {
        let config = MigrationConfig::default();
        let html = r#"<img src="https://cdn.test/a.jpg"><img src="https://cdn.test/a.jpg">"#;
        let rewritten = rewrite(
            html,
            &config,
            "dup",
            &[
                image("https://cdn.test/a.jpg", "kep0.webp"),
                image("https://cdn.test/a.jpg", "kep1.webp"),
            ],
        );
        assert_eq!(rewritten.matches("/dup/kep1.webp").count(), 2);
    }

    #[test]
    fn test_rewrite_handles_entity_encoded_query_strings() {
        let config = MigrationConfig::default();
        let html = r#"<img src="https://cdn.test/a.jpg?w=1&amp;h=2">"#;
        let rewritten = rewrite(
            html,
            &config,
            "q",
            &[image("https://cdn.test/a.jpg?w=1&h=2", "kep0.webp")],
        );
        assert_eq!(
            rewritten,
            r#"<img src="/assets/images/blog-images/q/kep0.webp">"#
        );
    }
}
