//! # Post Transformer
//!
//! Turns one WordPress [`Post`] into a [`PostRecord`], localizing every image
//! it references on the way. The steps run in a fixed order because later
//! ones depend on the files and paths produced by earlier ones:
//!
//! 1. create the post's image folder;
//! 2. localize the featured image (`boritokep.webp`);
//! 3. localize body images in document order (`kep0.webp`, `kep1.webp`, ...);
//! 4. rewrite the body to the localized paths;
//! 5. collect categories and tags;
//! 6. resolve the SEO block, localizing OG and Twitter images;
//! 7. assemble the record.
//!
//! A failed image only empties its own slot. The only error that escapes is
//! failing to create the image folder.

use crate::assets::{rewrite, AssetLocalizer};
use crate::config::MigrationConfig;
use crate::errors::MigrateError;
use crate::images::ImageFetcher;
use crate::output::PostEncoder;
use crate::report::AssetFailure;
use crate::seo::resolve_seo;
use crate::types::{ImageRef, ImageRole, Post, PostRecord};
use tracing::debug;
use url::Url;
use wpmigrate_html::scan_images;

/// A transformed post plus what went wrong while building it.
#[derive(Debug, Clone)]
pub struct TransformedPost {
    pub record: PostRecord,
    pub failures: Vec<AssetFailure>,
    pub html_anomalies: usize,
}

/// Transforms posts for one run.
pub struct PostTransformer<'a> {
    config: &'a MigrationConfig,
    fetcher: &'a ImageFetcher,
    encoder: &'a dyn PostEncoder,
    base: &'a Url,
}

impl<'a> PostTransformer<'a> {
    pub fn new(
        config: &'a MigrationConfig,
        fetcher: &'a ImageFetcher,
        encoder: &'a dyn PostEncoder,
        base: &'a Url,
    ) -> Self {
        Self {
            config,
            fetcher,
            encoder,
            base,
        }
    }

    pub async fn transform(&self, post: &Post) -> Result<TransformedPost, MigrateError> {
        let slug = post.slug.as_str();
        let localizer = AssetLocalizer::new(self.fetcher, self.config, self.base, slug);
        let mut failures = Vec::new();

        tokio::fs::create_dir_all(localizer.folder())
            .await
            .map_err(|e| MigrateError::io(localizer.folder(), e))?;

        let featured = post.featured_image_url();
        let cover_image = match featured {
            Some(url) => match localizer.localize(ImageRole::Cover, url).await {
                Ok(local) => Some(local),
                Err(failure) => {
                    failures.push(failure);
                    None
                }
            },
            None => None,
        };

        let scan = scan_images(&post.content.rendered);
        for anomaly in &scan.anomalies {
            debug!("HTML anomaly in '{slug}': {anomaly}");
        }
        let mut localized = Vec::with_capacity(scan.urls.len());
        for (index, src) in scan.urls.iter().enumerate() {
            let role = ImageRole::Content(index);
            match localizer.localize(role, src).await {
                Ok(_) => localized.push(ImageRef {
                    remote_url: src.clone(),
                    local_file_name: role.file_name(),
                }),
                Err(failure) => failures.push(failure),
            }
        }

        let content_html = rewrite(&post.content.rendered, self.config, slug, &localized);

        let categories = post.categories();
        let tags = post.tags();

        let excerpt = self.encoder.excerpt(&post.excerpt.rendered);
        let (seo, seo_failures) = resolve_seo(
            post,
            featured,
            &excerpt,
            &self.config.default_canonical(slug),
            &localizer,
        )
        .await;
        failures.extend(seo_failures);

        let record = PostRecord {
            slug: slug.to_string(),
            title: post.title.rendered.clone(),
            excerpt_html: post.excerpt.rendered.clone(),
            content_html,
            date: post.date.clone(),
            author: post.author_name().to_string(),
            cover_image,
            categories,
            tags,
            seo,
        };

        Ok(TransformedPost {
            record,
            failures,
            html_anomalies: scan.anomalies.len(),
        })
    }
}
