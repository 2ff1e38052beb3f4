//! # SEO Resolver
//!
//! Derives the [`SeoBlock`] of a post from its Rank Math data with these
//! fallbacks (empty strings count as missing; whitespace-only values are kept):
//!
//! | Field | Source order |
//! |-------|--------------|
//! | `title` | SEO title → post title |
//! | `description` | SEO description → excerpt as rendered by the output format |
//! | `og_image` / `twitter_image` | SEO value → featured image → empty |
//! | `robots` | SEO value → empty |
//! | `canonical` | SEO value → `<site_url>/<slug>/`, always ending in `/` |
//!
//! Social images are localized; a failed download clears the field.

use crate::assets::AssetLocalizer;
use crate::report::AssetFailure;
use crate::types::{ImageRole, Post, RankMathSeo, SeoBlock};

/// Returns the value when it is present and not empty.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Appends a trailing slash unless one is already there.
pub fn normalize_canonical(canonical: &str) -> String {
    if canonical.ends_with('/') {
        canonical.to_string()
    } else {
        format!("{canonical}/")
    }
}

/// The SEO fields before social images are localized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoSources {
    pub title: String,
    pub description: String,
    /// Remote OG image to localize, if any.
    pub og_image: Option<String>,
    /// Remote Twitter image to localize, if any.
    pub twitter_image: Option<String>,
    pub robots: String,
    pub canonical: String,
}

/// Applies the fallback chain to everything except image localization.
///
/// `excerpt` is the post excerpt as the output format renders it, so the
/// JSON variant falls back to raw HTML and the Markdown variant to plain text.
pub fn resolve_sources(
    post: &Post,
    featured_url: Option<&str>,
    excerpt: &str,
    default_canonical: &str,
) -> SeoSources {
    let empty = RankMathSeo::default();
    let seo = post.rank_math_seo.as_ref().unwrap_or(&empty);
    let featured_url = non_empty(featured_url);

    let title = non_empty(seo.title.as_deref()).unwrap_or(&post.title.rendered);
    let description = non_empty(seo.description.as_deref()).unwrap_or(excerpt);
    let og_image = non_empty(seo.og_image.as_deref()).or(featured_url);
    let twitter_image = non_empty(seo.twitter_image.as_deref()).or(featured_url);
    let robots = non_empty(seo.robots.as_deref()).unwrap_or_default();
    let canonical = non_empty(seo.canonical.as_deref()).unwrap_or(default_canonical);

    SeoSources {
        title: title.to_string(),
        description: description.to_string(),
        og_image: og_image.map(String::from),
        twitter_image: twitter_image.map(String::from),
        robots: robots.to_string(),
        canonical: normalize_canonical(canonical),
    }
}

/// Resolves the full SEO block, downloading the OG and Twitter images.
///
/// Each social image that fails to download is cleared to an empty string
/// and reported, never left pointing at the remote URL.
pub async fn resolve_seo(
    post: &Post,
    featured_url: Option<&str>,
    excerpt: &str,
    default_canonical: &str,
    localizer: &AssetLocalizer<'_>,
) -> (SeoBlock, Vec<AssetFailure>) {
    let sources = resolve_sources(post, featured_url, excerpt, default_canonical);
    let mut failures = Vec::new();

    let og_image =
        localize_or_clear(localizer, ImageRole::OpenGraph, sources.og_image, &mut failures).await;
    let twitter_image =
        localize_or_clear(localizer, ImageRole::Twitter, sources.twitter_image, &mut failures)
            .await;

    let block = SeoBlock {
        title: sources.title,
        description: sources.description,
        og_image,
        twitter_image,
        robots: sources.robots,
        canonical: sources.canonical,
    };
    (block, failures)
}

async fn localize_or_clear(
    localizer: &AssetLocalizer<'_>,
    role: ImageRole,
    remote: Option<String>,
    failures: &mut Vec<AssetFailure>,
) -> String {
    let Some(remote) = remote else {
        return String::new();
    };
    match localizer.localize(role, &remote).await {
        Ok(local) => local,
        Err(failure) => {
            failures.push(failure);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use crate::types::Rendered;

    fn post(seo: Option<RankMathSeo>) -> Post {
        Post {
            slug: "x".to_string(),
            title: Rendered::from("Post title"),
            excerpt: Rendered::from("<p>Hello</p>"),
            rank_math_seo: seo,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_canonical() {
        assert_eq!(normalize_canonical("https://site/x"), "https://site/x/");
        assert_eq!(normalize_canonical("https://site/x/"), "https://site/x/");
    }

    #[test]
    fn test_description_fallback_follows_output_format() {
        let post = post(None);
        for (format, expected) in [
            (OutputFormat::Json, "<p>Hello</p>"),
            (OutputFormat::Markdown, "Hello"),
        ] {
            let excerpt = format.encoder().excerpt(&post.excerpt.rendered);
            let sources = resolve_sources(&post, None, &excerpt, "https://site/x/");
            assert_eq!(sources.description, expected, "format {format}");
        }
    }

    #[test]
    fn test_fallbacks_without_seo_block() {
        let sources = resolve_sources(
            &post(None),
            Some("https://cdn.test/cover.jpg"),
            "excerpt",
            "https://site/x/",
        );
        assert_eq!(sources.title, "Post title");
        assert_eq!(sources.og_image.as_deref(), Some("https://cdn.test/cover.jpg"));
        assert_eq!(
            sources.twitter_image.as_deref(),
            Some("https://cdn.test/cover.jpg")
        );
        assert_eq!(sources.robots, "");
        assert_eq!(sources.canonical, "https://site/x/");
    }

    #[test]
    fn test_seo_block_values_win_and_empty_strings_fall_through() {
        let seo = RankMathSeo {
            title: Some("SEO title".to_string()),
            description: Some(String::new()),
            og_image: Some("https://cdn.test/og.jpg".to_string()),
            twitter_image: None,
            robots: Some("index, follow".to_string()),
            canonical: Some("https://site/custom".to_string()),
        };
        let sources = resolve_sources(&post(Some(seo)), None, "excerpt", "https://site/x/");

        assert_eq!(sources.title, "SEO title");
        assert_eq!(sources.description, "excerpt");
        assert_eq!(sources.og_image.as_deref(), Some("https://cdn.test/og.jpg"));
        assert_eq!(sources.twitter_image, None);
        assert_eq!(sources.robots, "index, follow");
        assert_eq!(sources.canonical, "https://site/custom/");
    }

    #[test]
    fn test_whitespace_only_seo_values_are_kept() {
        let seo = RankMathSeo {
            title: Some("  ".to_string()),
            robots: Some(" ".to_string()),
            ..Default::default()
        };
        let sources = resolve_sources(&post(Some(seo)), None, "excerpt", "https://site/x/");

        assert_eq!(sources.title, "  ");
        assert_eq!(sources.robots, " ");
    }
}
