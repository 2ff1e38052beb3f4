//! # Data Model
//!
//! Types for the WordPress posts consumed by the pipeline and the normalized
//! records it produces. The inbound types mirror the REST API's `_embed`
//! shape and deserialize leniently: anything optional in practice is optional
//! here, so one odd post cannot fail the whole post list.

use crate::constants::{
    CONTENT_IMAGE_STEM, COVER_IMAGE_FILE, IMAGE_EXTENSION, OG_IMAGE_FILE, TWITTER_IMAGE_FILE,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A WordPress `{ "rendered": "..." }` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl From<&str> for Rendered {
    fn from(value: &str) -> Self {
        Self {
            rendered: value.to_string(),
        }
    }
}

/// A post as returned by `GET /wp/v2/posts?_embed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    /// ISO-8601 publication date in the site's timezone.
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "_embedded")]
    pub embedded: Option<Embedded>,
    /// The Rank Math SEO block, when the plugin exposes one.
    #[serde(default, deserialize_with = "object_or_none")]
    pub rank_math_seo: Option<RankMathSeo>,
}

impl Post {
    /// The `source_url` of the first embedded featured media item, if any.
    pub fn featured_image_url(&self) -> Option<&str> {
        self.embedded
            .as_ref()?
            .featured_media
            .first()?
            .source_url
            .as_deref()
            .filter(|url| !url.is_empty())
    }

    /// The display name of the first embedded author, or an empty string.
    pub fn author_name(&self) -> &str {
        self.embedded
            .as_ref()
            .and_then(|e| e.author.first())
            .and_then(|a| a.name.as_deref())
            .unwrap_or_default()
    }

    /// Categories live at position 0 of the embedded term lists.
    pub fn categories(&self) -> Vec<Term> {
        self.terms_at(0)
    }

    /// Tags live at position 1 of the embedded term lists.
    pub fn tags(&self) -> Vec<Term> {
        self.terms_at(1)
    }

    fn terms_at(&self, position: usize) -> Vec<Term> {
        self.embedded
            .as_ref()
            .and_then(|e| e.terms.get(position))
            .cloned()
            .unwrap_or_default()
    }
}

/// The `_embedded` block of a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Embedded {
    #[serde(default, rename = "wp:featuredmedia")]
    pub featured_media: Vec<FeaturedMedia>,
    #[serde(default)]
    pub author: Vec<Author>,
    /// Parallel term lists: index 0 holds categories, index 1 holds tags.
    #[serde(default, rename = "wp:term")]
    pub terms: Vec<Vec<Term>>,
}

/// An embedded media item. Error objects (e.g. `rest_forbidden`) have no `source_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedMedia {
    #[serde(default)]
    pub source_url: Option<String>,
}

/// An embedded author. Error objects have no `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
}

/// A category or tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// The Rank Math SEO fields the migration cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankMathSeo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub twitter_image: Option<String>,
    #[serde(default)]
    pub robots: Option<String>,
    #[serde(default)]
    pub canonical: Option<String>,
}

/// PHP serializes an empty associative array as `[]`; treat anything that is
/// not an object as "no SEO block".
fn object_or_none<'de, D>(deserializer: D) -> Result<Option<RankMathSeo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        Some(v @ serde_json::Value::Object(_)) => {
            RankMathSeo::deserialize(v).map(Some).map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

/// The resolved SEO fields written to every output record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoBlock {
    pub title: String,
    pub description: String,
    pub og_image: String,
    pub twitter_image: String,
    pub robots: String,
    /// Always ends with `/`.
    pub canonical: String,
}

/// The slot an image occupies in a post's image folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    Cover,
    /// A body image, numbered by discovery order starting at zero.
    Content(usize),
    OpenGraph,
    Twitter,
}

impl ImageRole {
    /// The deterministic local file name for this slot.
    pub fn file_name(&self) -> String {
        match self {
            ImageRole::Cover => COVER_IMAGE_FILE.to_string(),
            ImageRole::Content(index) => {
                format!("{CONTENT_IMAGE_STEM}{index}.{IMAGE_EXTENSION}")
            }
            ImageRole::OpenGraph => OG_IMAGE_FILE.to_string(),
            ImageRole::Twitter => TWITTER_IMAGE_FILE.to_string(),
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Cover => write!(f, "cover image"),
            ImageRole::Content(index) => write!(f, "content image #{index}"),
            ImageRole::OpenGraph => write!(f, "OG image"),
            ImageRole::Twitter => write!(f, "Twitter image"),
        }
    }
}

/// A successfully localized image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// The source string exactly as it appeared in the post.
    pub remote_url: String,
    pub local_file_name: String,
}

/// A post after transformation, independent of the output format.
///
/// Encoders decide which fields to emit and how to render them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    /// The excerpt HTML as served by WordPress.
    pub excerpt_html: String,
    /// The body HTML with localized image paths.
    pub content_html: String,
    pub date: String,
    pub author: String,
    /// Site-relative path of the cover image, when it was localized.
    pub cover_image: Option<String>,
    pub categories: Vec<Term>,
    pub tags: Vec<Term>,
    pub seo: SeoBlock,
}
