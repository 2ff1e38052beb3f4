use super::PostEncoder;
use crate::errors::MigrateError;
use crate::types::{PostRecord, SeoBlock, Term};
use serde::Serialize;

/// Writes each post as a pretty-printed JSON record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPost<'a> {
    slug: &'a str,
    title: &'a str,
    excerpt: &'a str,
    content: &'a str,
    date: &'a str,
    cover_image: Option<&'a str>,
    categories: &'a [Term],
    tags: &'a [Term],
    seo: &'a SeoBlock,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonIndexEntry<'a> {
    slug: &'a str,
    title: &'a str,
    excerpt: &'a str,
    date: &'a str,
    cover_image: Option<&'a str>,
    categories: &'a [Term],
    tags: &'a [Term],
}

impl PostEncoder for JsonEncoder {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn excerpt(&self, excerpt_html: &str) -> String {
        excerpt_html.to_string()
    }

    fn encode(&self, record: &PostRecord) -> Result<String, MigrateError> {
        let post = JsonPost {
            slug: &record.slug,
            title: &record.title,
            excerpt: &record.excerpt_html,
            content: &record.content_html,
            date: &record.date,
            cover_image: record.cover_image.as_deref(),
            categories: &record.categories,
            tags: &record.tags,
            seo: &record.seo,
        };
        Ok(serde_json::to_string_pretty(&post)?)
    }

    fn index_entry(&self, record: &PostRecord) -> Result<serde_json::Value, MigrateError> {
        let entry = JsonIndexEntry {
            slug: &record.slug,
            title: &record.title,
            excerpt: &record.excerpt_html,
            date: &record.date,
            cover_image: record.cover_image.as_deref(),
            categories: &record.categories,
            tags: &record.tags,
        };
        Ok(serde_json::to_value(entry)?)
    }
}
