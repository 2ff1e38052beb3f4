use super::PostEncoder;
use crate::errors::MigrateError;
use crate::types::{PostRecord, SeoBlock, Term};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use wpmigrate_html::{html_to_markdown, strip_html};

/// Writes each post as Markdown with a YAML frontmatter header.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownEncoder;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Frontmatter<'a> {
    title: &'a str,
    slug: &'a str,
    pub_date: String,
    description: String,
    author: &'a str,
    cover_image: Option<&'a str>,
    categories: Vec<&'a str>,
    tags: Vec<&'a str>,
    excerpt: String,
    seo: &'a SeoBlock,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MarkdownIndexEntry<'a> {
    slug: &'a str,
    title: &'a str,
    excerpt: String,
    pub_date: String,
    author: &'a str,
    cover_image: Option<&'a str>,
    categories: Vec<&'a str>,
    tags: Vec<&'a str>,
}

fn names(terms: &[Term]) -> Vec<&str> {
    terms.iter().map(|t| t.name.as_str()).collect()
}

/// Reduces a WordPress timestamp to `YYYY-MM-DD`.
///
/// Timestamps with an offset are converted to UTC first; naive timestamps
/// keep their calendar date. Unparsable input falls back to the text before `T`.
pub fn pub_date(date: &str) -> String {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return parsed.with_timezone(&Utc).date_naive().to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S") {
        return parsed.date().to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.to_string();
    }
    date.split('T').next().unwrap_or_default().to_string()
}

/// Joins a YAML header and a body the way frontmatter tooling expects.
pub fn render_frontmatter<T: Serialize>(data: &T, body: &str) -> Result<String, MigrateError> {
    let yaml = serde_yaml::to_string(data)?;
    let yaml = yaml.strip_prefix("---\n").unwrap_or(&yaml);
    Ok(format!("---\n{yaml}---\n{}\n", body.trim_end()))
}

impl PostEncoder for MarkdownEncoder {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn excerpt(&self, excerpt_html: &str) -> String {
        strip_html(excerpt_html)
    }

    fn encode(&self, record: &PostRecord) -> Result<String, MigrateError> {
        let excerpt = self.excerpt(&record.excerpt_html);
        let description = if excerpt.is_empty() {
            record.title.clone()
        } else {
            excerpt.clone()
        };
        let frontmatter = Frontmatter {
            title: &record.title,
            slug: &record.slug,
            pub_date: pub_date(&record.date),
            description,
            author: &record.author,
            cover_image: record.cover_image.as_deref(),
            categories: names(&record.categories),
            tags: names(&record.tags),
            excerpt,
            seo: &record.seo,
        };
        let body = html_to_markdown(&record.content_html);
        render_frontmatter(&frontmatter, &body)
    }

    fn index_entry(&self, record: &PostRecord) -> Result<serde_json::Value, MigrateError> {
        let entry = MarkdownIndexEntry {
            slug: &record.slug,
            title: &record.title,
            excerpt: self.excerpt(&record.excerpt_html),
            pub_date: pub_date(&record.date),
            author: &record.author,
            cover_image: record.cover_image.as_deref(),
            categories: names(&record.categories),
            tags: names(&record.tags),
        };
        Ok(serde_json::to_value(entry)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PostRecord {
        PostRecord {
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            excerpt_html: "<p>Short intro</p>\n".to_string(),
            content_html: r#"<p>Body with <a href="https://example.com">link</a></p>"#.to_string(),
            date: "2024-03-01T23:30:00".to_string(),
            author: "Anna".to_string(),
            cover_image: Some("/assets/images/blog-images/hello/boritokep.webp".to_string()),
            categories: vec![Term {
                name: "News".to_string(),
                slug: "news".to_string(),
            }],
            tags: vec![Term {
                name: "Rust".to_string(),
                slug: "rust".to_string(),
            }],
            seo: SeoBlock {
                title: "Hello".to_string(),
                canonical: "https://site.test/hello/".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_pub_date_variants() {
        assert_eq!(pub_date("2024-03-01T23:30:00"), "2024-03-01");
        assert_eq!(pub_date("2024-03-01T23:30:00+02:00"), "2024-03-01");
        assert_eq!(pub_date("2024-03-01T01:30:00+02:00"), "2024-02-29");
        assert_eq!(pub_date("2024-03-01"), "2024-03-01");
        assert_eq!(pub_date("garbageTmore"), "garbage");
    }

    #[test]
    fn test_encode_writes_frontmatter_and_markdown_body() {
        let encoded = MarkdownEncoder.encode(&record()).unwrap();

        assert!(encoded.starts_with("---\n"));
        let (header, body) = encoded[4..].split_once("---\n").unwrap();
        let frontmatter: serde_yaml::Value = serde_yaml::from_str(header).unwrap();

        assert_eq!(frontmatter["title"], "Hello");
        assert_eq!(frontmatter["pubDate"], "2024-03-01");
        assert_eq!(frontmatter["description"], "Short intro");
        assert_eq!(frontmatter["excerpt"], "Short intro");
        assert_eq!(frontmatter["author"], "Anna");
        assert_eq!(
            frontmatter["coverImage"],
            "/assets/images/blog-images/hello/boritokep.webp"
        );
        assert_eq!(frontmatter["categories"][0], "News");
        assert_eq!(frontmatter["tags"][0], "Rust");
        assert_eq!(frontmatter["seo"]["canonical"], "https://site.test/hello/");
        assert!(body.contains("[link](https://example.com)"));
        assert!(!body.contains("<p>"));
    }

    #[test]
    fn test_description_falls_back_to_title() {
        let mut record = record();
        record.excerpt_html = String::new();
        let encoded = MarkdownEncoder.encode(&record).unwrap();
        let header = encoded[4..].split_once("---\n").unwrap().0;
        let frontmatter: serde_yaml::Value = serde_yaml::from_str(header).unwrap();
        assert_eq!(frontmatter["description"], "Hello");
        assert_eq!(frontmatter["excerpt"], "");
    }

    #[test]
    fn test_index_entry_has_pub_date_and_term_names() {
        let entry = MarkdownEncoder.index_entry(&record()).unwrap();
        assert_eq!(entry["pubDate"], "2024-03-01");
        assert_eq!(entry["excerpt"], "Short intro");
        assert_eq!(entry["categories"], serde_json::json!(["News"]));
        assert!(entry.get("content").is_none());
        assert!(entry.get("date").is_none());
    }
}
