//! # Output Strategies
//!
//! The transformer produces one format-independent [`PostRecord`] per post.
//! A [`PostEncoder`] decides how that record is written to disk and how it is
//! summarized in the index. Two encoders exist, selected by [`OutputFormat`]:
//!
//! | Format | Post file | Excerpt used for SEO fallback |
//! |--------|-----------|-------------------------------|
//! | `json` | `<slug>.json`, pretty-printed record | raw excerpt HTML |
//! | `markdown` | `<slug>.md`, YAML frontmatter + Markdown body | tag-stripped excerpt |

pub mod json;
pub mod markdown;

pub use json::JsonEncoder;
pub use markdown::MarkdownEncoder;

use crate::errors::MigrateError;
use crate::types::PostRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The contract every output format implements.
pub trait PostEncoder: Send + Sync {
    /// File extension of post files, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders the excerpt the way this format presents it. Also used as the
    /// SEO description fallback.
    fn excerpt(&self, excerpt_html: &str) -> String;

    /// Renders the full post file.
    fn encode(&self, record: &PostRecord) -> Result<String, MigrateError>;

    /// Projects the record onto its index entry (no body content).
    fn index_entry(&self, record: &PostRecord) -> Result<serde_json::Value, MigrateError>;

    /// The post file name for a slug.
    fn file_name(&self, slug: &str) -> String {
        format!("{slug}.{}", self.extension())
    }
}

/// The configured output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    #[serde(alias = "md")]
    Markdown,
}

impl OutputFormat {
    /// Instantiates the encoder for this format.
    pub fn encoder(&self) -> Box<dyn PostEncoder> {
        match self {
            OutputFormat::Json => Box::new(JsonEncoder),
            OutputFormat::Markdown => Box::new(MarkdownEncoder),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!(
                "unknown output format '{other}' (expected 'json' or 'markdown')"
            )),
        }
    }
}
