//! # wpmigrate-html: HTML helpers for post content
//!
//! Small, synchronous utilities used by the migration pipeline to inspect and
//! rewrite the rendered HTML bodies returned by WordPress:
//!
//! - [`scan_images`] / [`extract_image_urls`] find embedded image sources.
//! - [`replace_urls`] swaps remote URLs for local ones in a single pass.
//! - [`strip_html`] and [`html_to_markdown`] produce plain-text and Markdown
//!   renditions for frontmatter and document bodies.

use regex::{Captures, Regex, RegexBuilder};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("`img` is a valid selector"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is a valid regex"));

/// The result of scanning a post body for images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageScan {
    /// Image `src` values in document order. Repeated URLs are kept.
    pub urls: Vec<String>,
    /// Messages reported by the HTML parser while recovering from malformed markup.
    pub anomalies: Vec<String>,
}

/// Parses `html` as a fragment and collects every non-empty `img[src]`.
///
/// Parsing never fails: html5ever recovers from broken markup the same way a
/// browser would, and anything it had to repair is listed in
/// [`ImageScan::anomalies`].
pub fn scan_images(html: &str) -> ImageScan {
    let fragment = Html::parse_fragment(html);

    let urls = fragment
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();

    let anomalies = fragment
        .errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>();

    debug!(
        "Scanned {} bytes of HTML: {} image(s), {} parse anomalies",
        html.len(),
        urls.len(),
        anomalies.len()
    );

    ImageScan { urls, anomalies }
}

/// Returns the `src` of every `img` element in `html`, in document order.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    scan_images(html).urls
}

/// Replaces every literal occurrence of each key of `replacements` with its value.
///
/// The scan is a single left-to-right pass and, at each position, the longest
/// matching key wins. A URL that is a prefix or substring of another URL can
/// therefore never corrupt the longer one, and replaced text is never
/// rescanned. Replacement is purely textual: a URL that also appears in
/// running text is rewritten as well.
pub fn replace_urls(html: &str, replacements: &HashMap<String, String>) -> String {
    let mut keys = replacements
        .keys()
        .filter(|key| !key.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>();
    if keys.is_empty() {
        return html.to_string();
    }
    // Regex alternation is leftmost-first, so ordering by length makes it longest-first.
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&pattern)
        .size_limit(64 * (1 << 20))
        .build()
    {
        Ok(re) => re
            .replace_all(html, |caps: &Captures| {
                let found = &caps[0];
                replacements
                    .get(found)
                    .cloned()
                    .unwrap_or_else(|| found.to_string())
            })
            .into_owned(),
        Err(e) => {
            debug!("URL pattern too large for a single regex ({e}); replacing sequentially");
            replace_sequentially(html, &keys, replacements)
        }
    }
}

/// Fallback for very large replacement sets: longest keys first, one key at a time.
///
/// Each pass splits on already-replaced regions so later, shorter keys cannot
/// touch text produced by an earlier replacement.
fn replace_sequentially(
    html: &str,
    keys: &[&str],
    replacements: &HashMap<String, String>,
) -> String {
    // (text, already_replaced)
    let mut segments: Vec<(String, bool)> = vec![(html.to_string(), false)];
    for key in keys {
        let value = &replacements[*key];
        let mut next = Vec::with_capacity(segments.len());
        for (text, done) in segments {
            if done || !text.contains(key) {
                next.push((text, done));
                continue;
            }
            let mut parts = text.split(key).peekable();
            while let Some(part) = parts.next() {
                if !part.is_empty() {
                    next.push((part.to_string(), false));
                }
                if parts.peek().is_some() {
                    next.push((value.clone(), true));
                }
            }
        }
        segments = next;
    }
    segments.into_iter().map(|(text, _)| text).collect()
}

/// Removes anything that looks like a tag and trims the result.
///
/// Entities are left untouched.
pub fn strip_html(html: &str) -> String {
    TAG_RE.replace_all(html, "").trim().to_string()
}

/// Converts an HTML fragment into Markdown.
pub fn html_to_markdown(html: &str) -> String {
    html2md::parse_html(html)
}
