//! # WordPress Client
//!
//! Reads `_embed`-expanded posts from the WordPress REST API, one page per
//! request. How many pages are read is a configuration choice: the default of
//! a single page of 100 posts matches a one-shot export, `max_pages = 0` walks
//! the whole collection.

use crate::config::MigrationConfig;
use crate::constants::TOTAL_PAGES_HEADER;
use crate::errors::MigrateError;
use crate::types::Post;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

/// Builds the HTTP client shared by the API client and the image fetcher.
pub fn build_http_client(config: &MigrationConfig) -> Result<Client, MigrateError> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout())
        .build()
        .map_err(MigrateError::ClientBuild)
}

/// One page of the post collection.
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// The `X-WP-TotalPages` header, when the server sent one.
    pub total_pages: Option<u32>,
}

/// A client for the `/posts` endpoint.
#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: Client,
    posts_url: String,
    per_page: u32,
    max_pages: u32,
}

impl WordPressClient {
    pub fn new(http: Client, config: &MigrationConfig) -> Self {
        Self {
            http,
            posts_url: format!("{}/posts", config.api_url.trim_end_matches('/')),
            per_page: config.per_page,
            max_pages: config.max_pages,
        }
    }

    pub fn posts_url(&self) -> &str {
        &self.posts_url
    }

    /// Fetches a single page (1-based).
    pub async fn fetch_page(&self, page: u32) -> Result<PostPage, MigrateError> {
        debug!("Requesting page {page} from {}", self.posts_url);
        let response = self
            .http
            .get(&self.posts_url)
            .query(&[
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
                ("_embed", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|source| MigrateError::FetchPosts {
                url: self.posts_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MigrateError::ApiStatus {
                url: self.posts_url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());

        let body = response
            .text()
            .await
            .map_err(|source| MigrateError::FetchPosts {
                url: self.posts_url.clone(),
                source,
            })?;
        let posts: Vec<Post> =
            serde_json::from_str(&body).map_err(|source| MigrateError::ParsePosts {
                url: self.posts_url.clone(),
                source,
            })?;

        Ok(PostPage { posts, total_pages })
    }

    /// Fetches pages until the collection or the configured page budget is exhausted.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>, MigrateError> {
        let mut posts = Vec::new();
        let mut page = 1;
        loop {
            let PostPage {
                posts: batch,
                total_pages,
            } = match self.fetch_page(page).await {
                Ok(batch) => batch,
                // WordPress answers 400 (rest_post_invalid_page_number) past the last page.
                Err(MigrateError::ApiStatus { status, .. })
                    if page > 1 && status == StatusCode::BAD_REQUEST.as_u16() =>
                {
                    debug!("Page {page} is past the end of the collection");
                    break;
                }
                Err(e) => return Err(e),
            };

            let count = batch.len();
            posts.extend(batch);
            info!("Fetched page {page}: {count} post(s)");

            let last_by_header = total_pages.is_some_and(|total| page >= total);
            let budget_spent = self.max_pages != 0 && page >= self.max_pages;
            if count == 0 || count < self.per_page as usize || last_by_header || budget_spent {
                break;
            }
            page += 1;
        }
        Ok(posts)
    }
}
