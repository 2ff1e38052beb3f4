use anyhow::Result;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wpmigrate::MigrationConfig;

/// Where the mocked WordPress instance serves its REST API.
pub const API_BASE_PATH: &str = "/wp-json/wp/v2";
pub const POSTS_PATH: &str = "/wp-json/wp/v2/posts";

// --- Test Setup ---

/// A mocked WordPress site plus a scratch directory for the run's output.
pub struct TestSetup {
    pub server: MockServer,
    pub dir: TempDir,
    pub config: MigrationConfig,
}

impl TestSetup {
    /// Starts a mock server and points a fresh configuration at it.
    pub async fn new() -> Result<Self> {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let root = dir.path();

        let config = MigrationConfig {
            api_url: format!("{}{API_BASE_PATH}", server.uri()),
            site_url: server.uri(),
            posts_dir: root.join("content/blog"),
            images_dir: root.join("public/assets/images/blog-images"),
            index_file: root.join("content/blog-index.json"),
            request_timeout_secs: 5,
            asset_timeout_secs: 5,
            ..Default::default()
        };

        Ok(Self {
            server,
            dir,
            config,
        })
    }

    /// An absolute URL on the mock server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server.uri())
    }

    /// Serves `posts` as the only page of the collection.
    pub async fn mount_posts(&self, posts: &[Value]) {
        self.mount_posts_page(1, posts, Some(1)).await;
    }

    /// Serves one page of the collection, optionally with an `X-WP-TotalPages` header.
    pub async fn mount_posts_page(&self, page: u32, posts: &[Value], total_pages: Option<u32>) {
        let mut response = ResponseTemplate::new(200).set_body_json(Value::Array(posts.to_vec()));
        if let Some(total) = total_pages {
            response = response.insert_header("X-WP-TotalPages", total.to_string().as_str());
        }
        Mock::given(method("GET"))
            .and(path(POSTS_PATH))
            .and(query_param("page", page.to_string()))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Serves a small PNG at `image_path`.
    pub async fn mount_png(&self, image_path: &str) {
        Mock::given(method("GET"))
            .and(path(image_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/png")
                    .set_body_bytes(png_bytes(8, 6)),
            )
            .mount(&self.server)
            .await;
    }

    /// Answers `request_path` with a bare status code.
    pub async fn mount_status(&self, request_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// The folder a post's images are written to.
    pub fn image_folder(&self, slug: &str) -> std::path::PathBuf {
        self.config.images_dir.join(slug)
    }

    /// Reads and parses a JSON file written by the run.
    pub fn read_json(&self, file: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(file)?;
        Ok(serde_json::from_str(&content)?)
    }
}

// --- Fixtures ---

/// Encodes a `width` x `height` gradient as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 30) as u8, (y * 30) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("encoding a PNG in memory cannot fail");
    out.into_inner()
}

/// Builds a post in the shape `GET /wp/v2/posts?_embed` returns.
#[derive(Debug, Clone)]
pub struct PostBuilder {
    slug: String,
    title: String,
    excerpt: String,
    content: String,
    date: String,
    featured: Option<String>,
    author: Option<String>,
    categories: Vec<(String, String)>,
    tags: Vec<(String, String)>,
    seo: Option<Value>,
}

impl PostBuilder {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: format!("Title of {slug}"),
            excerpt: format!("<p>Excerpt of {slug}</p>\n"),
            content: String::new(),
            date: "2024-03-05T10:20:30".to_string(),
            featured: None,
            author: Some("Admin".to_string()),
            categories: Vec::new(),
            tags: Vec::new(),
            seo: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn featured(mut self, url: &str) -> Self {
        self.featured = Some(url.to_string());
        self
    }

    pub fn author(mut self, name: Option<&str>) -> Self {
        self.author = name.map(String::from);
        self
    }

    pub fn category(mut self, name: &str, slug: &str) -> Self {
        self.categories.push((name.to_string(), slug.to_string()));
        self
    }

    pub fn tag(mut self, name: &str, slug: &str) -> Self {
        self.tags.push((name.to_string(), slug.to_string()));
        self
    }

    /// Sets the raw `rank_math_seo` value.
    pub fn seo(mut self, seo: Value) -> Self {
        self.seo = Some(seo);
        self
    }

    pub fn build(self) -> Value {
        let terms = |list: &[(String, String)]| {
            list.iter()
                .map(|(name, slug)| json!({ "name": name, "slug": slug }))
                .collect::<Vec<_>>()
        };

        let mut embedded = json!({
            "wp:term": [terms(&self.categories), terms(&self.tags)],
        });
        if let Some(featured) = &self.featured {
            embedded["wp:featuredmedia"] = json!([{ "source_url": featured }]);
        }
        if let Some(author) = &self.author {
            embedded["author"] = json!([{ "name": author }]);
        }

        let mut post = json!({
            "id": 1,
            "slug": self.slug,
            "date": self.date,
            "title": { "rendered": self.title },
            "excerpt": { "rendered": self.excerpt },
            "content": { "rendered": self.content },
            "_embedded": embedded,
        });
        if let Some(seo) = self.seo {
            post["rank_math_seo"] = seo;
        }
        post
    }
}
