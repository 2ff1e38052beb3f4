//! # Shared Constants
//!
//! This module provides a centralized location for the file names, paths and
//! defaults that both the migration pipeline and its tests rely on. Using these
//! constants helps to avoid "magic strings" and ensures consistency.

/// File name of the localized featured (cover) image inside a post's image folder.
pub const COVER_IMAGE_FILE: &str = "boritokep.webp";

/// File name of the localized Open Graph image.
pub const OG_IMAGE_FILE: &str = "ogimage.webp";

/// File name of the localized Twitter card image.
pub const TWITTER_IMAGE_FILE: &str = "twitter.webp";

/// Stem of positionally named content images (`kep0.webp`, `kep1.webp`, ...).
pub const CONTENT_IMAGE_STEM: &str = "kep";

/// Extension of every image written by the pipeline.
pub const IMAGE_EXTENSION: &str = "webp";

/// The default WordPress REST API base.
pub const DEFAULT_API_URL: &str = "https://your-site.com/wp-json/wp/v2";

/// The default public site URL used to build canonical links.
pub const DEFAULT_SITE_URL: &str = "https://your-site.com";

/// The default directory for migrated post files.
pub const DEFAULT_POSTS_DIR: &str = "./src/content/posts/";

/// The default directory for per-post image folders.
pub const DEFAULT_IMAGES_DIR: &str = "./src/assets/images/blog-images/";

/// The default path of the aggregated index file.
pub const DEFAULT_INDEX_FILE: &str = "./src/content/posts/index.json";

/// The site-relative prefix under which localized images are served.
pub const DEFAULT_ASSET_URL_PREFIX: &str = "/assets/images/blog-images";

/// WordPress refuses `per_page` values above this.
pub const MAX_PER_PAGE: u32 = 100;

/// The response header WordPress uses to report the number of pages.
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// The configuration file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "wpmigrate.yml";

/// The prefix for environment variable overrides (`WPMIGRATE_API_URL`, ...).
pub const ENV_PREFIX: &str = "WPMIGRATE";
