//! # Image Fetcher / Transcoder
//!
//! Downloads a remote image and re-encodes it as WebP at a deterministic local
//! path. One attempt per call, bounded by the configured asset timeout; the
//! caller decides what a failure means for its image slot.

use crate::errors::AssetError;
use image::ImageFormat;
use reqwest::Client;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Resolves an image source against the site base.
///
/// Absolute URLs are used as-is; relative and protocol-relative sources are
/// joined onto `base`.
pub fn resolve_image_url(src: &str, base: &Url) -> Result<Url, AssetError> {
    let src = src.trim();
    match Url::parse(src) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.join(src).map_err(|source| AssetError::InvalidUrl {
                url: src.to_string(),
                source,
            })
        }
        Err(source) => Err(AssetError::InvalidUrl {
            url: src.to_string(),
            source,
        }),
    }
}

/// Decodes any supported image and re-encodes it as WebP in memory.
pub fn encode_webp(bytes: &[u8], url: &str) -> Result<Vec<u8>, AssetError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Transcode {
        url: url.to_string(),
        source,
    })?;
    // The WebP encoder only accepts 8-bit RGB(A).
    let rgba = image::DynamicImage::ImageRgba8(decoded.to_rgba8());

    let mut encoded = Cursor::new(Vec::new());
    rgba.write_to(&mut encoded, ImageFormat::WebP)
        .map_err(|source| AssetError::Transcode {
            url: url.to_string(),
            source,
        })?;
    Ok(encoded.into_inner())
}

/// Downloads images over a shared HTTP client and stores them as WebP.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: Client,
    timeout: Duration,
}

impl ImageFetcher {
    pub fn new(http: Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Fetches `url` and writes it to `dest` as WebP, replacing an existing file.
    ///
    /// Fails with [`AssetError::Fetch`] / [`AssetError::Status`] when the
    /// download fails, [`AssetError::Transcode`] when the payload is not a
    /// decodable image, and [`AssetError::Timeout`] when downloading and
    /// encoding exceed the configured asset timeout. The file is only written
    /// after that, so a timed-out or cancelled slot never leaves an image behind.
    pub async fn fetch_and_transcode(&self, url: &Url, dest: &Path) -> Result<(), AssetError> {
        let encoded = match tokio::time::timeout(self.timeout, self.download_and_encode(url)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AssetError::Timeout {
                    url: url.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        tokio::fs::write(dest, encoded)
            .await
            .map_err(|source| AssetError::Write {
                path: dest.to_path_buf(),
                source,
            })
    }

    async fn download_and_encode(&self, url: &Url) -> Result<Vec<u8>, AssetError> {
        debug!("Downloading image {url}");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| AssetError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|source| AssetError::Fetch {
            url: url.to_string(),
            source,
        })?;

        // An abandoned encode only produces bytes that are dropped.
        let url = url.to_string();
        tokio::task::spawn_blocking(move || encode_webp(&bytes, &url)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image_url() {
        let base = Url::parse("https://site.test/blog/").unwrap();

        assert_eq!(
            resolve_image_url("https://cdn.test/a.jpg", &base).unwrap().as_str(),
            "https://cdn.test/a.jpg"
        );
        assert_eq!(
            resolve_image_url("/wp-content/a.jpg", &base).unwrap().as_str(),
            "https://site.test/wp-content/a.jpg"
        );
        assert_eq!(
            resolve_image_url("//cdn.test/b.png", &base).unwrap().as_str(),
            "https://cdn.test/b.png"
        );
        assert!(matches!(
            resolve_image_url("http://[broken", &base),
            Err(AssetError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_non_image_payload() {
        let result = encode_webp(b"<html>not an image</html>", "https://x.test/a");
        assert!(matches!(result, Err(AssetError::Transcode { .. })));
    }

    #[test]
    fn test_encode_produces_webp() {
        let png = wpmigrate_test_utils::png_bytes(4, 3);

        let encoded = encode_webp(&png, "https://x.test/a.png").unwrap();

        assert_eq!(image::guess_format(&encoded).unwrap(), ImageFormat::WebP);
        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }
}
