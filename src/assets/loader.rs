use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::{
    assets::decode::{PreparedImage, decode_image, looks_like_svg, parse_svg, rasterize_svg},
    foundation::{
        core::Resolution,
        error::{FrameError, FrameResult},
    },
};

const FETCH_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Where an artwork or photo URI points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    /// `http://` or `https://` URL.
    Remote(String),
    /// Local file, already resolved against the loader root.
    File(PathBuf),
}

/// Fetches and decodes frame artwork and photos.
///
/// Remote fetches are anonymous: no cookies or credentials are attached, so everything that
/// reaches the compositor can be exported.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    root: PathBuf,
    http: reqwest::Client,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> FrameResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("build http client")?;
        Ok(Self {
            root: root.into(),
            http,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, uri: &str) -> AssetSource {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return AssetSource::Remote(uri.to_string());
        }
        let path = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
        if path.is_absolute() {
            AssetSource::File(path.to_path_buf())
        } else {
            AssetSource::File(self.root.join(path))
        }
    }

    pub async fn fetch_bytes(&self, uri: &str) -> FrameResult<Vec<u8>> {
        match self.resolve(uri) {
            AssetSource::Remote(url) => {
                let resp = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| FrameError::load(format!("fetch '{url}': {e}")))?;
                let resp = resp
                    .error_for_status()
                    .map_err(|e| FrameError::load(format!("fetch '{url}': {e}")))?;
                let bytes = resp
                    .bytes()
                    .await
                    .map_err(|e| FrameError::load(format!("read body of '{url}': {e}")))?;
                Ok(bytes.to_vec())
            }
            AssetSource::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| FrameError::load(format!("read '{}': {e}", path.display()))),
        }
    }

    /// Load frame artwork. SVG artwork is rasterized at the surface resolution.
    #[tracing::instrument(skip(self))]
    pub async fn load_frame(&self, uri: &str, size: Resolution) -> FrameResult<PreparedImage> {
        let bytes = self.fetch_bytes(uri).await?;
        let is_svg = uri.to_ascii_lowercase().ends_with(".svg") || looks_like_svg(&bytes);
        run_blocking(move || {
            if is_svg {
                rasterize_svg(&parse_svg(&bytes)?, size)
            } else {
                decode_image(&bytes)
            }
        })
        .await
    }

    /// Load a user photo from a path or URI.
    #[tracing::instrument(skip(self))]
    pub async fn load_photo(&self, uri: &str) -> FrameResult<PreparedImage> {
        let bytes = self.fetch_bytes(uri).await?;
        decode_image_async(bytes).await
    }
}

/// Decode already-read photo bytes off the calling task.
pub async fn decode_image_async(bytes: Vec<u8>) -> FrameResult<PreparedImage> {
    run_blocking(move || decode_image(&bytes)).await
}

async fn run_blocking<T, F>(f: F) -> FrameResult<T>
where
    F: FnOnce() -> FrameResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("join blocking decode task")?
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
