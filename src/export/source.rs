use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use anyhow::Context;
use image::{DynamicImage, ImageFormat};
use log::{debug, warn};

/// How the caller hands over the source image
#[derive(Debug, Clone)]
pub enum ImageHandle {
    /// Decoded pixels owned by someone else, which may be released at any time
    Transient(Weak<DynamicImage>),
    /// Already-encoded image bytes (PNG, JPEG, ...)
    Encoded(Vec<u8>),
    File(PathBuf),
}

#[derive(Debug, Clone)]
enum SourceState {
    Durable(Arc<[u8]>),
    /// Encoding failed at receipt; the original handle is kept as a fallback
    Borrowed(Weak<DynamicImage>),
}

/// Source image held in a form that outlives the handle it came from
#[derive(Debug, Clone)]
pub struct SourceImage {
    state: SourceState,
    name: Option<String>,
}

/// Image data ready for decoding or drawing
#[derive(Debug, Clone)]
pub enum PreparedSource {
    Bytes(Arc<[u8]>),
    Decoded(Arc<DynamicImage>),
}

impl SourceImage {
    /// Convert a handle into a durable source right away.
    ///
    /// Transient handles are encoded to PNG; if that fails the handle itself is
    /// kept. A handle that was already released is an error.
    pub fn persist(handle: ImageHandle) -> anyhow::Result<Self> {
        match handle {
            ImageHandle::Encoded(bytes) => Ok(Self::from_bytes(bytes)),
            ImageHandle::File(path) => Self::from_file(&path),
            ImageHandle::Transient(weak) => {
                let image = weak
                    .upgrade()
                    .ok_or_else(|| anyhow::anyhow!("Image handle was released before it could be stored"))?;
                match encode_png(&image) {
                    Ok(bytes) => Ok(Self::from_bytes(bytes)),
                    Err(e) => {
                        warn!("Could not encode source image ({}); keeping the original handle", e);
                        Ok(Self {
                            state: SourceState::Borrowed(weak),
                            name: None,
                        })
                    }
                }
            }
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            state: SourceState::Durable(Arc::from(bytes)),
            name: None,
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read source image {:?}", path))?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
        Ok(Self {
            state: SourceState::Durable(Arc::from(bytes)),
            name,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Stem used for derived export filenames
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_durable(&self) -> bool {
        matches!(self.state, SourceState::Durable(_))
    }

    /// Make sure the data is readable now.
    ///
    /// A borrowed handle is retried for encoding and otherwise used directly.
    /// Fails only when nothing readable is left.
    pub fn prepare(&self) -> anyhow::Result<PreparedSource> {
        match &self.state {
            SourceState::Durable(bytes) => Ok(PreparedSource::Bytes(bytes.clone())),
            SourceState::Borrowed(weak) => {
                let image = weak
                    .upgrade()
                    .ok_or_else(|| anyhow::anyhow!("Source image is no longer available"))?;
                match encode_png(&image) {
                    Ok(bytes) => Ok(PreparedSource::Bytes(Arc::from(bytes))),
                    Err(e) => {
                        debug!("Re-encoding failed ({}); using the original image", e);
                        Ok(PreparedSource::Decoded(image))
                    }
                }
            }
        }
    }
}

pub fn encode_png(image: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| anyhow::anyhow!("Failed to encode PNG: {}", e))?;
    Ok(bytes)
}

/// Decode durable bytes on the blocking pool
pub async fn decode(bytes: Arc<[u8]>) -> anyhow::Result<DynamicImage> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map_err(|e| anyhow::anyhow!("Failed to decode source image: {}", e))
    })
    .await
    .map_err(|e| anyhow::anyhow!("Decode task failed: {}", e))?
}
