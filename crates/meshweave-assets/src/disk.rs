//! Disk-backed collaborators: a filesystem text source and a software
//! render backend that decodes textures with the `image` crate.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::backend::{RenderBackend, TextSource};
use crate::buffers::VertexBuffers;
use crate::error::AssetError;
use crate::texture::{load_texture, TextureHandle};

/// Resolve an asset reference against a base directory: absolute references
/// pass through, relative ones join the base.
fn anchored(base: &Path, reference: &str) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Text retrieval from the local filesystem, rooted at a base path.
pub struct DiskSource {
    base_path: PathBuf,
}

impl DiskSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl TextSource for DiskSource {
    async fn fetch_text(&self, reference: &str) -> Result<String, AssetError> {
        tokio::fs::read_to_string(anchored(&self.base_path, reference))
            .await
            .map_err(|e| AssetError::Retrieval(reference.to_string(), e.to_string()))
    }
}

/// Placeholder color shown while a texture is still decoding.
const LOADING_PIXEL: [u8; 4] = [128, 192, 255, 255];

/// Headless render backend: textures decode on the blocking thread pool and
/// buffers pass through as plain attribute data.
pub struct SoftwareBackend {
    base_path: PathBuf,
}

impl SoftwareBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl RenderBackend for SoftwareBackend {
    type Buffers = VertexBuffers;

    /// Must be called from within a tokio runtime: decoding is spawned onto
    /// the blocking pool and the handle completes when it finishes.
    fn create_texture(&self, reference: &str) -> TextureHandle {
        let (handle, writer) = TextureHandle::pending(LOADING_PIXEL);
        let path = anchored(&self.base_path, reference);
        tokio::task::spawn_blocking(move || match load_texture(&path) {
            Ok(asset) => writer.fulfill(asset),
            Err(e) => {
                warn!("texture '{}' failed to load: {}", path.display(), e);
                writer.fail(e.to_string());
            }
        });
        handle
    }

    fn build_buffers(&self, data: &VertexBuffers) -> VertexBuffers {
        data.clone()
    }
}
