//! Per-load texture cache.

use std::collections::HashMap;

use tracing::debug;

use crate::backend::RenderBackend;
use crate::texture::TextureHandle;

/// Sentinel pixel for missing diffuse/specular maps.
pub const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];
/// Flat "no perturbation" encoded normal.
pub const FLAT_NORMAL_PIXEL: [u8; 4] = [127, 127, 255, 0];

/// Filename -> texture handle cache scoped to a single load, seeded with the
/// opaque-white and flat-normal sentinel textures. Dropped with the load
/// invocation that created it; never shared across loads.
pub struct TextureCache {
    entries: HashMap<String, TextureHandle>,
    white: TextureHandle,
    flat_normal: TextureHandle,
}

impl TextureCache {
    pub fn new<R: RenderBackend>(backend: &R) -> Self {
        Self {
            entries: HashMap::new(),
            white: backend.create_pixel_texture(WHITE_PIXEL),
            flat_normal: backend.create_pixel_texture(FLAT_NORMAL_PIXEL),
        }
    }

    pub fn white(&self) -> &TextureHandle {
        &self.white
    }

    pub fn flat_normal(&self) -> &TextureHandle {
        &self.flat_normal
    }

    /// Handle for `filename`, reusing an earlier resolution from this load
    /// or asking the backend to start a new texture from `reference` (the
    /// filename resolved against the mesh base location).
    pub fn resolve<R: RenderBackend>(
        &mut self,
        backend: &R,
        reference: &str,
        filename: &str,
    ) -> TextureHandle {
        if let Some(handle) = self.entries.get(filename) {
            return handle.clone();
        }
        debug!("loading texture '{}' from '{}'", filename, reference);
        let handle = backend.create_texture(reference);
        self.entries.insert(filename.to_string(), handle.clone());
        handle
    }
}
