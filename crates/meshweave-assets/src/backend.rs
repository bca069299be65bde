//! Collaborator traits the assembler drives: text retrieval and the
//! render-facing texture and buffer factories.

use std::future::Future;
use std::path::Path;

use crate::buffers::VertexBuffers;
use crate::error::AssetError;
use crate::texture::TextureHandle;

/// Asynchronous retrieval of text resources (mesh and material files).
pub trait TextSource: Send + Sync + 'static {
    /// Fetch the full text behind `reference`.
    fn fetch_text(
        &self,
        reference: &str,
    ) -> impl Future<Output = Result<String, AssetError>> + Send;

    /// Resolve `relative` against the location `base` was retrieved from.
    fn resolve(&self, base: &str, relative: &str) -> String {
        resolve_relative(base, relative)
    }
}

/// Path-semantics reference resolution shared by file-like sources: absolute
/// references pass through, relative ones join the base's parent directory.
pub fn resolve_relative(base: &str, relative: &str) -> String {
    let relative_path = Path::new(relative);
    if relative_path.is_absolute() {
        return relative.to_string();
    }
    let parent = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
    parent.join(relative_path).to_string_lossy().into_owned()
}

/// Render-context collaborator: creates textures and builds GPU buffers.
/// Texture creation returns immediately; content arrives through the handle.
pub trait RenderBackend: Send + Sync + 'static {
    /// Opaque buffer handle produced for each geometry.
    type Buffers;

    /// A 1x1 texture of a constant color, immediately ready.
    fn create_pixel_texture(&self, pixel: [u8; 4]) -> TextureHandle {
        TextureHandle::solid(pixel)
    }

    /// Start loading a texture from `reference`. The returned handle stays
    /// pending until the underlying image has been decoded.
    fn create_texture(&self, reference: &str) -> TextureHandle;

    /// Build renderer buffers from assembled attribute data.
    fn build_buffers(&self, data: &VertexBuffers) -> Self::Buffers;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_reference_joins_the_base_directory() {
        assert_eq!(
            resolve_relative("models/cube.obj", "cube.mtl"),
            "models/cube.mtl"
        );
    }

    #[test]
    fn bare_base_resolves_to_the_sibling() {
        assert_eq!(resolve_relative("cube.obj", "cube.mtl"), "cube.mtl");
    }

    #[test]
    fn absolute_reference_passes_through() {
        assert_eq!(
            resolve_relative("models/cube.obj", "/textures/wood.png"),
            "/textures/wood.png"
        );
    }

    #[test]
    fn nested_relative_reference_is_preserved() {
        assert_eq!(
            resolve_relative("assets/models/cube.obj", "maps/diffuse.png"),
            "assets/models/maps/diffuse.png"
        );
    }
}
