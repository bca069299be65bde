//! Meshweave Assets - Wavefront OBJ/MTL loading and model assembly
//!
//! Parses OBJ mesh text and MTL material libraries, resolves texture
//! references, fills in missing vertex attributes, and assembles
//! renderer-agnostic (material, buffers) parts.

mod backend;
mod buffers;
mod cache;
mod disk;
mod error;
mod http;
mod loader;
mod material;
mod mtl;
mod obj;
mod texture;

pub use backend::{resolve_relative, RenderBackend, TextSource};
pub use buffers::{AttributeData, VertexBuffers};
pub use cache::{TextureCache, FLAT_NORMAL_PIXEL, WHITE_PIXEL};
pub use disk::{DiskSource, SoftwareBackend};
pub use error::AssetError;
pub use http::HttpSource;
pub use loader::{MeshLoader, ModelPart};
pub use material::{Material, ResolvedMaps};
pub use mtl::{parse_mtl, MaterialDef};
pub use obj::{parse_obj, Geometry, GeometryData, ObjModel};
pub use texture::{
    load_texture, AssetId, TextureAsset, TextureFormat, TextureHandle, TextureState, TextureWriter,
};
