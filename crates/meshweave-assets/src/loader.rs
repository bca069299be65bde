//! The mesh assembler: fetches and parses mesh and material text, resolves
//! texture references, fills in missing attributes, and emits buffer-ready
//! parts.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use meshweave_core::generate_tangents;

use crate::backend::{RenderBackend, TextSource};
use crate::buffers::{AttributeData, VertexBuffers};
use crate::cache::TextureCache;
use crate::error::AssetError;
use crate::material::{Material, ResolvedMaps};
use crate::mtl::{parse_mtl, MaterialDef};
use crate::obj::{parse_obj, GeometryData};

/// One draw unit of a loaded model: a resolved material and the buffers the
/// backend built for its geometry.
#[derive(Debug, Clone)]
pub struct ModelPart<B> {
    pub material: Material,
    pub buffers: B,
}

/// Loads OBJ models and their material libraries through a text source and
/// a render backend.
pub struct MeshLoader<S, R> {
    source: Arc<S>,
    backend: Arc<R>,
}

impl<S: TextSource, R: RenderBackend> MeshLoader<S, R> {
    pub fn new(source: Arc<S>, backend: Arc<R>) -> Self {
        Self { source, backend }
    }

    /// Load a mesh and its declared material libraries into an ordered list
    /// of (material, buffers) parts.
    ///
    /// Any retrieval failure fails the whole load; there is no partial
    /// result. Texture content may still be arriving when this returns -
    /// join each handle's `wait_ready` before sampling.
    pub async fn load_model(
        &self,
        mesh_ref: &str,
    ) -> Result<Vec<ModelPart<R::Buffers>>, AssetError> {
        let text = self.source.fetch_text(mesh_ref).await?;
        let model = parse_obj(&text)?;
        debug!(
            "parsed '{}': {} geometries, {} material libs",
            mesh_ref,
            model.geometries.len(),
            model.material_libs.len()
        );

        let materials = parse_mtl(
            &self
                .fetch_material_text(mesh_ref, &model.material_libs)
                .await?,
        );

        let mut cache = TextureCache::new(self.backend.as_ref());
        let resolved = self.resolve_materials(&materials, mesh_ref, &mut cache);

        let default = Material::default_with(cache.white(), cache.flat_normal());
        let mut parts = Vec::with_capacity(model.geometries.len());
        for geometry in &model.geometries {
            let buffers = assemble_buffers(&geometry.data);
            let material = match resolved.get(geometry.material.as_str()) {
                Some((def, maps)) => default.clone().overlay(def, maps),
                None => default.clone(),
            };
            parts.push(ModelPart {
                material,
                buffers: self.backend.build_buffers(&buffers),
            });
        }
        info!("loaded '{}': {} parts", mesh_ref, parts.len());
        Ok(parts)
    }

    /// Fetch every declared material library concurrently, join in
    /// declaration order, and concatenate the contents.
    async fn fetch_material_text(
        &self,
        mesh_ref: &str,
        libs: &[String],
    ) -> Result<String, AssetError> {
        let mut jobs = Vec::with_capacity(libs.len());
        for lib in libs {
            let source = Arc::clone(&self.source);
            let reference = self.source.resolve(mesh_ref, lib);
            jobs.push(tokio::spawn(
                async move { source.fetch_text(&reference).await },
            ));
        }
        let mut text = String::new();
        for job in jobs {
            let chunk = job
                .await
                .map_err(|e| AssetError::TaskFailed(e.to_string()))??;
            text.push_str(&chunk);
            text.push('\n');
        }
        Ok(text)
    }

    /// Resolve every material's texture references through the per-load
    /// cache, so repeated filenames share one handle.
    fn resolve_materials<'a>(
        &self,
        materials: &'a HashMap<String, MaterialDef>,
        mesh_ref: &str,
        cache: &mut TextureCache,
    ) -> HashMap<&'a str, (&'a MaterialDef, ResolvedMaps)> {
        materials
            .iter()
            .map(|(name, def)| {
                let mut maps = ResolvedMaps::default();
                for (filename, slot) in [
                    (&def.diffuse_map, &mut maps.diffuse_map),
                    (&def.specular_map, &mut maps.specular_map),
                    (&def.normal_map, &mut maps.normal_map),
                ] {
                    if let Some(filename) = filename {
                        let reference = self.source.resolve(mesh_ref, filename);
                        *slot = Some(cache.resolve(self.backend.as_ref(), &reference, filename));
                    }
                }
                (name.as_str(), (def, maps))
            })
            .collect()
    }
}

/// Fill in missing attributes and generate tangents for one geometry.
fn assemble_buffers(data: &GeometryData) -> VertexBuffers {
    let color = if data.color.is_empty() {
        // No vertex colors in the source: constant opaque white.
        AttributeData::Constant(vec![1.0, 1.0, 1.0, 1.0])
    } else {
        // Captured colors are 3 components wide; the buffer builder would
        // otherwise assume 4.
        AttributeData::PerVertex {
            data: data.color.clone(),
            components: 3,
        }
    };
    let tangent = if !data.texcoord.is_empty() && !data.normal.is_empty() {
        AttributeData::PerVertex {
            data: generate_tangents(&data.position, &data.texcoord, None),
            components: 3,
        }
    } else {
        AttributeData::Constant(vec![1.0, 0.0, 0.0])
    };
    let texcoord = if data.texcoord.is_empty() {
        AttributeData::Constant(vec![0.0, 0.0])
    } else {
        AttributeData::PerVertex {
            data: data.texcoord.clone(),
            components: 2,
        }
    };
    let normal = if data.normal.is_empty() {
        AttributeData::Constant(vec![0.0, 0.0, 1.0])
    } else {
        AttributeData::PerVertex {
            data: data.normal.clone(),
            components: 3,
        }
    };
    VertexBuffers {
        position: AttributeData::PerVertex {
            data: data.position.clone(),
            components: 3,
        },
        texcoord,
        normal,
        color,
        tangent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::texture::TextureHandle;

    struct MapSource {
        files: HashMap<String, String>,
    }

    impl MapSource {
        fn new(entries: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                files: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
        }
    }

    impl TextSource for MapSource {
        async fn fetch_text(&self, reference: &str) -> Result<String, AssetError> {
            self.files
                .get(reference)
                .cloned()
                .ok_or_else(|| AssetError::Retrieval(reference.to_string(), "not found".into()))
        }
    }

    struct RecordingBackend {
        created: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: Mutex::new(Vec::new()),
            })
        }
    }

    impl RenderBackend for RecordingBackend {
        type Buffers = VertexBuffers;

        fn create_texture(&self, reference: &str) -> TextureHandle {
            self.created.lock().unwrap().push(reference.to_string());
            TextureHandle::solid([0, 0, 0, 255])
        }

        fn build_buffers(&self, data: &VertexBuffers) -> VertexBuffers {
            data.clone()
        }
    }

    const BARE_TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[tokio::test]
    async fn bare_mesh_gets_every_default() {
        let source = MapSource::new(&[("tri.obj", BARE_TRIANGLE)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("tri.obj").await.expect("load");
        assert_eq!(parts.len(), 1);

        let part = &parts[0];
        assert_eq!(part.buffers.vertex_count(), 3);
        assert_eq!(
            part.buffers.texcoord,
            AttributeData::Constant(vec![0.0, 0.0])
        );
        assert_eq!(
            part.buffers.normal,
            AttributeData::Constant(vec![0.0, 0.0, 1.0])
        );
        assert_eq!(
            part.buffers.tangent,
            AttributeData::Constant(vec![1.0, 0.0, 0.0])
        );
        assert_eq!(
            part.buffers.color,
            AttributeData::Constant(vec![1.0, 1.0, 1.0, 1.0])
        );

        // No material library declared: the built-in default, verbatim.
        assert_eq!(part.material.diffuse, [1.0, 1.0, 1.0]);
        assert_eq!(part.material.shininess, 400.0);
        assert_eq!(part.material.opacity, 1.0);
        assert_eq!(part.material.diffuse_map, part.material.specular_map);
        assert_ne!(part.material.diffuse_map, part.material.normal_map);
    }

    #[tokio::test]
    async fn full_attributes_produce_per_vertex_tangents() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let source = MapSource::new(&[("tri.obj", obj)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("tri.obj").await.expect("load");
        let buffers = &parts[0].buffers;
        assert_eq!(
            buffers.tangent,
            AttributeData::PerVertex {
                data: vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                components: 3,
            }
        );
        assert_eq!(buffers.texcoord.components(), 2);
        assert_eq!(buffers.normal.components(), 3);
    }

    #[tokio::test]
    async fn vertex_colors_are_tagged_three_wide() {
        let obj = "v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0 0 0 1\nf 1 2 3\n";
        let source = MapSource::new(&[("tri.obj", obj)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("tri.obj").await.expect("load");
        match &parts[0].buffers.color {
            AttributeData::PerVertex { components, data } => {
                assert_eq!(*components, 3);
                assert_eq!(data.len(), 9);
            }
            other => panic!("expected per-vertex colors, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn material_library_overlays_the_default() {
        let obj = "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl red\nf 1 2 3\n";
        let mtl = "newmtl red\nKd 1 0 0\nNs 32\n";
        let source = MapSource::new(&[("models/tri.obj", obj), ("models/tri.mtl", mtl)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("models/tri.obj").await.expect("load");
        let material = &parts[0].material;
        assert_eq!(material.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(material.shininess, 32.0);
        // Unset fields keep the defaults.
        assert_eq!(material.specular, [1.0, 1.0, 1.0]);
        assert_eq!(material.opacity, 1.0);
    }

    #[tokio::test]
    async fn all_material_libs_are_fetched_and_concatenated() {
        let obj = "\
mtllib a.mtl
mtllib b.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl from_b
f 1 2 3
";
        let source = MapSource::new(&[
            ("tri.obj", obj),
            ("a.mtl", "newmtl from_a\nKd 1 0 0\n"),
            ("b.mtl", "newmtl from_b\nKd 0 0 1\n"),
        ]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("tri.obj").await.expect("load");
        assert_eq!(parts[0].material.diffuse, [0.0, 0.0, 1.0]);
    }

    #[tokio::test]
    async fn missing_material_library_fails_the_whole_load() {
        let obj = "mtllib missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let source = MapSource::new(&[("tri.obj", obj)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        match loader.load_model("tri.obj").await {
            Err(AssetError::Retrieval(reference, _)) => assert_eq!(reference, "missing.mtl"),
            other => panic!("expected Retrieval error, got: {:?}", other.map(|p| p.len())),
        }
    }

    #[tokio::test]
    async fn shared_map_filenames_resolve_to_one_texture() {
        let obj = "\
mtllib tri.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl first
f 1 2 3
usemtl second
f 1 2 3
";
        let mtl = "\
newmtl first
map_Kd shared.png
map_Bump bump.png
newmtl second
map_Kd shared.png
";
        let source = MapSource::new(&[("tri.obj", obj), ("tri.mtl", mtl)]);
        let backend = RecordingBackend::new();
        let loader = MeshLoader::new(source, Arc::clone(&backend));

        let parts = loader.load_model("tri.obj").await.expect("load");
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0].material.diffuse_map.id(),
            parts[1].material.diffuse_map.id()
        );

        let mut created = backend.created.lock().unwrap().clone();
        created.sort();
        assert_eq!(created, vec!["bump.png".to_string(), "shared.png".to_string()]);
    }

    #[tokio::test]
    async fn geometry_material_pairing_preserves_order() {
        let obj = "\
mtllib tri.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl red
f 1 2 3
usemtl green
f 1 2 3
";
        let mtl = "newmtl red\nKd 1 0 0\nnewmtl green\nKd 0 1 0\n";
        let source = MapSource::new(&[("tri.obj", obj), ("tri.mtl", mtl)]);
        let loader = MeshLoader::new(source, RecordingBackend::new());

        let parts = loader.load_model("tri.obj").await.expect("load");
        assert_eq!(parts[0].material.diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(parts[1].material.diffuse, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn assembled_positions_stay_per_vertex() {
        let data = GeometryData {
            position: vec![0.0; 9],
            ..Default::default()
        };
        let buffers = assemble_buffers(&data);
        assert_eq!(buffers.position.instance_count(), Some(3));
        assert_eq!(buffers.vertex_count(), 3);
    }
}
