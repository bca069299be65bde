//! Resolved materials: parsed definitions overlaid on the built-in default.

use crate::mtl::MaterialDef;
use crate::texture::TextureHandle;

/// A fully-resolved material: every field populated, every texture
/// reference an actual handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    pub opacity: f32,
    pub optical_density: f32,
    pub illum: i32,
    pub diffuse_map: TextureHandle,
    pub specular_map: TextureHandle,
    pub normal_map: TextureHandle,
}

impl Material {
    /// The built-in default: white diffuse/specular over the sentinel
    /// textures, no ambient or emissive term.
    pub fn default_with(white: &TextureHandle, flat_normal: &TextureHandle) -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0],
            ambient: [0.0, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            shininess: 400.0,
            opacity: 1.0,
            optical_density: 1.0,
            illum: 2,
            diffuse_map: white.clone(),
            specular_map: white.clone(),
            normal_map: flat_normal.clone(),
        }
    }

    /// Overlay a parsed definition: set fields win, unset fields keep their
    /// defaults. Texture maps must already be resolved to handles.
    pub fn overlay(mut self, def: &MaterialDef, maps: &ResolvedMaps) -> Self {
        if let Some(value) = def.shininess {
            self.shininess = value;
        }
        if let Some(value) = def.ambient {
            self.ambient = value;
        }
        if let Some(value) = def.diffuse {
            self.diffuse = value;
        }
        if let Some(value) = def.specular {
            self.specular = value;
        }
        if let Some(value) = def.emissive {
            self.emissive = value;
        }
        if let Some(value) = def.optical_density {
            self.optical_density = value;
        }
        if let Some(value) = def.opacity {
            self.opacity = value;
        }
        if let Some(value) = def.illum {
            self.illum = value;
        }
        if let Some(handle) = &maps.diffuse_map {
            self.diffuse_map = handle.clone();
        }
        if let Some(handle) = &maps.specular_map {
            self.specular_map = handle.clone();
        }
        if let Some(handle) = &maps.normal_map {
            self.normal_map = handle.clone();
        }
        self
    }
}

/// Texture handles resolved for one material's map references.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMaps {
    pub diffuse_map: Option<TextureHandle>,
    pub specular_map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinels() -> (TextureHandle, TextureHandle) {
        (
            TextureHandle::solid([255, 255, 255, 255]),
            TextureHandle::solid([127, 127, 255, 0]),
        )
    }

    #[test]
    fn empty_definition_keeps_the_default_verbatim() {
        let (white, flat_normal) = sentinels();
        let default = Material::default_with(&white, &flat_normal);
        let overlaid = default
            .clone()
            .overlay(&MaterialDef::default(), &ResolvedMaps::default());
        assert_eq!(overlaid, default);
        assert_eq!(overlaid.diffuse_map, white);
        assert_eq!(overlaid.normal_map, flat_normal);
    }

    #[test]
    fn set_fields_override_defaults() {
        let (white, flat_normal) = sentinels();
        let def = MaterialDef {
            diffuse: Some([0.5, 0.25, 0.0]),
            shininess: Some(32.0),
            ..Default::default()
        };
        let material =
            Material::default_with(&white, &flat_normal).overlay(&def, &ResolvedMaps::default());
        assert_eq!(material.diffuse, [0.5, 0.25, 0.0]);
        assert_eq!(material.shininess, 32.0);
        // Untouched fields keep the defaults.
        assert_eq!(material.specular, [1.0, 1.0, 1.0]);
        assert_eq!(material.opacity, 1.0);
        assert_eq!(material.specular_map, white);
    }

    #[test]
    fn resolved_maps_replace_sentinel_textures() {
        let (white, flat_normal) = sentinels();
        let loaded = TextureHandle::solid([9, 9, 9, 255]);
        let maps = ResolvedMaps {
            diffuse_map: Some(loaded.clone()),
            ..Default::default()
        };
        let material =
            Material::default_with(&white, &flat_normal).overlay(&MaterialDef::default(), &maps);
        assert_eq!(material.diffuse_map, loaded);
        assert_eq!(material.specular_map, white);
        assert_eq!(material.normal_map, flat_normal);
    }
}
