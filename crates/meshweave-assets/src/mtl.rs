//! Wavefront MTL material-library parsing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::obj::parse_row;

/// A material as parsed from MTL text: every field optional, texture
/// references still raw filenames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub shininess: Option<f32>,
    pub ambient: Option<[f32; 3]>,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub emissive: Option<[f32; 3]>,
    pub optical_density: Option<f32>,
    pub opacity: Option<f32>,
    pub illum: Option<i32>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub normal_map: Option<String>,
}

/// Parse concatenated MTL text (one or more files) into a name -> material
/// mapping. `newmtl` opens a new material that stays the target for all
/// following recognized lines. Unknown keywords, and recognized keys
/// appearing before any `newmtl`, are logged and skipped.
///
/// Map references take the full remainder of the line as the filename; map
/// option flags are not interpreted.
pub fn parse_mtl(text: &str) -> HashMap<String, MaterialDef> {
    let mut materials = HashMap::new();
    let mut current: Option<(String, MaterialDef)> = None;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        if keyword == "newmtl" {
            if let Some((name, material)) = current.take() {
                materials.insert(name, material);
            }
            current = Some((rest.to_string(), MaterialDef::default()));
            continue;
        }

        let Some((_, material)) = current.as_mut() else {
            warn!(
                "material property '{}' before any newmtl on line {}",
                keyword,
                number + 1
            );
            continue;
        };
        let parts: Vec<&str> = rest.split_whitespace().collect();

        match keyword {
            "Ns" => material.shininess = Some(parse_row::<1>(&parts)[0]),
            "Ka" => material.ambient = Some(parse_row(&parts)),
            "Kd" => material.diffuse = Some(parse_row(&parts)),
            "Ks" => material.specular = Some(parse_row(&parts)),
            "Ke" => material.emissive = Some(parse_row(&parts)),
            "Ni" => material.optical_density = Some(parse_row::<1>(&parts)[0]),
            "d" => material.opacity = Some(parse_row::<1>(&parts)[0]),
            "illum" => material.illum = parts.first().and_then(|p| p.parse().ok()),
            "map_Kd" => material.diffuse_map = Some(rest.to_string()),
            "map_Ns" => material.specular_map = Some(rest.to_string()),
            "map_Bump" => material.normal_map = Some(rest.to_string()),
            other => warn!("unhandled keyword '{}' on line {}", other, number + 1),
        }
    }

    if let Some((name, material)) = current {
        materials.insert(name, material);
    }

    materials
}
