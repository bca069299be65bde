//! Wavefront OBJ parsing.
//!
//! Produces an ordered list of geometries grouped by object/group/material
//! state plus the declared material-library filenames. Faces are
//! fan-triangulated; corner indices resolve against 1-based attribute tables
//! and may be negative (relative to the end of the table).

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AssetError;

/// Parsed OBJ file: geometries in encounter order plus the declared
/// material libraries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjModel {
    pub geometries: Vec<Geometry>,
    pub material_libs: Vec<String>,
}

/// One contiguous run of faces sharing object/group/material state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub object: String,
    pub groups: Vec<String>,
    pub material: String,
    pub data: GeometryData,
}

/// Flat per-vertex-instance attribute arrays. An empty array means the
/// attribute never appeared in the source; present arrays stay in lockstep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryData {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub position: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub texcoord: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub normal: Vec<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub color: Vec<f32>,
}

impl GeometryData {
    /// Vertex-instance count, derived from the position array.
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }
}

/// Parse OBJ text into geometries and declared material libraries.
///
/// Unrecognized keywords are logged and skipped; malformed float fields
/// propagate as NaN rather than aborting. Malformed or out-of-range face
/// indices fail the parse.
pub fn parse_obj(text: &str) -> Result<ObjModel, AssetError> {
    let mut parser = ObjParser::new();
    for (number, line) in text.lines().enumerate() {
        parser.parse_line(line, number + 1)?;
    }
    Ok(ObjModel {
        geometries: parser.geometries,
        material_libs: parser.material_libs,
    })
}

/// Growable per-attribute table with a zero-valued sentinel row at slot 0,
/// so raw 1-based file indices map directly to slots. Slot 0 is never
/// written by real data.
#[derive(Debug)]
struct AttributeTable<const N: usize> {
    rows: Vec<[f32; N]>,
}

impl<const N: usize> AttributeTable<N> {
    fn new() -> Self {
        Self {
            rows: vec![[0.0; N]],
        }
    }

    fn push(&mut self, row: [f32; N]) {
        self.rows.push(row);
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    /// Resolve a raw file index to a table slot. Positive indices address
    /// slots directly (the sentinel counts), negative ones count back from
    /// the end, zero selects nothing.
    fn resolve(&self, raw: i64, line: usize) -> Result<Option<usize>, AssetError> {
        if raw == 0 {
            return Ok(None);
        }
        let len = self.rows.len();
        let slot = if raw > 0 { raw } else { len as i64 + raw };
        if slot < 1 || slot >= len as i64 {
            return Err(AssetError::FaceIndexOutOfRange {
                index: raw,
                len,
                line,
            });
        }
        Ok(Some(slot as usize))
    }

    fn row(&self, slot: usize) -> &[f32; N] {
        &self.rows[slot]
    }

    fn get(&self, slot: usize) -> Option<&[f32; N]> {
        self.rows.get(slot)
    }
}

/// Parse up to `N` float fields; malformed or missing fields become NaN and
/// propagate rather than aborting the parse.
pub(crate) fn parse_row<const N: usize>(parts: &[&str]) -> [f32; N] {
    let mut row = [f32::NAN; N];
    for (value, part) in row.iter_mut().zip(parts) {
        *value = part.parse().unwrap_or(f32::NAN);
    }
    row
}

/// Line-by-line parser state. `parse_line` is the reducer; keyword handlers
/// mutate only this state, and the object/group/material fields persist
/// across geometry boundaries.
#[derive(Debug)]
struct ObjParser {
    positions: AttributeTable<3>,
    texcoords: AttributeTable<2>,
    normals: AttributeTable<3>,
    colors: AttributeTable<3>,
    object: String,
    groups: Vec<String>,
    material: String,
    geometries: Vec<Geometry>,
    /// Index into `geometries` of the currently open geometry.
    current: Option<usize>,
    material_libs: Vec<String>,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            positions: AttributeTable::new(),
            texcoords: AttributeTable::new(),
            normals: AttributeTable::new(),
            colors: AttributeTable::new(),
            object: "default".to_string(),
            groups: vec!["default".to_string()],
            material: "default".to_string(),
            geometries: Vec::new(),
            current: None,
            material_libs: Vec::new(),
        }
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<(), AssetError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        let parts: Vec<&str> = rest.split_whitespace().collect();

        match keyword {
            "v" => self.handle_vertex(&parts),
            "vn" => self.normals.push(parse_row(&parts)),
            "vt" => self.texcoords.push(parse_row(&parts)),
            "f" => return self.handle_face(&parts, line_no),
            "usemtl" => {
                self.material = rest.to_string();
                self.split_geometry();
            }
            "g" => {
                self.groups = parts.iter().map(|s| s.to_string()).collect();
                self.split_geometry();
            }
            "o" => {
                self.object = rest.to_string();
                self.split_geometry();
            }
            // Filenames may contain spaces, so the remainder is kept whole.
            "mtllib" => self.material_libs.push(rest.to_string()),
            // Smoothing groups are recognized but ignored.
            "s" => {}
            other => warn!("unhandled keyword '{}' on line {}", other, line_no),
        }
        Ok(())
    }

    /// `v x y z [r g b]` - more than 3 fields means the remainder is a
    /// parallel vertex-color row at the same slot.
    fn handle_vertex(&mut self, parts: &[&str]) {
        self.positions.push(parse_row(&parts[..parts.len().min(3)]));
        if parts.len() > 3 {
            self.colors.push(parse_row(&parts[3..]));
        }
    }

    /// Close the open geometry if it has emitted at least one vertex; an
    /// empty geometry is never split.
    fn split_geometry(&mut self) {
        if let Some(index) = self.current {
            if !self.geometries[index].data.position.is_empty() {
                self.current = None;
            }
        }
    }

    /// The open geometry, created on demand with the current parse state.
    fn open_geometry(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => {
                self.geometries.push(Geometry {
                    object: self.object.clone(),
                    groups: self.groups.clone(),
                    material: self.material.clone(),
                    data: GeometryData::default(),
                });
                let index = self.geometries.len() - 1;
                self.current = Some(index);
                index
            }
        }
    }

    /// Fan-triangulate a face: corner 0 paired with every consecutive pair,
    /// N-2 triangles for N corners, each corner resolved independently.
    fn handle_face(&mut self, parts: &[&str], line_no: usize) -> Result<(), AssetError> {
        let geo = self.open_geometry();
        if parts.len() < 3 {
            return Ok(());
        }
        let triangles = parts.len() - 2;
        for tri in 0..triangles {
            self.add_corner(geo, parts[0], line_no)?;
            self.add_corner(geo, parts[tri + 1], line_no)?;
            self.add_corner(geo, parts[tri + 2], line_no)?;
        }
        Ok(())
    }

    /// Resolve one `p[/t[/n]]` corner token, appending the referenced rows to
    /// the open geometry. A missing or zero component contributes nothing to
    /// that attribute for this vertex-instance.
    fn add_corner(&mut self, geo: usize, token: &str, line_no: usize) -> Result<(), AssetError> {
        let mut components = token.split('/');

        if let Some(slot) = resolve_token(&self.positions, components.next(), token, line_no)? {
            let data = &mut self.geometries[geo].data;
            data.position.extend_from_slice(self.positions.row(slot));
            // Vertex colors ride along with the position index once any `v`
            // line has carried them.
            if self.colors.len() > 1 {
                match self.colors.get(slot) {
                    Some(row) => data.color.extend_from_slice(row),
                    None => {
                        return Err(AssetError::MissingVertexColor {
                            slot,
                            line: line_no,
                        })
                    }
                }
            }
        }
        if let Some(slot) = resolve_token(&self.texcoords, components.next(), token, line_no)? {
            self.geometries[geo]
                .data
                .texcoord
                .extend_from_slice(self.texcoords.row(slot));
        }
        if let Some(slot) = resolve_token(&self.normals, components.next(), token, line_no)? {
            self.geometries[geo]
                .data
                .normal
                .extend_from_slice(self.normals.row(slot));
        }
        Ok(())
    }
}

/// Resolve one corner component: absent or empty contributes nothing,
/// otherwise the token must parse as an integer and land inside the table.
fn resolve_token<const N: usize>(
    table: &AttributeTable<N>,
    component: Option<&str>,
    token: &str,
    line: usize,
) -> Result<Option<usize>, AssetError> {
    let component = match component {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(None),
    };
    let raw: i64 = component.parse().map_err(|_| AssetError::InvalidFaceIndex {
        token: token.to_string(),
        line,
    })?;
    table.resolve(raw, line)
}
