//! Vertex-buffer-ready attribute data handed to the render backend.

use serde::{Deserialize, Serialize};

/// A single vertex attribute: either one value per vertex-instance or a
/// constant broadcast to every instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeData {
    PerVertex { data: Vec<f32>, components: usize },
    Constant(Vec<f32>),
}

impl AttributeData {
    /// Component count per vertex-instance.
    pub fn components(&self) -> usize {
        match self {
            AttributeData::PerVertex { components, .. } => *components,
            AttributeData::Constant(value) => value.len(),
        }
    }

    /// The raw float data (per-vertex array or the constant value).
    pub fn floats(&self) -> &[f32] {
        match self {
            AttributeData::PerVertex { data, .. } => data,
            AttributeData::Constant(value) => value,
        }
    }

    /// Byte view of the float data, for direct GPU upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.floats())
    }

    /// Number of vertex-instances covered, or `None` for a constant.
    pub fn instance_count(&self) -> Option<usize> {
        match self {
            AttributeData::PerVertex { data, components } => Some(data.len() / components),
            AttributeData::Constant(_) => None,
        }
    }
}

/// The complete attribute set for one geometry, ready for buffer building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffers {
    pub position: AttributeData,
    pub texcoord: AttributeData,
    pub normal: AttributeData,
    pub color: AttributeData,
    pub tangent: AttributeData,
}

impl VertexBuffers {
    /// Vertex-instance count, taken from the position attribute.
    pub fn vertex_count(&self) -> usize {
        self.position.instance_count().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_vertex_attribute_counts_instances() {
        let attribute = AttributeData::PerVertex {
            data: vec![0.0; 12],
            components: 3,
        };
        assert_eq!(attribute.components(), 3);
        assert_eq!(attribute.instance_count(), Some(4));
    }

    #[test]
    fn constant_attribute_has_no_instances() {
        let attribute = AttributeData::Constant(vec![0.0, 0.0, 1.0]);
        assert_eq!(attribute.components(), 3);
        assert_eq!(attribute.instance_count(), None);
    }

    #[test]
    fn bytes_view_covers_all_floats() {
        let attribute = AttributeData::PerVertex {
            data: vec![1.0, 2.0, 3.0],
            components: 3,
        };
        assert_eq!(attribute.bytes().len(), 3 * std::mem::size_of::<f32>());
    }
}
