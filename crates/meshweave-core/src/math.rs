//! Tangent-space generation from UV derivatives

use glam::{Vec2, Vec3};

/// Walks triangle corners either through an explicit index buffer or
/// sequentially over the vertex array, yielding one position-array index
/// per call. The triangle-walking logic downstream is identical either way.
#[derive(Debug, Clone)]
pub struct TriangleIndices<'a> {
    source: IndexSource<'a>,
    cursor: usize,
}

#[derive(Debug, Clone)]
enum IndexSource<'a> {
    Indexed(&'a [u32]),
    Sequential(usize),
}

impl<'a> TriangleIndices<'a> {
    /// Walk corners through an explicit index buffer.
    pub fn indexed(indices: &'a [u32]) -> Self {
        Self {
            source: IndexSource::Indexed(indices),
            cursor: 0,
        }
    }

    /// Walk corners as consecutive runs of three over `vertex_count` vertices.
    pub fn sequential(vertex_count: usize) -> Self {
        Self {
            source: IndexSource::Sequential(vertex_count),
            cursor: 0,
        }
    }

    fn total(&self) -> usize {
        match self.source {
            IndexSource::Indexed(indices) => indices.len(),
            IndexSource::Sequential(count) => count,
        }
    }
}

impl Iterator for TriangleIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor >= self.total() {
            return None;
        }
        let index = match self.source {
            IndexSource::Indexed(indices) => indices[self.cursor] as usize,
            IndexSource::Sequential(_) => self.cursor,
        };
        self.cursor += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TriangleIndices<'_> {}

/// Compute one flat tangent per triangle from position and UV deltas,
/// broadcast to all three corners. Output is 3 components per
/// vertex-instance, in corner order.
///
/// Without an index buffer, triangles are consecutive runs of 3 vertices
/// from `positions`; a trailing partial triangle is ignored. A triangle with
/// a degenerate (zero-area) UV mapping gets the fallback tangent `(1, 0, 0)`
/// instead of a non-finite value.
///
/// # Panics
///
/// Panics if an index points past the end of `positions` or `texcoords`.
pub fn generate_tangents(positions: &[f32], texcoords: &[f32], indices: Option<&[u32]>) -> Vec<f32> {
    let walk = match indices {
        Some(indices) => TriangleIndices::indexed(indices),
        None => TriangleIndices::sequential(positions.len() / 3),
    };
    let corners: Vec<usize> = walk.collect();

    let mut tangents = Vec::with_capacity(corners.len() * 3);
    for triangle in corners.chunks_exact(3) {
        let (n1, n2, n3) = (triangle[0], triangle[1], triangle[2]);

        let p1 = vec3_at(positions, n1);
        let p2 = vec3_at(positions, n2);
        let p3 = vec3_at(positions, n3);

        let uv1 = vec2_at(texcoords, n1);
        let uv2 = vec2_at(texcoords, n2);
        let uv3 = vec2_at(texcoords, n3);

        let dp12 = p2 - p1;
        let dp13 = p3 - p1;
        let duv12 = uv2 - uv1;
        let duv13 = uv3 - uv1;

        let f = 1.0 / (duv12.x * duv13.y - duv13.x * duv12.y);
        let tangent = if f.is_finite() {
            ((dp12 * duv13.y - dp13 * duv12.y) * f)
                .try_normalize()
                .unwrap_or(Vec3::X)
        } else {
            Vec3::X
        };

        for _ in 0..3 {
            tangents.extend_from_slice(&tangent.to_array());
        }
    }

    tangents
}

fn vec3_at(data: &[f32], index: usize) -> Vec3 {
    Vec3::from_slice(&data[index * 3..index * 3 + 3])
}

fn vec2_at(data: &[f32], index: usize) -> Vec2 {
    Vec2::from_slice(&data[index * 2..index * 2 + 2])
}
