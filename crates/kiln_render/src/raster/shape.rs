//! Flat-color circle geometry.

use super::vertex::Vertex;
use crate::renderable::RenderableTransform;
use glam::Vec2;
use std::f32::consts::TAU;

/// Unit-circle rim points, shared by every circle batch.
pub struct CircleTable {
    rim: Vec<Vec2>,
}

impl CircleTable {
    pub fn new(segments: u32) -> Self {
        let rim = (0..segments)
            .map(|i| {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                Vec2::new(cos, sin)
            })
            .collect();
        Self { rim }
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.rim.len()
    }

    /// Vertices per circle: the center plus one per rim point.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.rim.len() + 1
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.rim.len() * 3
    }

    /// Triangle fan around the instance origin.
    pub fn emit(
        &self,
        radius: f32,
        color: u32,
        transform: &RenderableTransform,
        vertices: &mut Vec<Vertex>,
        indices: &mut Vec<u32>,
    ) {
        let base = vertices.len() as u32;
        vertices.push(Vertex {
            position: transform.apply(Vec2::ZERO).to_array(),
            uv: [0.5, 0.5],
            color,
        });
        for point in &self.rim {
            vertices.push(Vertex {
                position: transform.apply(*point * radius).to_array(),
                uv: [0.5 + point.x * 0.5, 0.5 - point.y * 0.5],
                color,
            });
        }

        let segments = self.rim.len() as u32;
        for i in 0..segments {
            let next = (i + 1) % segments;
            indices.extend_from_slice(&[base, base + 1 + i, base + 1 + next]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fan_closes_back_to_the_first_rim_vertex() {
        let table = CircleTable::new(4);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        table.emit(2.0, 0, &RenderableTransform::IDENTITY, &mut vertices, &mut indices);

        assert_eq!(vertices.len(), table.vertex_count());
        assert_eq!(indices.len(), table.index_count());
        assert_eq!(&indices[9..], &[0, 4, 1]);
        assert_relative_eq!(vertices[1].position[0], 2.0);
        assert_relative_eq!(vertices[2].position[1], 2.0, epsilon = 1e-6);
    }
}
