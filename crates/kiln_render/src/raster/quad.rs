//! Transformed quad generation
//!
//! A [`QuadTemplate`] holds everything shared by a batch of quads; each instance
//! contributes only its [`RenderableTransform`]. Corners are emitted in the order
//! bottom-left, bottom-right, top-right, top-left, with indices `b, b+1, b+2, b, b+2, b+3`.

use super::vertex::Vertex;
use super::wide::{F32x8, LANES};
use crate::renderable::{Color, ImageRef, Rect, RenderableTransform};
use glam::Vec2;

pub const QUAD_VERTICES: usize = 4;
pub const QUAD_INDICES: usize = 6;

/// `[u0, v0, u1, v1]` covering the whole texture.
pub const UNIT_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTemplate {
    pub corners: [Vec2; 4],
    pub uvs: [[f32; 2]; 4],
    pub color: u32,
}

impl QuadTemplate {
    /// Quad spanning `offset ± half`. `uv` is `[u0, v0, u1, v1]` with `v0` at the top.
    pub fn new(offset: Vec2, half: Vec2, uv: [f32; 4], color: Color) -> Self {
        let [u0, v0, u1, v1] = uv;
        Self {
            corners: [
                offset + Vec2::new(-half.x, -half.y),
                offset + Vec2::new(half.x, -half.y),
                offset + Vec2::new(half.x, half.y),
                offset + Vec2::new(-half.x, half.y),
            ],
            uvs: [[u0, v1], [u1, v1], [u1, v0], [u0, v0]],
            color: color.packed(),
        }
    }

    pub fn centered(size: Vec2, uv: [f32; 4], color: Color) -> Self {
        Self::new(Vec2::ZERO, size * 0.5, uv, color)
    }

    /// Image region sized by its pixel extent over `pixels_per_unit`.
    pub fn sprite(image: &ImageRef, source: &Rect, pixels_per_unit: f32, color: Color) -> Self {
        let half = source.size() * 0.5 / pixels_per_unit;
        Self::new(Vec2::ZERO, half, image.uv_rect(source), color)
    }

    /// Segment of `length` along local +X starting at the origin.
    pub fn line(length: f32, thickness: f32, color: Color) -> Self {
        let half = Vec2::new(length * 0.5, thickness * 0.5);
        Self::new(Vec2::new(length * 0.5, 0.0), half, UNIT_UV, color)
    }
}

#[inline]
fn push_indices(base: u32, indices: &mut Vec<u32>) {
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// One instance at a time.
pub fn emit_quads_scalar(
    template: &QuadTemplate,
    transforms: &[RenderableTransform],
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
) {
    vertices.reserve(transforms.len() * QUAD_VERTICES);
    indices.reserve(transforms.len() * QUAD_INDICES);

    for transform in transforms {
        let base = vertices.len() as u32;
        for (corner, uv) in template.corners.iter().zip(template.uvs) {
            vertices.push(Vertex {
                position: transform.apply(*corner).to_array(),
                uv,
                color: template.color,
            });
        }
        push_indices(base, indices);
    }
}

/// Eight instances per step. `transforms.len()` must be a multiple of [`LANES`].
///
/// Corners use separate multiplies and adds, not fused multiply-add, so every
/// lane rounds exactly like [`emit_quads_scalar`].
pub fn emit_quads_wide(
    template: &QuadTemplate,
    transforms: &[RenderableTransform],
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
) {
    debug_assert_eq!(transforms.len() % LANES, 0);
    vertices.reserve(transforms.len() * QUAD_VERTICES);
    indices.reserve(transforms.len() * QUAD_INDICES);

    for lanes in transforms.chunks_exact(LANES) {
        let px = F32x8::gather(lanes, |t| t.position.x);
        let py = F32x8::gather(lanes, |t| t.position.y);
        let sx = F32x8::gather(lanes, |t| t.scale.x);
        let sy = F32x8::gather(lanes, |t| t.scale.y);
        let sin = F32x8::gather(lanes, |t| t.sin);
        let cos = F32x8::gather(lanes, |t| t.cos);

        let mut xs = [[0.0; LANES]; QUAD_VERTICES];
        let mut ys = [[0.0; LANES]; QUAD_VERTICES];
        for (k, corner) in template.corners.iter().enumerate() {
            // Same expression order as `RenderableTransform::apply`.
            let lx = F32x8::splat(corner.x) * sx;
            let ly = F32x8::splat(corner.y) * sy;
            xs[k] = (lx * cos - ly * sin + px).to_array();
            ys[k] = (lx * sin + ly * cos + py).to_array();
        }

        for lane in 0..LANES {
            let base = vertices.len() as u32;
            for k in 0..QUAD_VERTICES {
                vertices.push(Vertex {
                    position: [xs[k][lane], ys[k][lane]],
                    uv: template.uvs[k],
                    color: template.color,
                });
            }
            push_indices(base, indices);
        }
    }
}

/// Wide path for the largest multiple of eight, scalar for the remainder.
pub fn emit_quads(
    template: &QuadTemplate,
    transforms: &[RenderableTransform],
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    simd: bool,
) {
    let split = if simd {
        transforms.len() - transforms.len() % LANES
    } else {
        0
    };
    let (wide, rest) = transforms.split_at(split);
    emit_quads_wide(template, wide, vertices, indices);
    emit_quads_scalar(template, rest, vertices, indices);
}
