//! Render system
//!
//! Turns a frame's packets into backend draw calls. Geometry accumulates in one
//! vertex/index buffer per draw state and is flushed whenever the next instance
//! would exceed the per-draw budget, or when the batch ends.

mod quad;
mod shape;
mod text;
mod vertex;
mod wide;

pub use quad::{
    emit_quads, emit_quads_scalar, emit_quads_wide, QuadTemplate, QUAD_INDICES, QUAD_VERTICES,
    UNIT_UV,
};
pub use shape::CircleTable;
pub use text::{line_origin, split_lines, FontMetrics};
pub use vertex::Vertex;
pub use wide::{F32x8, LANES};

use crate::backend::{BackendError, DrawCall, DrawState, RenderBackend, TextDraw};
use crate::camera::Camera2D;
use crate::interpolate::InterpolatedFrame;
use crate::packet::{Batch, PacketBatch};
use crate::batch::{
    AtlasShared, CircleShared, LineShared, RectShared, ShaderShared, SpriteShared, TextShared,
};
use crate::renderable::{Color, RenderableTransform};
use glam::{Affine2, Mat2, Vec2};
use thiserror::Error;

/// Triangles in one quad.
const QUAD_PRIMITIVES: usize = 2;
const MIN_CIRCLE_SEGMENTS: u32 = 3;
/// Largest budget whose index count (3 per triangle) still fits a `u32` index.
pub const MAX_PRIMITIVES_PER_BATCH: usize = u32::MAX as usize / 3;
/// Upfront buffer reservation; larger budgets grow on demand.
const INITIAL_VERTEX_CAPACITY: usize = 1 << 16;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("primitive budget {budget} is below the {required} needed for one shape")]
    PrimitiveBudgetTooSmall { budget: usize, required: usize },

    #[error("primitive budget {budget} exceeds the u32 index range (max {max})")]
    PrimitiveBudgetTooLarge { budget: usize, max: usize },

    #[error("pixels per unit must be positive and finite, got {0}")]
    InvalidPixelScale(f32),

    #[error("circles need at least 3 segments, got {0}")]
    TooFewCircleSegments(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Triangles per draw call.
    pub max_primitives_per_batch: usize,
    /// Texture pixels per world unit for sprite and text sizing.
    pub pixels_per_unit: f32,
    pub circle_segments: u32,
    pub clear_color: Color,
    /// Use the 8-wide quad path.
    pub simd: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_primitives_per_batch: 8192,
            pixels_per_unit: 1.0,
            circle_segments: 32,
            clear_color: Color::rgba(13, 13, 18, 255),
            simd: true,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixels_per_unit.is_finite() && self.pixels_per_unit > 0.0) {
            return Err(ConfigError::InvalidPixelScale(self.pixels_per_unit));
        }
        if self.circle_segments < MIN_CIRCLE_SEGMENTS {
            return Err(ConfigError::TooFewCircleSegments(self.circle_segments));
        }
        let required = QUAD_PRIMITIVES.max(self.circle_segments as usize);
        if self.max_primitives_per_batch < required {
            return Err(ConfigError::PrimitiveBudgetTooSmall {
                budget: self.max_primitives_per_batch,
                required,
            });
        }
        let fits_u32 = self
            .max_primitives_per_batch
            .checked_mul(3)
            .is_some_and(|indices| indices <= u32::MAX as usize);
        if !fits_u32 {
            return Err(ConfigError::PrimitiveBudgetTooLarge {
                budget: self.max_primitives_per_batch,
                max: MAX_PRIMITIVES_PER_BATCH,
            });
        }
        Ok(())
    }

    /// Quads use 4 vertices per 2 triangles.
    pub fn max_vertices_per_draw(&self) -> usize {
        self.max_primitives_per_batch.saturating_mul(2)
    }

    pub fn max_indices_per_draw(&self) -> usize {
        self.max_primitives_per_batch.saturating_mul(3)
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub packets: usize,
    pub draw_calls: usize,
    pub text_draws: usize,
    pub vertices: usize,
    pub indices: usize,
    /// Batches dropped because their image, font or material was missing.
    pub skipped_batches: usize,
}

struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    max_vertices: usize,
    max_indices: usize,
}

impl Geometry {
    fn has_room(&self, vertices: usize, indices: usize) -> bool {
        self.vertices.len() + vertices <= self.max_vertices
            && self.indices.len() + indices <= self.max_indices
    }

    fn flush<B: RenderBackend + ?Sized>(
        &mut self,
        state: DrawState,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        if self.indices.is_empty() {
            return;
        }
        backend.draw(DrawCall {
            state,
            vertices: &self.vertices,
            indices: &self.indices,
        });
        stats.draw_calls += 1;
        stats.vertices += self.vertices.len();
        stats.indices += self.indices.len();
        self.vertices.clear();
        self.indices.clear();
    }

    /// Emit uniform quads, flushing every time the buffer fills.
    fn quads<B: RenderBackend + ?Sized>(
        &mut self,
        template: &QuadTemplate,
        transforms: &[RenderableTransform],
        simd: bool,
        state: DrawState,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let mut rest = transforms;
        while !rest.is_empty() {
            let room = ((self.max_vertices - self.vertices.len()) / QUAD_VERTICES)
                .min((self.max_indices - self.indices.len()) / QUAD_INDICES);
            if room == 0 {
                self.flush(state, backend, stats);
                continue;
            }
            let (now, later) = rest.split_at(room.min(rest.len()));
            emit_quads(template, now, &mut self.vertices, &mut self.indices, simd);
            rest = later;
        }
        self.flush(state, backend, stats);
    }
}

pub struct RenderSystem {
    config: RenderConfig,
    clear_color: Color,
    geometry: Geometry,
    circle: CircleTable,
}

impl RenderSystem {
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            budget = config.max_primitives_per_batch,
            simd = config.simd,
            "render system ready"
        );
        let vertex_capacity = config.max_vertices_per_draw().min(INITIAL_VERTEX_CAPACITY);
        let geometry = Geometry {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(vertex_capacity / QUAD_VERTICES * QUAD_INDICES),
            max_vertices: config.max_vertices_per_draw(),
            max_indices: config.max_indices_per_draw(),
        };
        Ok(Self {
            clear_color: config.clear_color,
            circle: CircleTable::new(config.circle_segments),
            geometry,
            config,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Draw every packet of `frame` in order and present.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        camera: &Camera2D,
        backend: &mut B,
    ) -> Result<RenderStats, BackendError> {
        let mut stats = RenderStats {
            packets: frame.packets().len(),
            ..RenderStats::default()
        };
        backend.begin_frame(camera.view_projection(), self.clear_color)?;

        // Nothing from a dropped frame is carried over.
        self.geometry.vertices.clear();
        self.geometry.indices.clear();

        for packet in frame.packets() {
            match &packet.batch {
                PacketBatch::Sprite(batch) => self.sprite_batch(frame, batch, backend, &mut stats),
                PacketBatch::Text(batch) => self.text_batch(frame, batch, backend, &mut stats),
                PacketBatch::Rect(batch) => self.rect_batch(frame, batch, backend, &mut stats),
                PacketBatch::Circle(batch) => self.circle_batch(frame, batch, backend, &mut stats),
                PacketBatch::Line(batch) => self.line_batch(frame, batch, backend, &mut stats),
                PacketBatch::Atlas(batch) => self.atlas_batch(frame, batch, backend, &mut stats),
                PacketBatch::Shader(batch) => self.shader_batch(frame, batch, backend, &mut stats),
            }
        }

        if stats.skipped_batches > 0 {
            tracing::warn!(
                skipped = stats.skipped_batches,
                "skipped batches with missing image, font or material"
            );
        }

        backend.end_frame()?;
        tracing::trace!(
            draw_calls = stats.draw_calls,
            text_draws = stats.text_draws,
            vertices = stats.vertices,
            "frame rendered"
        );
        Ok(stats)
    }

    fn sprite_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<SpriteShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let shared = &batch.shared;
        let Some(image) = shared.image else {
            stats.skipped_batches += 1;
            return;
        };
        let template =
            QuadTemplate::sprite(&image, &shared.source, self.config.pixels_per_unit, shared.color);
        let state = DrawState {
            texture: Some(image),
            sampler: shared.sampler,
            material: shared.material,
        };
        self.geometry.quads(
            &template,
            frame.transforms(batch.transforms),
            self.config.simd,
            state,
            backend,
            stats,
        );
    }

    fn rect_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<RectShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let template = QuadTemplate::centered(batch.shared.size, UNIT_UV, batch.shared.color);
        self.geometry.quads(
            &template,
            frame.transforms(batch.transforms),
            self.config.simd,
            DrawState::FLAT,
            backend,
            stats,
        );
    }

    fn line_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<LineShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let shared = &batch.shared;
        let template = QuadTemplate::line(shared.length, shared.thickness, shared.color);
        self.geometry.quads(
            &template,
            frame.transforms(batch.transforms),
            self.config.simd,
            DrawState::FLAT,
            backend,
            stats,
        );
    }

    fn shader_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<ShaderShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let Some(material) = batch.shared.material else {
            stats.skipped_batches += 1;
            return;
        };
        let template = QuadTemplate::centered(batch.shared.size, UNIT_UV, batch.shared.color);
        let state = DrawState {
            material,
            ..DrawState::FLAT
        };
        self.geometry.quads(
            &template,
            frame.transforms(batch.transforms),
            self.config.simd,
            state,
            backend,
            stats,
        );
    }

    fn circle_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<CircleShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let (vertex_count, index_count) = (self.circle.vertex_count(), self.circle.index_count());
        let color = batch.shared.color.packed();
        for transform in frame.transforms(batch.transforms) {
            if !self.geometry.has_room(vertex_count, index_count) {
                self.geometry.flush(DrawState::FLAT, backend, stats);
            }
            self.circle.emit(
                batch.shared.radius,
                color,
                transform,
                &mut self.geometry.vertices,
                &mut self.geometry.indices,
            );
        }
        self.geometry.flush(DrawState::FLAT, backend, stats);
    }

    fn atlas_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<AtlasShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let shared = &batch.shared;
        let Some(image) = shared.image else {
            stats.skipped_batches += 1;
            return;
        };
        let state = DrawState {
            texture: Some(image),
            sampler: shared.sampler,
            material: shared.material,
        };
        let transforms = frame.transforms(batch.transforms);
        let frames = frame.frames(batch.extras);
        debug_assert_eq!(transforms.len(), frames.len());

        for (transform, source) in transforms.iter().zip(frames) {
            if !self.geometry.has_room(QUAD_VERTICES, QUAD_INDICES) {
                self.geometry.flush(state, backend, stats);
            }
            let template =
                QuadTemplate::sprite(&image, source, self.config.pixels_per_unit, shared.color);
            emit_quads_scalar(
                &template,
                std::slice::from_ref(transform),
                &mut self.geometry.vertices,
                &mut self.geometry.indices,
            );
        }
        self.geometry.flush(state, backend, stats);
    }

    fn text_batch<B: RenderBackend + ?Sized>(
        &mut self,
        frame: &InterpolatedFrame<'_>,
        batch: &Batch<TextShared>,
        backend: &mut B,
        stats: &mut RenderStats,
    ) {
        let shared = &batch.shared;
        let Some(font) = shared.font else {
            stats.skipped_batches += 1;
            return;
        };
        let metrics = backend.font_metrics(font, shared.size);
        let to_world = Affine2::from_scale(Vec2::splat(1.0 / self.config.pixels_per_unit));

        let transforms = frame.transforms(batch.transforms);
        let texts = frame.texts(batch.extras);
        debug_assert_eq!(transforms.len(), texts.len());

        for (transform, text) in transforms.iter().zip(texts) {
            let instance = instance_affine(transform) * to_world;
            let count = split_lines(text).count();
            for (index, line) in split_lines(text).enumerate() {
                if line.is_empty() {
                    continue;
                }
                let width = backend.measure_text(font, shared.size, line);
                let origin = line_origin(&metrics, shared.align, index, count, width);
                backend.draw_text(TextDraw {
                    font,
                    size: shared.size,
                    color: shared.color,
                    text: line,
                    transform: instance * Affine2::from_translation(origin),
                });
                stats.text_draws += 1;
            }
        }
    }
}

/// Scale, then rotate, then translate; the same mapping as [`RenderableTransform::apply`].
pub fn instance_affine(transform: &RenderableTransform) -> Affine2 {
    let x_axis = Vec2::new(transform.cos, transform.sin) * transform.scale.x;
    let y_axis = Vec2::new(-transform.sin, transform.cos) * transform.scale.y;
    Affine2::from_mat2_translation(Mat2::from_cols(x_axis, y_axis), transform.position)
}
