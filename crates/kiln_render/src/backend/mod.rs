//! Rendering backend abstraction
//!
//! The render system only talks to a [`RenderBackend`]: it opens a frame, hands
//! over flushed vertex/index streams and positioned text lines, then closes the
//! frame. Backends never call back into the frame pipeline.

mod headless;
mod wgpu_backend;

pub use headless::{HeadlessBackend, RecordedDraw, RecordedText};
pub use wgpu_backend::{query_capabilities, WgpuBackend};

use crate::raster::{FontMetrics, Vertex};
use crate::renderable::{Color, FontId, ImageRef, MaterialId, SamplerMode};
use glam::{Affine2, Mat4};
use thiserror::Error;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL / WebGL (fallback)
    OpenGL,
    /// WebGPU in the browser
    BrowserWebGpu,
    /// No GPU; draw calls are recorded only
    Headless,
}

/// Capabilities reported by the adapter
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    pub backend: BackendType,
    pub max_texture_size: u32,
    pub max_buffer_size: u64,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("surface lost or outdated; frame skipped")]
    SurfaceLost,

    #[error("timed out acquiring the next surface texture")]
    Timeout,

    #[error("GPU out of memory")]
    OutOfMemory,

    #[error("failed to create surface: {0}")]
    CreateSurface(String),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to open device: {0}")]
    RequestDevice(String),

    #[error("image {id} is not registered")]
    UnknownImage { id: u32 },

    #[error("image {id} data is {actual} bytes, expected {expected}")]
    ImageSize { id: u32, expected: usize, actual: usize },

    #[error("end_frame called without begin_frame")]
    NoFrame,
}

/// Pipeline state for one flushed draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    /// `None` draws with a plain white texture (flat-color geometry).
    pub texture: Option<ImageRef>,
    pub sampler: SamplerMode,
    pub material: MaterialId,
}

impl DrawState {
    pub const FLAT: Self = Self {
        texture: None,
        sampler: SamplerMode {
            filter: crate::renderable::FilterMode::Linear,
            wrap: crate::renderable::WrapMode::Clamp,
        },
        material: MaterialId::DEFAULT,
    };
}

/// One draw call. Indices are relative to the start of `vertices`.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub state: DrawState,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
}

/// One line of text. `transform` maps the line's baseline-left pixel space to world space.
#[derive(Debug, Clone, Copy)]
pub struct TextDraw<'a> {
    pub font: FontId,
    pub size: f32,
    pub color: Color,
    pub text: &'a str,
    pub transform: Affine2,
}

pub trait RenderBackend {
    fn begin_frame(&mut self, view_projection: Mat4, clear: Color) -> Result<(), BackendError>;

    fn draw(&mut self, call: DrawCall<'_>);

    fn draw_text(&mut self, text: TextDraw<'_>);

    fn font_metrics(&self, font: FontId, size: f32) -> FontMetrics;

    /// Advance width of `text` in pixels.
    fn measure_text(&self, font: FontId, size: f32, text: &str) -> f32;

    /// Submit and present.
    fn end_frame(&mut self) -> Result<(), BackendError>;
}

/// Fixed-pitch metrics used where no glyph rasterizer is attached.
pub fn monospace_metrics(size: f32) -> FontMetrics {
    FontMetrics {
        ascent: size * 0.8,
        descent: size * 0.2,
        line_gap: 0.0,
    }
}

pub fn monospace_width(size: f32, text: &str) -> f32 {
    text.chars().count() as f32 * size * 0.5
}
