//! Recording backend with no GPU.

use super::{
    monospace_metrics, monospace_width, BackendError, DrawCall, DrawState, RenderBackend, TextDraw,
};
use crate::raster::{FontMetrics, Vertex};
use crate::renderable::{Color, FontId};
use glam::{Affine2, Mat4};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub state: DrawState,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedText {
    pub font: FontId,
    pub size: f32,
    pub color: Color,
    pub text: String,
    pub transform: Affine2,
}

/// Keeps every call of the most recent frame.
#[derive(Default)]
pub struct HeadlessBackend {
    pub view_projection: Mat4,
    pub clear: Color,
    pub draws: Vec<RecordedDraw>,
    pub texts: Vec<RecordedText>,
    pub frames_presented: u64,
    in_frame: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All draws of the frame merged into one stream, indices rebased.
    pub fn merged(&self) -> (Vec<Vertex>, Vec<u32>) {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for draw in &self.draws {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&draw.vertices);
            indices.extend(draw.indices.iter().map(|i| i + base));
        }
        (vertices, indices)
    }
}

impl RenderBackend for HeadlessBackend {
    fn begin_frame(&mut self, view_projection: Mat4, clear: Color) -> Result<(), BackendError> {
        self.view_projection = view_projection;
        self.clear = clear;
        self.draws.clear();
        self.texts.clear();
        self.in_frame = true;
        Ok(())
    }

    fn draw(&mut self, call: DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            state: call.state,
            vertices: call.vertices.to_vec(),
            indices: call.indices.to_vec(),
        });
    }

    fn draw_text(&mut self, text: TextDraw<'_>) {
        self.texts.push(RecordedText {
            font: text.font,
            size: text.size,
            color: text.color,
            text: text.text.to_owned(),
            transform: text.transform,
        });
    }

    fn font_metrics(&self, _font: FontId, size: f32) -> FontMetrics {
        monospace_metrics(size)
    }

    fn measure_text(&self, _font: FontId, size: f32, text: &str) -> f32 {
        monospace_width(size, text)
    }

    fn end_frame(&mut self) -> Result<(), BackendError> {
        if !std::mem::take(&mut self.in_frame) {
            return Err(BackendError::NoFrame);
        }
        self.frames_presented += 1;
        Ok(())
    }
}
