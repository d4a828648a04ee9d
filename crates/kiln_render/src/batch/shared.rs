//! Key-derived state shared by every instance of a batch.

use crate::renderable::{
    AtlasData, CircleData, Color, FontId, ImageRef, LineData, MaterialId, Rect, RectData,
    SamplerMode, ShaderData, SpriteData, TextAlign, TextData,
};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteShared {
    pub image: Option<ImageRef>,
    pub material: MaterialId,
    pub source: Rect,
    pub color: Color,
    pub sampler: SamplerMode,
}

impl From<&SpriteData> for SpriteShared {
    fn from(data: &SpriteData) -> Self {
        Self {
            image: data.image,
            material: data.material,
            source: data.source,
            color: data.color,
            sampler: data.sampler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShared {
    pub font: Option<FontId>,
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
}

impl From<&TextData> for TextShared {
    fn from(data: &TextData) -> Self {
        Self {
            font: data.font,
            size: data.size,
            color: data.color,
            align: data.align,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectShared {
    pub size: Vec2,
    pub color: Color,
}

impl From<&RectData> for RectShared {
    fn from(data: &RectData) -> Self {
        Self {
            size: data.size,
            color: data.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShared {
    pub radius: f32,
    pub color: Color,
}

impl From<&CircleData> for CircleShared {
    fn from(data: &CircleData) -> Self {
        Self {
            radius: data.radius,
            color: data.color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineShared {
    pub length: f32,
    pub thickness: f32,
    pub color: Color,
}

impl From<&LineData> for LineShared {
    fn from(data: &LineData) -> Self {
        Self {
            length: data.length,
            thickness: data.thickness,
            color: data.color,
        }
    }
}

/// Atlas batches share the image; each instance brings its own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasShared {
    pub image: Option<ImageRef>,
    pub material: MaterialId,
    pub color: Color,
    pub sampler: SamplerMode,
}

impl From<&AtlasData> for AtlasShared {
    fn from(data: &AtlasData) -> Self {
        Self {
            image: data.image,
            material: data.material,
            color: data.color,
            sampler: data.sampler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderShared {
    pub material: Option<MaterialId>,
    pub size: Vec2,
    pub color: Color,
}

impl From<&ShaderData> for ShaderShared {
    fn from(data: &ShaderData) -> Self {
        Self {
            material: data.material,
            size: data.size,
            color: data.color,
        }
    }
}
