//! Render packets
//!
//! One packet per non-empty batch group. Per-instance arrays live in the
//! interpolator's frame arenas and are addressed by [`ArenaSpan`].

use crate::batch::{
    AtlasShared, BatchKind, CircleShared, LineShared, RectShared, ShaderShared, SpriteShared,
    TextShared,
};
use kiln_core::memory::ArenaSpan;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<S> {
    pub shared: S,
    pub transforms: ArenaSpan,
    /// Per-instance payload parallel to `transforms` (strings for text, frames for atlas).
    pub extras: ArenaSpan,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketBatch {
    Sprite(Batch<SpriteShared>),
    Text(Batch<TextShared>),
    Rect(Batch<RectShared>),
    Circle(Batch<CircleShared>),
    Line(Batch<LineShared>),
    Atlas(Batch<AtlasShared>),
    Shader(Batch<ShaderShared>),
}

impl PacketBatch {
    pub fn kind(&self) -> BatchKind {
        match self {
            Self::Sprite(_) => BatchKind::Sprite,
            Self::Text(_) => BatchKind::Text,
            Self::Rect(_) => BatchKind::Rect,
            Self::Circle(_) => BatchKind::Circle,
            Self::Line(_) => BatchKind::Line,
            Self::Atlas(_) => BatchKind::Atlas,
            Self::Shader(_) => BatchKind::Shader,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::Sprite(b) => b.count,
            Self::Text(b) => b.count,
            Self::Rect(b) => b.count,
            Self::Circle(b) => b.count,
            Self::Line(b) => b.count,
            Self::Atlas(b) => b.count,
            Self::Shader(b) => b.count,
        }
    }

    pub fn transforms(&self) -> ArenaSpan {
        match self {
            Self::Sprite(b) => b.transforms,
            Self::Text(b) => b.transforms,
            Self::Rect(b) => b.transforms,
            Self::Circle(b) => b.transforms,
            Self::Line(b) => b.transforms,
            Self::Atlas(b) => b.transforms,
            Self::Shader(b) => b.transforms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPacket {
    pub z_index: i32,
    pub batch: PacketBatch,
}
