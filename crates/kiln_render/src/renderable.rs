//! Per-entity visual state
//!
//! The simulation produces one [`Renderable`] per visible entity every tick.
//! Each carries exactly one [`RenderData`] variant describing what to draw.

use glam::{UVec2, Vec2};

/// Stable identity of a logical entity across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Authoritative 2D transform as extracted from the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: Vec2,
    /// Radians, counter-clockwise.
    pub rotation: f32,
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Render-ready transform with the rotation's sine and cosine precomputed.
///
/// Never authoritative: always rebuilt from a [`Transform2D`] or an interpolated one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableTransform {
    pub position: Vec2,
    pub scale: Vec2,
    pub sin: f32,
    pub cos: f32,
}

impl RenderableTransform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        sin: 0.0,
        cos: 1.0,
    };

    /// Map a point from local space to world space (scale, rotate, translate).
    #[inline]
    pub fn apply(&self, local: Vec2) -> Vec2 {
        let lx = local.x * self.scale.x;
        let ly = local.y * self.scale.y;
        Vec2::new(
            lx * self.cos - ly * self.sin + self.position.x,
            lx * self.sin + ly * self.cos + self.position.y,
        )
    }
}

impl Default for RenderableTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<&Transform2D> for RenderableTransform {
    fn from(transform: &Transform2D) -> Self {
        let (sin, cos) = transform.rotation.sin_cos();
        Self {
            position: transform.position,
            scale: transform.scale,
            sin,
            cos,
        }
    }
}

/// 8-bit per channel RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize normalized channels to 8 bits.
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgba(q(rgba[0]), q(rgba[1]), q(rgba[2]), q(rgba[3]))
    }

    /// Packed in memory order R, G, B, A (matches a `Unorm8x4` vertex attribute).
    #[inline]
    pub const fn packed(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    pub fn to_f64(self) -> [f64; 4] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            f64::from(self.a) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    Repeat,
}

/// Sampler state shared by every instance of a textured batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerMode {
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

impl SamplerMode {
    pub const fn bits(self) -> u32 {
        let filter = match self.filter {
            FilterMode::Nearest => 0,
            FilterMode::Linear => 1,
        };
        let wrap = match self.wrap {
            WrapMode::Clamp => 0,
            WrapMode::Repeat => 1,
        };
        filter | (wrap << 1)
    }
}

/// Axis-aligned rectangle in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Float bit patterns, for exact value equality in batch keys.
    pub fn bits(&self) -> [u32; 4] {
        [
            self.x.to_bits(),
            self.y.to_bits(),
            self.w.to_bits(),
            self.h.to_bits(),
        ]
    }
}

/// Handle to a loaded image. Identity is the id; the size rides along so the
/// rasterizer can compute texture coordinates without an asset lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub id: u32,
    pub size: UVec2,
}

impl ImageRef {
    pub const fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            size: UVec2::new(width, height),
        }
    }

    /// Normalized `[u0, v0, u1, v1]` for a pixel rectangle of this image.
    pub fn uv_rect(&self, source: &Rect) -> [f32; 4] {
        let w = self.size.x.max(1) as f32;
        let h = self.size.y.max(1) as f32;
        [
            source.x / w,
            source.y / h,
            (source.x + source.w) / w,
            (source.y + source.h) / h,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub u32);

impl MaterialId {
    pub const DEFAULT: Self = Self(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextAlign {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

impl TextAlign {
    pub const fn new(horizontal: HAlign, vertical: VAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub const fn bits(self) -> u32 {
        let h = match self.horizontal {
            HAlign::Left => 0,
            HAlign::Center => 1,
            HAlign::Right => 2,
        };
        let v = match self.vertical {
            VAlign::Top => 0,
            VAlign::Middle => 1,
            VAlign::Bottom => 2,
        };
        h | (v << 2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteData {
    pub image: Option<ImageRef>,
    pub material: MaterialId,
    pub source: Rect,
    pub color: Color,
    pub sampler: SamplerMode,
}

impl SpriteData {
    /// Whole-image sprite with default material and sampler.
    pub fn new(image: ImageRef) -> Self {
        Self {
            image: Some(image),
            material: MaterialId::DEFAULT,
            source: Rect::new(0.0, 0.0, image.size.x as f32, image.size.y as f32),
            color: Color::WHITE,
            sampler: SamplerMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub font: Option<FontId>,
    /// Font size in pixels.
    pub size: f32,
    pub text: String,
    pub color: Color,
    pub align: TextAlign,
}

/// Filled, axis-aligned (before rotation) rectangle centered on the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct RectData {
    pub size: Vec2,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleData {
    pub radius: f32,
    pub color: Color,
}

/// Segment from the transform origin along local +X.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub length: f32,
    pub thickness: f32,
    pub color: Color,
}

/// Sprite whose source frame varies per instance within one shared atlas image.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasData {
    pub image: Option<ImageRef>,
    pub material: MaterialId,
    pub frame: Rect,
    pub color: Color,
    pub sampler: SamplerMode,
}

/// Quad drawn with a custom material; UVs span 0..1.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderData {
    pub material: Option<MaterialId>,
    pub size: Vec2,
    pub color: Color,
}

/// What to draw for one entity. Closed set; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderData {
    Sprite(SpriteData),
    Text(TextData),
    Rect(RectData),
    Circle(CircleData),
    Line(LineData),
    Atlas(AtlasData),
    Shader(ShaderData),
}

/// One entity's visual state for one simulation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub entity_id: EntityId,
    pub z_index: i32,
    /// Reserved secondary order; carried through but not used for sorting.
    pub sort_key: i32,
    pub transform: Transform2D,
    pub data: RenderData,
}

impl Renderable {
    pub fn new(entity_id: EntityId, transform: Transform2D, data: RenderData) -> Self {
        Self {
            entity_id,
            z_index: 0,
            sort_key: 0,
            transform,
            data,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_sort_key(mut self, sort_key: i32) -> Self {
        self.sort_key = sort_key;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn renderable_transform_precomputes_trig() {
        let t = Transform2D::from_position(Vec2::new(1.0, 2.0)).with_rotation(FRAC_PI_2);
        let r = RenderableTransform::from(&t);
        assert_relative_eq!(r.sin, 1.0, epsilon = 1e-6);
        assert_relative_eq!(r.cos, 0.0, epsilon = 1e-6);

        // (1, 0) rotated a quarter turn lands on (0, 1), then translated.
        let p = r.apply(Vec2::new(1.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn color_packs_in_memory_order() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(c.packed().to_le_bytes(), [1, 2, 3, 4]);
        assert_eq!(Color::from_f32([1.0, 0.0, 0.5, 1.0]), Color::rgba(255, 0, 128, 255));
    }

    #[test]
    fn uv_rect_normalizes_by_image_size() {
        let image = ImageRef::new(1, 64, 32);
        let uv = image.uv_rect(&Rect::new(16.0, 0.0, 16.0, 16.0));
        assert_eq!(uv, [0.25, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn alignment_bits_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for h in [HAlign::Left, HAlign::Center, HAlign::Right] {
            for v in [VAlign::Top, VAlign::Middle, VAlign::Bottom] {
                assert!(seen.insert(TextAlign::new(h, v).bits()));
            }
        }
    }
}
