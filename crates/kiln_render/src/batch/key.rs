//! Batch keys
//!
//! A [`BatchKey`] packs every piece of state that must match for two instances to
//! share a draw call. The hash is computed once at construction so map lookups
//! never rehash the fields.

use crate::renderable::{Color, FontId, ImageRef, MaterialId, Rect, SamplerMode, TextAlign};
use glam::Vec2;
use kiln_core::math::hash_combine;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Presence bits: a missing handle never compares equal to any real id.
const HAS_RESOURCE: u32 = 1;
const HAS_MATERIAL: u32 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Sprite,
    Text,
    Rect,
    Circle,
    Line,
    Atlas,
    Shader,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchKey {
    kind: BatchKind,
    present: u32,
    resource: u32,
    material: u32,
    /// Image size; texture coordinates depend on it.
    extent: [u32; 2],
    color: u32,
    mode: u32,
    params: [u32; 4],
    z_index: i32,
    hash: u64,
}

impl BatchKey {
    #[allow(clippy::too_many_arguments)]
    fn pack(
        kind: BatchKind,
        resource: Option<u32>,
        material: Option<u32>,
        extent: [u32; 2],
        color: Color,
        mode: u32,
        params: [u32; 4],
        z_index: i32,
    ) -> Self {
        let present = resource.map_or(0, |_| HAS_RESOURCE) | material.map_or(0, |_| HAS_MATERIAL);
        let resource = resource.unwrap_or(0);
        let material = material.unwrap_or(0);
        let color = color.packed();
        let mut hash = hash_combine(0, kind as u64 | (u64::from(present) << 8));
        hash = hash_combine(hash, u64::from(resource) | (u64::from(material) << 32));
        hash = hash_combine(hash, u64::from(extent[0]) | (u64::from(extent[1]) << 32));
        hash = hash_combine(hash, u64::from(color) | (u64::from(mode) << 32));
        hash = hash_combine(hash, u64::from(params[0]) | (u64::from(params[1]) << 32));
        hash = hash_combine(hash, u64::from(params[2]) | (u64::from(params[3]) << 32));
        hash = hash_combine(hash, z_index as u32 as u64);

        Self {
            kind,
            present,
            resource,
            material,
            extent,
            color,
            mode,
            params,
            z_index,
            hash,
        }
    }

    pub fn sprite(
        image: Option<ImageRef>,
        material: MaterialId,
        color: Color,
        sampler: SamplerMode,
        source: &Rect,
        z_index: i32,
    ) -> Self {
        Self::pack(
            BatchKind::Sprite,
            image.map(|i| i.id),
            Some(material.0),
            image_extent(image),
            color,
            sampler.bits(),
            source.bits(),
            z_index,
        )
    }

    pub fn text(
        font: Option<FontId>,
        size: f32,
        color: Color,
        align: TextAlign,
        z_index: i32,
    ) -> Self {
        Self::pack(
            BatchKind::Text,
            font.map(|f| f.0),
            None,
            [0; 2],
            color,
            align.bits(),
            [size.to_bits(), 0, 0, 0],
            z_index,
        )
    }

    pub fn rect(size: Vec2, color: Color, z_index: i32) -> Self {
        Self::pack(
            BatchKind::Rect,
            None,
            None,
            [0; 2],
            color,
            0,
            [size.x.to_bits(), size.y.to_bits(), 0, 0],
            z_index,
        )
    }

    pub fn circle(radius: f32, color: Color, z_index: i32) -> Self {
        Self::pack(
            BatchKind::Circle,
            None,
            None,
            [0; 2],
            color,
            0,
            [radius.to_bits(), 0, 0, 0],
            z_index,
        )
    }

    pub fn line(length: f32, thickness: f32, color: Color, z_index: i32) -> Self {
        Self::pack(
            BatchKind::Line,
            None,
            None,
            [0; 2],
            color,
            0,
            [length.to_bits(), thickness.to_bits(), 0, 0],
            z_index,
        )
    }

    /// Atlas frames vary per instance, so they are not part of the key.
    pub fn atlas(
        image: Option<ImageRef>,
        material: MaterialId,
        color: Color,
        sampler: SamplerMode,
        z_index: i32,
    ) -> Self {
        Self::pack(
            BatchKind::Atlas,
            image.map(|i| i.id),
            Some(material.0),
            image_extent(image),
            color,
            sampler.bits(),
            [0; 4],
            z_index,
        )
    }

    pub fn shader(material: Option<MaterialId>, size: Vec2, color: Color, z_index: i32) -> Self {
        Self::pack(
            BatchKind::Shader,
            None,
            material.map(|m| m.0),
            [0; 2],
            color,
            0,
            [size.x.to_bits(), size.y.to_bits(), 0, 0],
            z_index,
        )
    }

    #[inline]
    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    #[inline]
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    #[inline]
    pub fn precomputed_hash(&self) -> u64 {
        self.hash
    }
}

fn image_extent(image: Option<ImageRef>) -> [u32; 2] {
    image.map_or([0; 2], |i| i.size.to_array())
}

/// Field-wise equality; the hash is never trusted to decide identity.
impl PartialEq for BatchKey {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.present == other.present
            && self.resource == other.resource
            && self.material == other.material
            && self.extent == other.extent
            && self.color == other.color
            && self.mode == other.mode
            && self.params == other.params
            && self.z_index == other.z_index
    }
}

impl Eq for BatchKey {}

impl Hash for BatchKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Hasher that forwards a key's precomputed hash unchanged.
#[derive(Default)]
pub struct PrecomputedHasher {
    hash: u64,
}

impl Hasher for PrecomputedHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.hash = value;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = hash_combine(self.hash, u64::from(byte));
        }
    }
}

pub type BuildPrecomputedHasher = BuildHasherDefault<PrecomputedHasher>;
