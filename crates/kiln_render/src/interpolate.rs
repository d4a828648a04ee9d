//! Interpolation and batching pass
//!
//! Once per displayed frame the render thread blends the two most recent
//! simulation ticks by `alpha`, groups the results by [`BatchKey`], and lays the
//! per-instance arrays out in frame arenas. The returned [`InterpolatedFrame`]
//! borrows the interpolator, so its packets cannot outlive the next pass.

use crate::batch::{
    AtlasShared, BatchGroup, BatchGroups, BatchKey, BatchKind, CircleShared, LineShared,
    RectShared, ShaderShared, SpriteShared, TextShared,
};
use crate::packet::{Batch, PacketBatch, RenderPacket};
use crate::renderable::{EntityId, Rect, RenderData, Renderable, RenderableTransform, Transform2D};
use crate::store::RenderableStore;
use ahash::AHashMap;
use kiln_core::math::{lerp_vec2, RotationInterpolation};
use kiln_core::memory::{ArenaSpan, FrameArena};

/// Counters for one interpolation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub renderables: usize,
    pub groups: usize,
    pub packets: usize,
    /// Entities blended between `prev` and `curr`.
    pub interpolated: usize,
    /// Entities with no previous sample, drawn at their current transform.
    pub snapped: usize,
}

/// Blend two transforms. `t = 0` yields `from`, `t = 1` yields `to`.
pub fn interpolate_transform(
    from: &Transform2D,
    to: &Transform2D,
    t: f32,
    rotation: RotationInterpolation,
) -> Transform2D {
    Transform2D {
        position: lerp_vec2(from.position, to.position, t),
        scale: lerp_vec2(from.scale, to.scale, t),
        rotation: rotation.blend(from.rotation, to.rotation, t),
    }
}

pub struct FrameInterpolator {
    rotation: RotationInterpolation,
    previous: AHashMap<EntityId, Transform2D>,

    sprites: BatchGroups<SpriteShared>,
    texts: BatchGroups<TextShared, String>,
    rects: BatchGroups<RectShared>,
    circles: BatchGroups<CircleShared>,
    lines: BatchGroups<LineShared>,
    atlases: BatchGroups<AtlasShared, Rect>,
    shaders: BatchGroups<ShaderShared>,
    discovery: Vec<(BatchKind, usize)>,

    transform_arena: FrameArena<RenderableTransform>,
    text_arena: FrameArena<String>,
    frame_arena: FrameArena<Rect>,
    packets: Vec<RenderPacket>,
    stats: FrameStats,
}

impl FrameInterpolator {
    pub fn new(rotation: RotationInterpolation) -> Self {
        Self {
            rotation,
            previous: AHashMap::new(),
            sprites: BatchGroups::new(),
            texts: BatchGroups::new(),
            rects: BatchGroups::new(),
            circles: BatchGroups::new(),
            lines: BatchGroups::new(),
            atlases: BatchGroups::new(),
            shaders: BatchGroups::new(),
            discovery: Vec::new(),
            transform_arena: FrameArena::new(),
            text_arena: FrameArena::new(),
            frame_arena: FrameArena::new(),
            packets: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    pub fn rotation_mode(&self) -> RotationInterpolation {
        self.rotation
    }

    pub fn set_rotation_mode(&mut self, rotation: RotationInterpolation) {
        self.rotation = rotation;
    }

    /// Build this frame's packets from the store's `prev`/`curr` pair.
    ///
    /// `alpha` is clamped to `[0, 1]`; NaN is treated as 1.
    pub fn interpolate(&mut self, store: &RenderableStore, alpha: f32) -> InterpolatedFrame<'_> {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };

        store.with_generations(|prev, curr| {
            self.reset();
            self.collect_previous(prev);
            for renderable in curr {
                let transform = match self.previous.get(&renderable.entity_id) {
                    Some(from) => {
                        self.stats.interpolated += 1;
                        interpolate_transform(from, &renderable.transform, alpha, self.rotation)
                    }
                    None => {
                        self.stats.snapped += 1;
                        renderable.transform
                    }
                };
                self.push_instance(renderable, RenderableTransform::from(&transform));
            }
            self.stats.renderables = curr.len();
        });

        self.emit_packets();
        self.packets.sort_by_key(|packet| packet.z_index);

        self.stats.groups = self.discovery.len();
        self.stats.packets = self.packets.len();
        tracing::debug!(
            renderables = self.stats.renderables,
            packets = self.stats.packets,
            snapped = self.stats.snapped,
            "interpolated frame"
        );

        InterpolatedFrame {
            packets: &self.packets,
            transforms: &self.transform_arena,
            texts: &self.text_arena,
            frames: &self.frame_arena,
            stats: self.stats,
        }
    }

    fn reset(&mut self) {
        self.previous.clear();
        self.sprites.clear();
        self.texts.clear();
        self.rects.clear();
        self.circles.clear();
        self.lines.clear();
        self.atlases.clear();
        self.shaders.clear();
        self.discovery.clear();
        self.transform_arena.reset();
        self.text_arena.reset();
        self.frame_arena.reset();
        self.packets.clear();
        self.stats = FrameStats::default();
    }

    fn collect_previous(&mut self, prev: &[Renderable]) {
        self.previous.reserve(prev.len());
        for renderable in prev {
            self.previous.insert(renderable.entity_id, renderable.transform);
        }
    }

    fn push_instance(&mut self, renderable: &Renderable, transform: RenderableTransform) {
        let z = renderable.z_index;
        let discovery = &mut self.discovery;
        let mut discovered = |kind: BatchKind, (index, created): (usize, bool)| {
            if created {
                discovery.push((kind, index));
            }
            index
        };

        match &renderable.data {
            RenderData::Sprite(data) => {
                let key = BatchKey::sprite(
                    data.image,
                    data.material,
                    data.color,
                    data.sampler,
                    &data.source,
                    z,
                );
                let found = self.sprites.find_or_create(key, || SpriteShared::from(data));
                let index = discovered(BatchKind::Sprite, found);
                self.sprites.get_mut(index).push(transform);
            }
            RenderData::Text(data) => {
                let key = BatchKey::text(data.font, data.size, data.color, data.align, z);
                let found = self.texts.find_or_create(key, || TextShared::from(data));
                let index = discovered(BatchKind::Text, found);
                self.texts
                    .get_mut(index)
                    .push_with(transform, data.text.clone());
            }
            RenderData::Rect(data) => {
                let key = BatchKey::rect(data.size, data.color, z);
                let found = self.rects.find_or_create(key, || RectShared::from(data));
                let index = discovered(BatchKind::Rect, found);
                self.rects.get_mut(index).push(transform);
            }
            RenderData::Circle(data) => {
                let key = BatchKey::circle(data.radius, data.color, z);
                let found = self.circles.find_or_create(key, || CircleShared::from(data));
                let index = discovered(BatchKind::Circle, found);
                self.circles.get_mut(index).push(transform);
            }
            RenderData::Line(data) => {
                let key = BatchKey::line(data.length, data.thickness, data.color, z);
                let found = self.lines.find_or_create(key, || LineShared::from(data));
                let index = discovered(BatchKind::Line, found);
                self.lines.get_mut(index).push(transform);
            }
            RenderData::Atlas(data) => {
                let key = BatchKey::atlas(data.image, data.material, data.color, data.sampler, z);
                let found = self.atlases.find_or_create(key, || AtlasShared::from(data));
                let index = discovered(BatchKind::Atlas, found);
                self.atlases.get_mut(index).push_with(transform, data.frame);
            }
            RenderData::Shader(data) => {
                let key = BatchKey::shader(data.material, data.size, data.color, z);
                let found = self.shaders.find_or_create(key, || ShaderShared::from(data));
                let index = discovered(BatchKind::Shader, found);
                self.shaders.get_mut(index).push(transform);
            }
        }
    }

    fn emit_packets(&mut self) {
        let transforms = &mut self.transform_arena;
        for &(kind, index) in &self.discovery {
            let (z_index, batch) = match kind {
                BatchKind::Sprite => {
                    let (z, b) = plain_batch(self.sprites.get(index), transforms);
                    (z, PacketBatch::Sprite(b))
                }
                BatchKind::Text => {
                    let (z, b) =
                        batch_with_extras(self.texts.get(index), transforms, &mut self.text_arena);
                    (z, PacketBatch::Text(b))
                }
                BatchKind::Rect => {
                    let (z, b) = plain_batch(self.rects.get(index), transforms);
                    (z, PacketBatch::Rect(b))
                }
                BatchKind::Circle => {
                    let (z, b) = plain_batch(self.circles.get(index), transforms);
                    (z, PacketBatch::Circle(b))
                }
                BatchKind::Line => {
                    let (z, b) = plain_batch(self.lines.get(index), transforms);
                    (z, PacketBatch::Line(b))
                }
                BatchKind::Atlas => {
                    let (z, b) = batch_with_extras(
                        self.atlases.get(index),
                        transforms,
                        &mut self.frame_arena,
                    );
                    (z, PacketBatch::Atlas(b))
                }
                BatchKind::Shader => {
                    let (z, b) = plain_batch(self.shaders.get(index), transforms);
                    (z, PacketBatch::Shader(b))
                }
            };
            if batch.count() > 0 {
                self.packets.push(RenderPacket { z_index, batch });
            }
        }
    }
}

impl Default for FrameInterpolator {
    fn default() -> Self {
        Self::new(RotationInterpolation::default())
    }
}

fn plain_batch<S: Copy>(
    group: &BatchGroup<S>,
    transforms: &mut FrameArena<RenderableTransform>,
) -> (i32, Batch<S>) {
    let batch = Batch {
        shared: group.shared,
        transforms: transforms.fill(&group.transforms),
        extras: ArenaSpan::EMPTY,
        count: group.len(),
    };
    (group.key.z_index(), batch)
}

fn batch_with_extras<S: Copy, X: Clone + Default>(
    group: &BatchGroup<S, X>,
    transforms: &mut FrameArena<RenderableTransform>,
    extras: &mut FrameArena<X>,
) -> (i32, Batch<S>) {
    debug_assert_eq!(group.transforms.len(), group.extras.len());
    let batch = Batch {
        shared: group.shared,
        transforms: transforms.fill(&group.transforms),
        extras: extras.fill(&group.extras),
        count: group.len(),
    };
    (group.key.z_index(), batch)
}

/// One pass's output. Valid until the next call to [`FrameInterpolator::interpolate`].
#[derive(Clone, Copy)]
pub struct InterpolatedFrame<'a> {
    packets: &'a [RenderPacket],
    transforms: &'a FrameArena<RenderableTransform>,
    texts: &'a FrameArena<String>,
    frames: &'a FrameArena<Rect>,
    stats: FrameStats,
}

impl<'a> InterpolatedFrame<'a> {
    /// Packets in ascending `z_index`, discovery order within equal z.
    pub fn packets(&self) -> &'a [RenderPacket] {
        self.packets
    }

    pub fn transforms(&self, span: ArenaSpan) -> &'a [RenderableTransform] {
        self.transforms.get(span)
    }

    pub fn texts(&self, span: ArenaSpan) -> &'a [String] {
        self.texts.get(span)
    }

    pub fn frames(&self, span: ArenaSpan) -> &'a [Rect] {
        self.frames.get(span)
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }
}
