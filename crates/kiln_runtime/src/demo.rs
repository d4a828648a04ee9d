//! Demo scene: tinted sprites bouncing inside the view, a player marker
//! steered by input, a tether line and a HUD label.

use glam::Vec2;
use kiln_core::math::DeterministicRng;
use kiln_core::time::SimulationTime;
use kiln_render::pipeline::Simulation;
use kiln_render::renderable::{
    CircleData, Color, EntityId, FontId, HAlign, ImageRef, LineData, RenderData, Renderable,
    SpriteData, TextAlign, TextData, Transform2D, VAlign,
};
use kiln_services::{Button, InputEvent, InputSnapshot, SimCommand};

pub const CHECKER: ImageRef = ImageRef::new(1, 16, 16);

const PLAYER: EntityId = EntityId(1);
const TETHER: EntityId = EntityId(2);
const HUD: EntityId = EntityId(3);
const FIRST_BODY: u64 = 100;

const PLAYER_SPEED: f32 = 240.0;
const BURST: usize = 16;
const MAX_BODIES: usize = 20_000;

/// Each tint is its own sprite batch.
const PALETTE: [Color; 4] = [
    Color::rgba(255, 120, 120, 255),
    Color::rgba(120, 255, 160, 255),
    Color::rgba(130, 170, 255, 255),
    Color::rgba(255, 230, 140, 255),
];

/// RGBA8 two-tone checkerboard with 4x4 pixel cells.
pub fn checker_pixels(image: ImageRef) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(image.size.x as usize * image.size.y as usize * 4);
    for y in 0..image.size.y {
        for x in 0..image.size.x {
            let shade = if (x / 4 + y / 4) % 2 == 0 { 255 } else { 190 };
            pixels.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }
    pixels
}

#[derive(Debug, Clone)]
struct Body {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    spin: f32,
    tint: Color,
}

pub struct Bounce {
    rng: DeterministicRng,
    bounds: Vec2,
    bodies: Vec<Body>,
    next_id: u64,
    player: Vec2,
    input: InputSnapshot,
    ticks: u64,
}

impl Bounce {
    /// `bounds` is the half extent of the arena in world units.
    pub fn new(seed: u64, count: usize, bounds: Vec2) -> Self {
        Self::populate(seed, count, bounds, FIRST_BODY)
    }

    /// Body ids start at `first_id` so they never repeat across resets.
    fn populate(seed: u64, count: usize, bounds: Vec2, first_id: u64) -> Self {
        let mut bounce = Self {
            rng: DeterministicRng::new(seed),
            bounds,
            bodies: Vec::with_capacity(count),
            next_id: first_id,
            player: Vec2::ZERO,
            input: InputSnapshot::default(),
            ticks: 0,
        };
        for _ in 0..count {
            let at = Vec2::new(
                bounce.rng.range_f32(-bounds.x, bounds.x),
                bounce.rng.range_f32(-bounds.y, bounds.y),
            );
            bounce.spawn(at);
        }
        bounce
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn player(&self) -> Vec2 {
        self.player
    }

    fn spawn(&mut self, at: Vec2) {
        if self.bodies.len() >= MAX_BODIES {
            return;
        }
        let angle = self.rng.range_f32(0.0, std::f32::consts::TAU);
        let speed = self.rng.range_f32(40.0, 160.0);
        let tint = PALETTE[self.rng.next_u32() as usize % PALETTE.len()];
        self.bodies.push(Body {
            id: EntityId(self.next_id),
            position: at.clamp(-self.bounds, self.bounds),
            velocity: Vec2::from_angle(angle) * speed,
            rotation: 0.0,
            spin: self.rng.range_f32(-2.0, 2.0),
            tint,
        });
        self.next_id += 1;
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(Button::Action) => {
                let at = self.player;
                for _ in 0..BURST {
                    self.spawn(at);
                }
            }
            InputEvent::Pressed(Button::Pointer) => {
                if let Some(cursor) = self.input.cursor {
                    self.spawn(cursor);
                }
            }
            InputEvent::CursorMoved(cursor) => self.input.cursor = Some(cursor),
            _ => {}
        }
    }
}

/// Reflect one axis off `[-limit, limit]`.
fn bounce_axis(position: &mut f32, velocity: &mut f32, limit: f32) {
    if *position > limit {
        *position = 2.0 * limit - *position;
        *velocity = -velocity.abs();
    } else if *position < -limit {
        *position = -2.0 * limit - *position;
        *velocity = velocity.abs();
    }
}

impl Simulation for Bounce {
    type Command = SimCommand;

    fn apply(&mut self, command: SimCommand) {
        match command {
            SimCommand::Input(snapshot) => self.input = snapshot,
            SimCommand::Events(events) => {
                for event in events {
                    self.handle_event(event);
                }
            }
            SimCommand::Reset { seed } => {
                let count = self.bodies.len();
                tracing::info!(seed, count, "scene reset");
                *self = Bounce::populate(seed, count, self.bounds, self.next_id);
            }
        }
    }

    fn step(&mut self, time: &SimulationTime) {
        let dt = time.delta_seconds();
        self.player = (self.player + self.input.axis() * PLAYER_SPEED * dt)
            .clamp(-self.bounds, self.bounds);

        for body in &mut self.bodies {
            body.position += body.velocity * dt;
            bounce_axis(&mut body.position.x, &mut body.velocity.x, self.bounds.x);
            bounce_axis(&mut body.position.y, &mut body.velocity.y, self.bounds.y);
            body.rotation += body.spin * dt;
        }
        self.ticks += 1;
    }

    fn extract(&self, out: &mut Vec<Renderable>) {
        out.reserve(self.bodies.len() + 3);
        for body in &self.bodies {
            let mut sprite = SpriteData::new(CHECKER);
            sprite.color = body.tint;
            out.push(Renderable::new(
                body.id,
                Transform2D::from_position(body.position)
                    .with_rotation(body.rotation)
                    .with_scale(Vec2::splat(2.0)),
                RenderData::Sprite(sprite),
            ));
        }

        let tether = self.player;
        out.push(
            Renderable::new(
                TETHER,
                Transform2D::IDENTITY.with_rotation(tether.y.atan2(tether.x)),
                RenderData::Line(LineData {
                    length: tether.length(),
                    thickness: 2.0,
                    color: Color::rgba(120, 200, 255, 160),
                }),
            )
            .with_z_index(1),
        );

        out.push(
            Renderable::new(
                PLAYER,
                Transform2D::from_position(self.player),
                RenderData::Circle(CircleData {
                    radius: 12.0,
                    color: Color::rgba(255, 210, 80, 255),
                }),
            )
            .with_z_index(2),
        );

        out.push(
            Renderable::new(
                HUD,
                Transform2D::from_position(Vec2::new(-self.bounds.x, self.bounds.y)),
                RenderData::Text(TextData {
                    font: Some(FontId(0)),
                    size: 16.0,
                    text: format!("bodies {}\ntick {}", self.bodies.len(), self.ticks),
                    color: Color::WHITE,
                    align: TextAlign::new(HAlign::Left, VAlign::Top),
                }),
            )
            .with_z_index(10),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::queue::CommandQueue;
    use kiln_render::backend::HeadlessBackend;
    use kiln_render::camera::Camera2D;
    use kiln_render::interpolate::FrameInterpolator;
    use kiln_render::batch::BatchKind;
    use kiln_render::pipeline::SimulationLoop;
    use kiln_render::raster::{RenderConfig, RenderSystem};
    use kiln_render::store::RenderableStore;
    use std::sync::Arc;
    use std::time::Duration;

    const BOUNDS: Vec2 = Vec2::new(300.0, 200.0);

    #[test]
    fn checker_has_one_pixel_per_texel() {
        let pixels = checker_pixels(CHECKER);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert_eq!(&pixels[..4], &[255, 255, 255, 255]);
        assert_eq!(&pixels[16..20], &[190, 190, 190, 255]);
    }

    #[test]
    fn bodies_stay_inside_the_arena() {
        let mut bounce = Bounce::new(7, 64, BOUNDS);
        let time = SimulationTime::new(Duration::from_millis(16));
        for _ in 0..600 {
            bounce.step(&time);
        }
        for body in &bounce.bodies {
            assert!(body.position.x.abs() <= BOUNDS.x + f32::EPSILON);
            assert!(body.position.y.abs() <= BOUNDS.y + f32::EPSILON);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let a = Bounce::new(42, 32, BOUNDS);
        let b = Bounce::new(42, 32, BOUNDS);
        let (mut ra, mut rb) = (Vec::new(), Vec::new());
        a.extract(&mut ra);
        b.extract(&mut rb);
        assert_eq!(ra, rb);
    }

    #[test]
    fn input_steers_the_player_and_spawns_bursts() {
        let mut bounce = Bounce::new(1, 0, BOUNDS);
        let mut input = kiln_services::InputState::new();
        input.handle(InputEvent::Pressed(Button::Right));
        input.handle(InputEvent::Pressed(Button::Action));

        bounce.apply(SimCommand::Input(input.snapshot()));
        bounce.apply(SimCommand::Events(input.drain_events()));
        bounce.step(&SimulationTime::new(Duration::from_millis(500)));

        assert_eq!(bounce.len(), BURST);
        assert_eq!(bounce.player(), Vec2::new(PLAYER_SPEED * 0.5, 0.0));
    }

    #[test]
    fn reset_keeps_the_population_with_fresh_ids() {
        let mut bounce = Bounce::new(1, 10, BOUNDS);
        let before: Vec<u64> = bounce.bodies.iter().map(|b| b.id.0).collect();
        bounce.apply(SimCommand::Reset { seed: 99 });
        assert_eq!(bounce.len(), 10);
        assert_eq!(bounce.player(), Vec2::ZERO);

        let after: Vec<u64> = bounce.bodies.iter().map(|b| b.id.0).collect();
        let newest = before.iter().max().copied().unwrap();
        assert!(after.iter().all(|id| *id > newest));
    }

    #[test]
    fn reset_bodies_snap_instead_of_tweening() {
        let store = RenderableStore::new();
        let mut bounce = Bounce::new(5, 8, BOUNDS);
        let mut out = Vec::new();
        bounce.extract(&mut out);
        store.add_renderables(std::mem::take(&mut out));
        store.swap_buffers();

        bounce.apply(SimCommand::Reset { seed: 6 });
        bounce.extract(&mut out);
        store.add_renderables(out);
        store.swap_buffers();

        let mut interpolator = FrameInterpolator::default();
        let stats = interpolator.interpolate(&store, 0.5).stats();
        // Player, tether and HUD keep their ids; every body is new.
        assert_eq!(stats.interpolated, 3);
        assert_eq!(stats.snapped, 8);
    }

    #[test]
    fn scene_renders_through_the_whole_pipeline() {
        let commands = Arc::new(CommandQueue::new());
        let store = Arc::new(RenderableStore::new());
        let mut sim_loop = SimulationLoop::new(
            Bounce::new(3, 500, BOUNDS),
            commands,
            store.clone(),
            Duration::from_millis(16),
        );
        sim_loop.tick();
        sim_loop.tick();

        let mut interpolator = FrameInterpolator::default();
        let frame = interpolator.interpolate(&store, 0.5);
        let packets = frame.packets();
        let sprites: usize = packets
            .iter()
            .filter(|packet| packet.batch.kind() == BatchKind::Sprite)
            .map(|packet| packet.batch.count())
            .sum();
        assert_eq!(frame.stats().renderables, 503);
        assert_eq!(frame.stats().snapped, 0);
        assert_eq!(sprites, 500);
        assert!(packets.len() <= PALETTE.len() + 3);
        assert_eq!(packets[0].batch.kind(), BatchKind::Sprite);
        assert_eq!(packets[packets.len() - 1].batch.kind(), BatchKind::Text);

        let mut system = RenderSystem::new(RenderConfig::default()).unwrap();
        let mut backend = HeadlessBackend::new();
        let stats = system
            .render(&frame, &Camera2D::default(), &mut backend)
            .unwrap();
        assert_eq!(stats.skipped_batches, 0);
        assert_eq!(stats.text_draws, 2);
        assert_eq!(backend.frames_presented, 1);
    }
}
