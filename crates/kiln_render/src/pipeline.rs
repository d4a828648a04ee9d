//! Simulation thread
//!
//! Each tick: drain inbound commands, step once, extract renderables into the
//! store's write slot, swap, then sleep until the next tick boundary.

use crate::renderable::Renderable;
use crate::store::RenderableStore;
use kiln_core::queue::CommandQueue;
use kiln_core::time::{FixedStepScheduler, SimulationTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Game state advanced on the simulation thread.
pub trait Simulation: Send + 'static {
    /// Message type delivered from other threads.
    type Command: Send + 'static;

    fn apply(&mut self, command: Self::Command);

    fn step(&mut self, time: &SimulationTime);

    /// Append one [`Renderable`] per visible entity.
    fn extract(&self, out: &mut Vec<Renderable>);
}

/// Shared running flag, checked once per loop iteration.
#[derive(Clone, Debug)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SimulationLoop<S: Simulation> {
    simulation: S,
    commands: Arc<CommandQueue<S::Command>>,
    store: Arc<RenderableStore>,
    time: SimulationTime,
    extracted: usize,
}

impl<S: Simulation> SimulationLoop<S> {
    pub fn new(
        simulation: S,
        commands: Arc<CommandQueue<S::Command>>,
        store: Arc<RenderableStore>,
        tick: Duration,
    ) -> Self {
        Self {
            simulation,
            commands,
            store,
            time: SimulationTime::new(tick),
            extracted: 0,
        }
    }

    /// Run one tick without sleeping.
    pub fn tick(&mut self) {
        let simulation = &mut self.simulation;
        let applied = self.commands.execute(|command| simulation.apply(command));

        self.simulation.step(&self.time);

        let mut renderables = Vec::with_capacity(self.extracted);
        self.simulation.extract(&mut renderables);
        self.extracted = renderables.len();
        self.store.add_renderables(renderables);
        self.store.swap_buffers();

        self.time.advance_tick();
        tracing::trace!(
            tick = self.time.tick_count(),
            commands = applied,
            renderables = self.extracted,
            "simulation tick"
        );
    }

    /// Tick at the fixed rate until `running` is cleared. A tick in progress
    /// always completes.
    pub fn run(mut self, running: RunFlag) -> S {
        let mut scheduler = FixedStepScheduler::new(self.time.tick_duration(), Instant::now());
        tracing::info!(
            tick_ms = self.time.tick_duration().as_secs_f64() * 1000.0,
            "simulation loop started"
        );
        while running.is_running() {
            self.tick();
            scheduler.wait();
        }
        tracing::info!(ticks = self.time.tick_count(), "simulation loop stopped");
        self.simulation
    }

    pub fn time(&self) -> &SimulationTime {
        &self.time
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }
}

/// Start `sim_loop` on a named thread. The handle yields the simulation back on join.
pub fn spawn_simulation<S: Simulation>(
    sim_loop: SimulationLoop<S>,
    running: RunFlag,
) -> std::io::Result<JoinHandle<S>> {
    std::thread::Builder::new()
        .name("simulation".into())
        .spawn(move || sim_loop.run(running))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::{CircleData, Color, EntityId, RenderData, Transform2D};
    use glam::Vec2;

    /// One dot moving right at a commanded speed.
    #[derive(Default)]
    struct Drift {
        x: f32,
        speed: f32,
        steps: u64,
    }

    impl Simulation for Drift {
        type Command = f32;

        fn apply(&mut self, speed: f32) {
            self.speed = speed;
        }

        fn step(&mut self, time: &SimulationTime) {
            self.x += self.speed * time.delta_seconds();
            self.steps += 1;
        }

        fn extract(&self, out: &mut Vec<Renderable>) {
            out.push(Renderable::new(
                EntityId(1),
                Transform2D::from_position(Vec2::new(self.x, 0.0)),
                RenderData::Circle(CircleData {
                    radius: 1.0,
                    color: Color::WHITE,
                }),
            ));
        }
    }

    #[test]
    fn commands_apply_before_the_step() {
        let commands = Arc::new(CommandQueue::new());
        let store = Arc::new(RenderableStore::new());
        let mut sim_loop = SimulationLoop::new(
            Drift::default(),
            commands.clone(),
            store.clone(),
            Duration::from_millis(500),
        );

        commands.push(10.0);
        sim_loop.tick();
        sim_loop.tick();

        let (prev, curr, write) = store.snapshot();
        assert_eq!(prev[0].transform.position.x, 5.0);
        assert_eq!(curr[0].transform.position.x, 10.0);
        assert!(write.is_empty());
        assert_eq!(store.generation(), 2);
        assert_eq!(sim_loop.time().tick_count(), 2);
    }

    #[test]
    fn loop_stops_when_flag_clears() {
        let commands = Arc::new(CommandQueue::new());
        let store = Arc::new(RenderableStore::new());
        let sim_loop = SimulationLoop::new(
            Drift::default(),
            commands,
            store.clone(),
            Duration::from_millis(1),
        );

        let running = RunFlag::new();
        let handle = spawn_simulation(sim_loop, running.clone()).unwrap();
        while store.generation() < 3 {
            std::thread::yield_now();
        }
        running.stop();
        let simulation = handle.join().unwrap();
        assert!(simulation.steps >= 3);
        assert_eq!(store.generation(), simulation.steps);
    }
}
