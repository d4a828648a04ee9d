//! Window thread
//!
//! Owns the window, the GPU backend and the render-side pipeline state. The
//! simulation runs on its own thread and only meets this one through the
//! renderable store and the command queue.

use crate::config::{render_config, window_config};
use crate::demo::{checker_pixels, Bounce, CHECKER};
use anyhow::{Context, Result};
use glam::{UVec2, Vec2};
use kiln_core::metrics::FrameTimer;
use kiln_core::queue::CommandQueue;
use kiln_core::time::InterpolationClock;
use kiln_render::backend::{BackendError, WgpuBackend};
use kiln_render::camera::Camera2D;
use kiln_render::command::RenderCommand;
use kiln_render::interpolate::FrameInterpolator;
use kiln_render::pipeline::{spawn_simulation, RunFlag, SimulationLoop};
use kiln_render::raster::RenderSystem;
use kiln_render::store::RenderableStore;
use kiln_render::window::{window_attributes, WindowConfig};
use kiln_services::{Button, InputEvent, InputState, Settings, SimCommand};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const INITIAL_BODIES: usize = 2_000;
const STATS_INTERVAL: Duration = Duration::from_secs(2);
const TIMED_FRAMES: usize = 120;

pub struct App {
    window_config: WindowConfig,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    system: RenderSystem,
    interpolator: FrameInterpolator,
    camera: Camera2D,
    clock: InterpolationClock,
    store: Arc<RenderableStore>,
    sim_commands: Arc<CommandQueue<SimCommand>>,
    render_commands: CommandQueue<RenderCommand>,
    input: InputState,
    running: RunFlag,
    sim_thread: Option<JoinHandle<Bounce>>,
    next_seed: u64,
    frame_timer: FrameTimer,
    last_report: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(settings: &Settings) -> Result<Self> {
        let config = render_config(settings);
        let system = RenderSystem::new(config.clone()).context("invalid render settings")?;
        let window_config = window_config(settings);
        let camera = Camera2D::new(
            UVec2::new(window_config.width, window_config.height),
            config.pixels_per_unit,
        );

        let store = Arc::new(RenderableStore::new());
        let sim_commands = Arc::new(CommandQueue::new());
        let running = RunFlag::new();

        let tick = settings.tick_duration();
        // Keep bodies inside the initial view with a small margin.
        let bounds = camera.half_extent() - Vec2::splat(16.0);
        let sim_loop = SimulationLoop::new(
            Bounce::new(1, INITIAL_BODIES, bounds),
            sim_commands.clone(),
            store.clone(),
            tick,
        );
        let sim_thread =
            spawn_simulation(sim_loop, running.clone()).context("failed to spawn simulation")?;

        Ok(Self {
            window_config,
            window: None,
            backend: None,
            system,
            interpolator: FrameInterpolator::new(settings.render.rotation_interpolation),
            camera,
            clock: InterpolationClock::new(tick),
            store,
            sim_commands,
            render_commands: CommandQueue::new(),
            input: InputState::new(),
            running,
            sim_thread: Some(sim_thread),
            next_seed: 2,
            frame_timer: FrameTimer::new(TIMED_FRAMES),
            last_report: Instant::now(),
            error: None,
        })
    }

    /// Stop the simulation thread and surface any fatal error from the loop.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_simulation();
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn stop_simulation(&mut self) {
        self.running.stop();
        if let Some(handle) = self.sim_thread.take() {
            match handle.join() {
                Ok(bounce) => tracing::info!(bodies = bounce.len(), "simulation joined"),
                Err(_) => tracing::error!("simulation thread panicked"),
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_backend(&mut self, window: Arc<Window>) -> Result<WgpuBackend> {
        let mut backend = pollster::block_on(WgpuBackend::new(window, self.window_config.vsync))
            .context("failed to initialize GPU backend")?;
        backend
            .register_image(CHECKER, &checker_pixels(CHECKER))
            .context("failed to upload demo texture")?;
        Ok(backend)
    }

    fn key(&mut self, code: KeyCode, state: ElementState, event_loop: &ActiveEventLoop) {
        let button = match code {
            KeyCode::ArrowUp | KeyCode::KeyW => Button::Up,
            KeyCode::ArrowDown | KeyCode::KeyS => Button::Down,
            KeyCode::ArrowLeft | KeyCode::KeyA => Button::Left,
            KeyCode::ArrowRight | KeyCode::KeyD => Button::Right,
            KeyCode::Space => Button::Action,
            KeyCode::KeyR if state.is_pressed() => {
                self.sim_commands.push(SimCommand::Reset {
                    seed: self.next_seed,
                });
                self.next_seed += 1;
                return;
            }
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            _ => return,
        };
        self.input.handle(match state {
            ElementState::Pressed => InputEvent::Pressed(button),
            ElementState::Released => InputEvent::Released(button),
        });
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        self.frame_timer.begin();

        let system = &mut self.system;
        let camera = &mut self.camera;
        self.render_commands.execute(|command| {
            if let RenderCommand::Resize { width, height } = command {
                backend.resize(width, height);
            }
            command.apply(system, camera);
        });

        self.sim_commands
            .push(SimCommand::Input(self.input.snapshot()));
        let events = self.input.drain_events();
        if !events.is_empty() {
            self.sim_commands.push(SimCommand::Events(events));
        }

        let alpha = self.clock.alpha(Instant::now(), self.store.generation());
        let frame = self.interpolator.interpolate(&self.store, alpha);
        let frame_stats = frame.stats();
        let result = self.system.render(&frame, &self.camera, backend);
        match result {
            Ok(stats) => {
                self.frame_timer.end();
                if self.last_report.elapsed() >= STATS_INTERVAL {
                    let (min_ms, max_ms) = self.frame_timer.frame_time_range_ms();
                    tracing::info!(
                        fps = self.frame_timer.fps(),
                        frame_ms = self.frame_timer.frame_time_ms(),
                        min_ms,
                        max_ms,
                        renderables = frame_stats.renderables,
                        packets = stats.packets,
                        draw_calls = stats.draw_calls,
                        vertices = stats.vertices,
                        "render stats"
                    );
                    self.last_report = Instant::now();
                }
            }
            Err(BackendError::SurfaceLost | BackendError::Timeout) => {
                tracing::debug!("frame skipped");
            }
            Err(error) => self.fail(event_loop, error.into()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes(&self.window_config)) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                self.fail(event_loop, anyhow::Error::new(error).context("failed to create window"));
                return;
            }
        };
        match self.create_backend(window.clone()) {
            Ok(backend) => {
                let size = window.inner_size();
                self.render_commands.push(RenderCommand::Resize {
                    width: size.width,
                    height: size.height,
                });
                tracing::info!(capabilities = ?backend.capabilities(), "renderer ready");
                self.backend = Some(backend);
                self.window = Some(window);
            }
            Err(error) => self.fail(event_loop, error),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.render_commands.push(RenderCommand::Resize {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.key(code, event.state, event_loop);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let world = self
                    .camera
                    .screen_to_world(Vec2::new(position.x as f32, position.y as f32));
                self.input.handle(InputEvent::CursorMoved(world));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.input.handle(match state {
                    ElementState::Pressed => InputEvent::Pressed(Button::Pointer),
                    ElementState::Released => InputEvent::Released(Button::Pointer),
                });
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop_simulation();
    }
}
