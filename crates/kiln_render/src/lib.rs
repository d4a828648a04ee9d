//! Kiln Render System
//!
//! Render-command pipeline for a dual-rate 2D engine: the simulation thread
//! publishes per-entity [`Renderable`]s into a triple-buffered store, and the
//! render thread interpolates, batches and rasterizes them through a
//! [`RenderBackend`].

pub mod backend;
pub mod batch;
pub mod camera;
pub mod command;
pub mod interpolate;
pub mod packet;
pub mod pipeline;
pub mod raster;
pub mod renderable;
pub mod store;
pub mod window;

pub use wgpu;
pub use winit;

pub use backend::{BackendError, HeadlessBackend, RenderBackend, WgpuBackend};
pub use camera::Camera2D;
pub use command::RenderCommand;
pub use interpolate::{FrameInterpolator, FrameStats, InterpolatedFrame};
pub use packet::{PacketBatch, RenderPacket};
pub use pipeline::{spawn_simulation, RunFlag, Simulation, SimulationLoop};
pub use raster::{ConfigError, RenderConfig, RenderStats, RenderSystem};
pub use renderable::{RenderData, Renderable};
pub use store::RenderableStore;
