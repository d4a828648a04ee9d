//! Kiln Engine Runtime
//!
//! Boots the window, the GPU backend and the simulation thread, then runs the
//! demo scene. An optional first argument names the settings file.

mod app;
mod config;
mod demo;

use anyhow::{Context, Result};
use kiln_services::Settings;
use winit::event_loop::{ControlFlow, EventLoop};

const DEFAULT_SETTINGS: &str = "kiln.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Kiln Engine v{}", kiln_core::VERSION);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_string());
    let settings = Settings::load(&path).with_context(|| format!("loading {path}"))?;
    tracing::info!(
        tick_rate_hz = settings.simulation.tick_rate_hz,
        rotation = ?settings.render.rotation_interpolation,
        "settings loaded"
    );

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(&settings)?;
    let run = event_loop.run_app(&mut app);
    app.shutdown()?;
    run.context("event loop failed")
}
