//! Kiln Engine Core
//!
//! Contains the building blocks shared by the simulation and render threads:
//! - Fixed-step time and interpolation clock
//! - Frame timing
//! - Per-frame arena memory
//! - Cross-thread command queues
//! - Math helpers over glam

pub mod math;
pub mod memory;
pub mod metrics;
pub mod queue;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
