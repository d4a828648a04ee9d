//! Settings management
//!
//! Engine settings load from an optional JSON file. Missing fields take their
//! defaults; a missing file means all defaults.

use kiln_core::math::RotationInterpolation;
use kiln_core::time::{tick_duration, DEFAULT_TICK_RATE_HZ};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Triangles in the smallest drawable shape (one quad).
const MIN_PRIMITIVES: usize = 2;
const MIN_CIRCLE_SEGMENTS: u32 = 3;
/// Three indices per triangle must fit a `u32`.
const MAX_PRIMITIVES: usize = u32::MAX as usize / 3;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("simulation tick rate must be at least 1 Hz")]
    ZeroTickRate,

    #[error("primitive budget {0} is below one quad ({MIN_PRIMITIVES} triangles)")]
    PrimitiveBudget(usize),

    #[error("primitive budget {0} exceeds the u32 index range (max {MAX_PRIMITIVES})")]
    PrimitiveBudgetTooLarge(usize),

    #[error("pixels per unit must be positive and finite, got {0}")]
    PixelScale(f32),

    #[error("circle segments {0} is below {MIN_CIRCLE_SEGMENTS}")]
    CircleSegments(u32),

    #[error("circle segments {segments} exceed the primitive budget {budget}")]
    CircleExceedsBudget { segments: u32, budget: usize },
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub simulation: SimulationSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Kiln".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub tick_rate_hz: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Triangles per draw call.
    pub max_primitives_per_batch: usize,
    pub pixels_per_unit: f32,
    pub rotation_interpolation: RotationInterpolation,
    /// RGBA8.
    pub clear_color: [u8; 4],
    pub circle_segments: u32,
    pub simd: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_primitives_per_batch: 8192,
            pixels_per_unit: 1.0,
            rotation_interpolation: RotationInterpolation::Linear,
            clear_color: [13, 13, 18, 255],
            circle_segments: 32,
            simd: true,
        }
    }
}

impl Settings {
    /// Load and validate settings from `path`. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let settings = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no settings file; using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.simulation.tick_rate_hz == 0 {
            return Err(SettingsError::ZeroTickRate);
        }
        let render = &self.render;
        if render.max_primitives_per_batch < MIN_PRIMITIVES {
            return Err(SettingsError::PrimitiveBudget(render.max_primitives_per_batch));
        }
        if render.max_primitives_per_batch > MAX_PRIMITIVES {
            return Err(SettingsError::PrimitiveBudgetTooLarge(
                render.max_primitives_per_batch,
            ));
        }
        if !(render.pixels_per_unit.is_finite() && render.pixels_per_unit > 0.0) {
            return Err(SettingsError::PixelScale(render.pixels_per_unit));
        }
        if render.circle_segments < MIN_CIRCLE_SEGMENTS {
            return Err(SettingsError::CircleSegments(render.circle_segments));
        }
        if render.circle_segments as usize > render.max_primitives_per_batch {
            return Err(SettingsError::CircleExceedsBudget {
                segments: render.circle_segments,
                budget: render.max_primitives_per_batch,
            });
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        tick_duration(self.simulation.tick_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_round_trip() {
        let settings = Settings::default();
        settings.validate().unwrap();
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings = Settings::from_json(
            r#"{ "simulation": { "tick_rate_hz": 30 },
                 "render": { "rotation_interpolation": "shortest_arc" } }"#,
        )
        .unwrap();
        assert_eq!(settings.simulation.tick_rate_hz, 30);
        assert_eq!(
            settings.render.rotation_interpolation,
            RotationInterpolation::ShortestArc
        );
        assert_eq!(settings.render.max_primitives_per_batch, 8192);
        assert_eq!(settings.window, WindowSettings::default());
    }

    #[test]
    fn validation_rejects_unusable_values() {
        let with = |f: fn(&mut Settings)| {
            let mut settings = Settings::default();
            f(&mut settings);
            settings.validate()
        };
        assert!(matches!(
            with(|s| s.simulation.tick_rate_hz = 0),
            Err(SettingsError::ZeroTickRate)
        ));
        assert!(matches!(
            with(|s| s.render.max_primitives_per_batch = 1),
            Err(SettingsError::PrimitiveBudget(1))
        ));
        assert!(matches!(
            with(|s| s.render.max_primitives_per_batch = usize::MAX / 2),
            Err(SettingsError::PrimitiveBudgetTooLarge(_))
        ));
        assert!(matches!(
            with(|s| s.render.pixels_per_unit = -2.0),
            Err(SettingsError::PixelScale(_))
        ));
        assert!(matches!(
            with(|s| s.render.circle_segments = 2),
            Err(SettingsError::CircleSegments(2))
        ));
        assert!(matches!(
            with(|s| {
                s.render.max_primitives_per_batch = 16;
                s.render.circle_segments = 32;
            }),
            Err(SettingsError::CircleExceedsBudget { .. })
        ));
    }

    #[test]
    fn load_handles_missing_and_malformed_files() {
        let dir = std::env::temp_dir().join(format!("kiln-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = Settings::load(dir.join("absent.json")).unwrap();
        assert_eq!(missing, Settings::default());

        let broken = dir.join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            Settings::load(&broken),
            Err(SettingsError::Parse { .. })
        ));

        let invalid = dir.join("invalid.json");
        std::fs::write(&invalid, r#"{ "simulation": { "tick_rate_hz": 0 } }"#).unwrap();
        assert!(matches!(
            Settings::load(&invalid),
            Err(SettingsError::ZeroTickRate)
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn oversized_budget_in_a_file_is_rejected() {
        let settings = Settings::from_json(
            r#"{ "render": { "max_primitives_per_batch": 4294967295 } }"#,
        )
        .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PrimitiveBudgetTooLarge(_))
        ));

        let mut largest = Settings::default();
        largest.render.max_primitives_per_batch = MAX_PRIMITIVES;
        largest.validate().unwrap();
    }

    #[test]
    fn tick_duration_follows_rate() {
        let mut settings = Settings::default();
        settings.simulation.tick_rate_hz = 50;
        assert_eq!(settings.tick_duration(), Duration::from_millis(20));
    }
}
