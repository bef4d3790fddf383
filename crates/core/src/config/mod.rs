use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{clock, palette::PALETTE_SIZE, Result, VjError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub clock: ClockConfig,
    pub envelope: EnvelopeConfig,
    pub palette: PaletteConfig,
    pub particles: ParticleConfig,
    pub overlay: OverlayConfig,
}

impl AppConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Reads a JSON configuration file. Missing sections and fields fall back
    /// to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the animation core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid("canvas dimensions must be non-zero"));
        }
        if self.clock.fps == 0 {
            return Err(invalid("clock.fps must be at least 1"));
        }
        if self.envelope.decay_frames == 0 {
            return Err(invalid("envelope.decay_frames must be at least 1"));
        }
        if !(self.palette.beat_window > 0.0 && self.palette.beat_window <= 1.0) {
            return Err(invalid("palette.beat_window must lie in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.particles.turn_probability) {
            return Err(invalid("particles.turn_probability must lie in [0, 1]"));
        }
        if !self.particles.base_speed.is_finite() || !self.particles.beat_speed.is_finite() {
            return Err(invalid("particle speeds must be finite"));
        }
        for (name, color) in [
            ("overlay.accent_color", self.overlay.accent_color),
            ("overlay.base_color", self.overlay.base_color),
        ] {
            if usize::from(color) >= PALETTE_SIZE {
                return Err(invalid(format!(
                    "{name} must be a palette index below {PALETTE_SIZE}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> VjError {
    VjError::InvalidConfig(reason.into())
}

/// Size of the indexed-colour canvas in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 120,
        }
    }
}

/// Frame cadence and tempo settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub fps: u32,
    pub initial_tempo: u32,
    pub auto_beat: bool,
}

impl ClockConfig {
    /// Fixed tick length in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            initial_tempo: clock::DEFAULT_TEMPO,
            auto_beat: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Frames a fresh beat needs to decay from 1.0 to 0.0.
    pub decay_frames: u32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self { decay_frames: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Leading fraction of each beat window during which colours rotate.
    pub beat_window: f64,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self { beat_window: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    pub turn_probability: f64,
    pub base_speed: f32,
    pub beat_speed: f32,
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            turn_probability: 0.02,
            base_speed: 1.0,
            beat_speed: 2.0,
            seed: None,
        }
    }
}

/// Placement and colours of the BPM/mode text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub x: i32,
    pub y: i32,
    pub accent_color: u8,
    pub base_color: u8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            x: 4,
            y: 4,
            accent_color: 11,
            base_color: 7,
        }
    }
}
