//! Core library for the Beat VJ player.
//!
//! A synthetic tempo clock produces a beat phase and a decaying intensity
//! envelope; a palette cycler and a particle field follow the beat; and one of
//! ten stateless effects turns that shared state into draw calls on a
//! [`Canvas`]. The [`Player`] owns all of it and advances it one fixed tick at
//! a time, so everything here is deterministic and testable without a window.

pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod palette;
pub mod particles;
pub mod player;
pub mod record;
pub mod render;
pub mod timeline;

pub use clock::{BeatClock, BeatEnvelope};
pub use config::{AppConfig, CanvasConfig, ClockConfig, OverlayConfig, ParticleConfig};
pub use effects::{Effect, EffectContext, EffectRegistry, EFFECT_COUNT};
pub use error::{Result, VjError};
pub use input::{FrameInput, InputEvent, InputSource, NoInput};
pub use palette::ColorCycler;
pub use particles::{Particle, ParticleField};
pub use player::{AnimationState, Control, Player};
pub use record::{Recorder, RecordingSettings};
pub use render::{Canvas, DrawCommand, DrawList, Framebuffer};
pub use timeline::{InputScript, ScheduledInput};
