use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{CanvasConfig, ParticleConfig};

/// A drifting point on the toroidal canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Direction of travel in radians, in `[0, 2π)`.
    pub heading: f32,
}

/// Fixed-size set of independently wandering particles whose speed follows
/// the beat envelope.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    turn_probability: f64,
    base_speed: f32,
    beat_speed: f32,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: &ParticleConfig, canvas: CanvasConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, canvas, rng)
    }

    pub fn with_rng(config: &ParticleConfig, canvas: CanvasConfig, mut rng: StdRng) -> Self {
        let width = canvas.width.max(1) as f32;
        let height = canvas.height.max(1) as f32;
        let particles = (0..config.count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..width),
                y: rng.gen_range(0.0..height),
                heading: rng.gen_range(0.0..TAU),
            })
            .collect();

        Self {
            particles,
            width,
            height,
            turn_probability: config.turn_probability.clamp(0.0, 1.0),
            base_speed: config.base_speed,
            beat_speed: config.beat_speed,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Speed every particle travels at for the given beat intensity.
    pub fn speed(&self, intensity: f32) -> f32 {
        self.base_speed + intensity * self.beat_speed
    }

    /// Moves every particle one frame along its heading, wrapping at the
    /// canvas edges, and occasionally picks a new heading.
    pub fn step(&mut self, intensity: f32) {
        let speed = self.speed(intensity);
        for particle in &mut self.particles {
            particle.x = wrap(particle.x + particle.heading.cos() * speed, self.width);
            particle.y = wrap(particle.y + particle.heading.sin() * speed, self.height);
            if self.rng.gen_bool(self.turn_probability) {
                particle.heading = self.rng.gen_range(0.0..TAU);
            }
        }
    }
}

/// Wraps `value` into `[0, bound)`. `rem_euclid` can round up to `bound`
/// itself for tiny negative inputs, which is folded back to zero.
fn wrap(value: f32, bound: f32) -> f32 {
    let wrapped = value.rem_euclid(bound);
    if wrapped >= bound || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}
