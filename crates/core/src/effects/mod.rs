use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::{palette, particles::Particle, render::Canvas};

pub const EFFECT_COUNT: usize = 10;

/// Read-only view of the animation state for one frame.
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    pub phase: f64,
    pub intensity: f32,
    pub palette_offset: u8,
    pub elapsed: f64,
    pub particles: &'a [Particle],
    pub width: f32,
    pub height: f32,
}

impl EffectContext<'_> {
    /// Beat phase as an angle in `[0, 2π)`. Folding by whole beats first keeps
    /// precision when the phase has grown large.
    pub fn beat_angle(&self) -> f32 {
        (self.phase.rem_euclid(1.0) * std::f64::consts::TAU) as f32
    }

    pub fn color(&self, local: usize) -> u8 {
        palette::color_for(local, self.palette_offset)
    }

    fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    Circles,
    Lines,
    Noise,
    Wave,
    Tunnel,
    Kaleidoscope,
    BeatCircles,
    BeatBars,
    BeatSpiral,
    BeatFlash,
}

impl Effect {
    /// Every effect in slot order.
    pub const ALL: [Effect; EFFECT_COUNT] = [
        Effect::Circles,
        Effect::Lines,
        Effect::Noise,
        Effect::Wave,
        Effect::Tunnel,
        Effect::Kaleidoscope,
        Effect::BeatCircles,
        Effect::BeatBars,
        Effect::BeatSpiral,
        Effect::BeatFlash,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Effect::Circles => "circles",
            Effect::Lines => "lines",
            Effect::Noise => "noise",
            Effect::Wave => "wave",
            Effect::Tunnel => "tunnel",
            Effect::Kaleidoscope => "kaleidoscope",
            Effect::BeatCircles => "beat-circles",
            Effect::BeatBars => "beat-bars",
            Effect::BeatSpiral => "beat-spiral",
            Effect::BeatFlash => "beat-flash",
        }
    }

    /// Whether the effect samples the particle field.
    pub fn uses_particles(&self) -> bool {
        matches!(self, Effect::Noise)
    }

    pub fn draw<C: Canvas + ?Sized>(&self, ctx: &EffectContext<'_>, canvas: &mut C) {
        match self {
            Effect::Circles => draw_circles(ctx, canvas),
            Effect::Lines => draw_lines(ctx, canvas),
            Effect::Noise => draw_noise(ctx, canvas),
            Effect::Wave => draw_wave(ctx, canvas),
            Effect::Tunnel => draw_tunnel(ctx, canvas),
            Effect::Kaleidoscope => draw_kaleidoscope(ctx, canvas),
            Effect::BeatCircles => draw_beat_circles(ctx, canvas),
            Effect::BeatBars => draw_beat_bars(ctx, canvas),
            Effect::BeatSpiral => draw_beat_spiral(ctx, canvas),
            Effect::BeatFlash => draw_beat_flash(ctx, canvas),
        }
    }
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered effect slots with exactly one active entry.
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    slots: [Effect; EFFECT_COUNT],
    active: usize,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self {
            slots: Effect::ALL,
            active: 0,
        }
    }

    /// Activates slot `index`. Out-of-range requests are ignored; the return
    /// value reports whether the selection was applied.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            tracing::trace!(index, "ignoring selection of missing effect slot");
            return false;
        }
        if index != self.active {
            tracing::info!(index, effect = %self.slots[index], "effect selected");
        }
        self.active = index;
        true
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Effect {
        self.slots[self.active]
    }

    pub fn slots(&self) -> &[Effect] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_circles<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let (cx, cy) = ctx.center();
    let angle = ctx.beat_angle();
    for i in 0..8 {
        let offset = i as f32;
        let radius = 20.0 + (angle + offset).sin() * (10.0 + ctx.intensity * 10.0);
        let x = cx + (angle + offset).cos() * 30.0;
        let y = cy + (angle + offset * 2.0).sin() * 20.0;
        canvas.circle(x, y, radius, ctx.color(i));
    }
}

fn draw_lines<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let (cx, cy) = ctx.center();
    let angle = ctx.beat_angle();
    for i in 0..16 {
        let a = angle + i as f32 * 0.5;
        let x1 = a.sin() * cx + cx;
        let y1 = a.cos() * cy + cy;
        let x2 = (a + PI).sin() * cx + cx;
        let y2 = (a + PI).cos() * cy + cy;
        canvas.line(x1, y1, x2, y2, ctx.color(i));
    }
}

fn draw_noise<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let drift = (ctx.elapsed * 8.0).rem_euclid(palette::PALETTE_SIZE as f64);
    for particle in ctx.particles {
        let local = (f64::from(particle.x + particle.y) + drift).floor() as usize;
        canvas.point(particle.x, particle.y, ctx.color(local));
    }
}

fn draw_wave<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let (_, cy) = ctx.center();
    let angle = ctx.beat_angle();
    let amplitude = 20.0 + ctx.intensity * 10.0;
    let samples = (ctx.width.max(0.0) as usize).div_ceil(4);
    for i in 0..16 {
        let shift = angle + i as f32 * 0.5;
        let y_at = |x: f32| cy + (x * 0.05 + shift).sin() * amplitude;
        for j in 1..samples {
            let x1 = ((j - 1) * 4) as f32;
            let x2 = (j * 4) as f32;
            canvas.line(x1, y_at(x1), x2, y_at(x2), ctx.color(i));
        }
    }
}

fn draw_tunnel<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let (cx, cy) = ctx.center();
    let angle = ctx.beat_angle();
    let sway = 2.0 + ctx.intensity * 4.0;
    for step in (1..=20).rev() {
        let r = step * 4;
        let a = angle + r as f32 * 0.1;
        canvas.circle(
            cx + a.cos() * sway,
            cy + a.sin() * sway,
            r as f32,
            ctx.color(step as usize),
        );
    }
}

fn draw_kaleidoscope<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    const SEGMENTS: usize = 8;
    let (cx, cy) = ctx.center();
    let length = 20.0 + ctx.beat_angle().sin() * (10.0 + ctx.intensity * 20.0);
    let vertex = |i: usize| {
        let a = (i % SEGMENTS) as f32 * (TAU / SEGMENTS as f32);
        (cx + a.cos() * length, cy + a.sin() * length)
    };
    for i in 0..SEGMENTS {
        let (x, y) = vertex(i);
        let (next_x, next_y) = vertex(i + 1);
        let color = ctx.color(i);
        canvas.line(x, y, next_x, next_y, color);
        canvas.line(cx, cy, x, y, color);
    }
}

fn draw_beat_circles<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let (cx, cy) = ctx.center();
    let spread = 40.0 + ctx.intensity * 20.0;
    let radius = 5.0 + ctx.intensity * 15.0;
    for i in 0..8 {
        let a = i as f32 * PI / 4.0;
        canvas.fill_circle(
            cx + a.cos() * spread,
            cy + a.sin() * spread,
            radius,
            ctx.color(i),
        );
    }
}

fn draw_beat_bars<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    const BARS: usize = 16;
    let (_, cy) = ctx.center();
    let bar_width = (ctx.width / BARS as f32).floor();
    for i in 0..BARS {
        let mut height = 20.0 + ctx.intensity * 40.0;
        if i % 2 == 0 {
            height *= 0.5;
        }
        canvas.rect(
            i as f32 * bar_width,
            cy - height / 2.0,
            bar_width - 1.0,
            height,
            ctx.color(i),
        );
    }
}

fn draw_beat_spiral<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    const POINTS: usize = 60;
    let (cx, cy) = ctx.center();
    let point = |i: usize| {
        let a = i as f32 * 0.2 * (1.0 + ctx.intensity);
        let r = i as f32 * (0.5 + ctx.intensity);
        (cx + a.cos() * r, cy + a.sin() * r)
    };
    for i in 0..POINTS - 1 {
        let (x1, y1) = point(i);
        let (x2, y2) = point(i + 1);
        canvas.line(x1, y1, x2, y2, ctx.color(i / 4));
    }
}

fn draw_beat_flash<C: Canvas + ?Sized>(ctx: &EffectContext<'_>, canvas: &mut C) {
    let flash = (ctx.intensity * palette::PALETTE_SIZE as f32) as usize;
    if flash > 0 {
        canvas.rect(0.0, 0.0, ctx.width, ctx.height, ctx.color(flash));
    }

    let (cx, cy) = ctx.center();
    let length = 40.0 + ctx.intensity * 40.0;
    for i in 0..12 {
        let a = i as f32 * PI / 6.0;
        canvas.line(cx, cy, cx + a.cos() * length, cy + a.sin() * length, ctx.color(i));
    }
}
