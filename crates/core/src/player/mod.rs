use crate::{
    clock::{BeatClock, BeatEnvelope},
    config::AppConfig,
    effects::{Effect, EffectContext, EffectRegistry},
    input::{FrameInput, InputEvent},
    palette::ColorCycler,
    particles::ParticleField,
    render::Canvas,
};

/// Whether the frame loop should keep running after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The mutable animation state shared by every effect.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clock: BeatClock,
    pub colors: ColorCycler,
    pub particles: ParticleField,
}

impl AnimationState {
    pub fn new(config: &AppConfig) -> Self {
        let envelope = BeatEnvelope::new(config.envelope.decay_frames);
        Self {
            clock: BeatClock::new(config.clock.initial_tempo, config.clock.auto_beat, envelope),
            colors: ColorCycler::new(),
            particles: ParticleField::new(&config.particles, config.canvas),
        }
    }

    /// Snapshot handed to effects for drawing.
    pub fn context(&self, width: f32, height: f32) -> EffectContext<'_> {
        EffectContext {
            phase: self.clock.phase(),
            intensity: self.clock.intensity(),
            palette_offset: self.colors.offset(),
            elapsed: self.clock.elapsed(),
            particles: self.particles.particles(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    config: AppConfig,
    dt: f64,
    state: AnimationState,
    effects: EffectRegistry,
    frame: u64,
}

impl Player {
    /// Builds a player from an already validated configuration.
    pub fn new(config: AppConfig) -> Self {
        let state = AnimationState::new(&config);
        Self::with_state(config, state)
    }

    pub fn with_state(config: AppConfig, state: AnimationState) -> Self {
        tracing::info!(
            tempo = state.clock.tempo(),
            fps = config.clock.fps,
            particles = state.particles.len(),
            "player initialised"
        );
        Self {
            dt: config.clock.dt(),
            config,
            state,
            effects: EffectRegistry::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn clock(&self) -> &BeatClock {
        &self.state.clock
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn active_effect(&self) -> Effect {
        self.effects.active()
    }

    pub fn select_effect(&mut self, index: usize) -> bool {
        self.effects.select(index)
    }

    pub fn set_tempo(&mut self, bpm: u32) {
        self.state.clock.set_tempo(bpm);
    }

    pub fn palette_offset(&self) -> u8 {
        self.state.colors.offset()
    }

    /// Number of completed update ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Advances the animation by one fixed tick.
    pub fn update(&mut self, input: &FrameInput) -> Control {
        if input.quit() {
            tracing::info!(frame = self.frame, "quit requested");
            return Control::Quit;
        }

        for index in input.selections() {
            self.effects.select(index);
        }
        let tempo_before = self.state.clock.tempo();
        if input.contains(InputEvent::TempoDown) {
            self.state.clock.tempo_down();
        }
        if input.contains(InputEvent::TempoUp) {
            self.state.clock.tempo_up();
        }
        if self.state.clock.tempo() != tempo_before {
            tracing::info!(bpm = self.state.clock.tempo(), "tempo adjusted");
        }

        let clock = &mut self.state.clock;
        clock.advance(self.dt);
        let mut onset = clock.maybe_auto_beat();
        if input.contains(InputEvent::BeatOverride) {
            clock.manual_beat();
            onset = true;
        }
        // A beat landing on this tick is drawn at full intensity.
        if !onset {
            clock.decay_envelope();
        }

        // Sampled after this tick's onset, so an onset tick sits at phase 0.
        if clock.in_beat_window(self.config.palette.beat_window) {
            self.state.colors.advance();
        }

        let intensity = self.state.clock.intensity();
        self.state.particles.step(intensity);

        self.frame += 1;
        tracing::trace!(
            frame = self.frame,
            phase = self.state.clock.phase(),
            intensity,
            palette = self.state.colors.offset(),
            "tick"
        );
        Control::Continue
    }

    /// Renders the active effect followed by the overlay.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear(0);
        let ctx = self.context();
        self.effects.active().draw(&ctx, canvas);
        if self.config.overlay.enabled {
            let overlay = &self.config.overlay;
            canvas.text(
                overlay.x as f32,
                overlay.y as f32,
                &self.overlay_text(),
                self.overlay_color(),
            );
        }
    }

    /// Update followed by draw, returning the update's verdict. Nothing is
    /// drawn on a quit frame.
    pub fn step<C: Canvas + ?Sized>(&mut self, input: &FrameInput, canvas: &mut C) -> Control {
        let control = self.update(input);
        if control == Control::Continue {
            self.draw(canvas);
        }
        control
    }

    pub fn context(&self) -> EffectContext<'_> {
        self.state.context(
            self.config.canvas.width as f32,
            self.config.canvas.height as f32,
        )
    }

    /// `BPM:<tempo> AUTO|MANUAL`
    pub fn overlay_text(&self) -> String {
        let clock = &self.state.clock;
        let mode = if clock.auto_beat() { "AUTO" } else { "MANUAL" };
        format!("BPM:{} {}", clock.tempo(), mode)
    }

    pub fn overlay_color(&self) -> u8 {
        if self
            .state
            .clock
            .in_beat_window(self.config.palette.beat_window)
        {
            self.config.overlay.accent_color
        } else {
            self.config.overlay.base_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::{MAX_TEMPO, MIN_TEMPO},
        effects::EFFECT_COUNT,
        render::{DrawCommand, DrawList},
    };

    fn player() -> Player {
        let mut config = AppConfig::default();
        config.particles.seed = Some(1234);
        Player::new(config)
    }

    fn idle() -> FrameInput {
        FrameInput::new()
    }

    fn run(player: &mut Player, ticks: usize) {
        for _ in 0..ticks {
            assert_eq!(player.update(&idle()), Control::Continue);
        }
    }

    #[test]
    fn first_auto_beat_lands_after_fifteen_ticks() {
        let mut player = player();
        run(&mut player, 14);
        assert_eq!(player.clock().last_beat_time(), 0.0);

        run(&mut player, 1);
        let clock = player.clock();
        assert!((clock.elapsed() - 0.5).abs() < 1e-9);
        assert_eq!(clock.last_beat_time(), clock.elapsed());
        assert_eq!(clock.intensity(), 1.0);
    }

    #[test]
    fn intensity_decays_by_a_tenth_until_the_next_beat() {
        let mut player = player();
        run(&mut player, 15);
        assert_eq!(player.clock().intensity(), 1.0);

        let mut previous = 1.0_f32;
        for tick in 1..15 {
            run(&mut player, 1);
            let intensity = player.clock().intensity();
            let expected = (1.0 - tick as f32 * 0.1).max(0.0);
            assert!((intensity - expected).abs() < 1e-6, "tick {tick}: {intensity}");
            assert!(intensity <= previous);
            assert!((0.0..=1.0).contains(&intensity));
            previous = intensity;
        }
        assert_eq!(previous, 0.0);

        run(&mut player, 1);
        assert_eq!(player.clock().intensity(), 1.0);
    }

    #[test]
    fn palette_advances_once_per_tick_inside_the_beat_window() {
        let mut player = player();
        run(&mut player, 15);

        let start = player.palette_offset();
        let mut in_window = 0;
        for _ in 0..15 {
            run(&mut player, 1);
            if player.clock().window_position() < 0.1 {
                in_window += 1;
            }
        }
        let advanced = (usize::from(player.palette_offset()) + 16 - usize::from(start)) % 16;
        assert_eq!(advanced, in_window);
        assert_eq!(in_window, 2);
    }

    #[test]
    fn manual_mode_palette_rotates_evenly() {
        let mut player = player();
        player.update(&idle().with(InputEvent::BeatOverride));
        assert!(!player.clock().auto_beat());

        for beat in 0..40 {
            let start = player.palette_offset();
            run(&mut player, 15);
            let advanced = (usize::from(player.palette_offset()) + 16 - usize::from(start)) % 16;
            assert_eq!(advanced, 2, "beat {beat}");
        }
    }

    #[test]
    fn beat_override_toggles_auto_mode() {
        let mut player = player();
        run(&mut player, 3);
        let beat = idle().with(InputEvent::BeatOverride);

        player.update(&beat);
        assert!(!player.clock().auto_beat());
        assert_eq!(player.clock().intensity(), 1.0);
        assert_eq!(player.overlay_text(), "BPM:120 MANUAL");

        run(&mut player, 60);
        assert!(player.clock().phase() > 3.9);
        assert_eq!(player.clock().intensity(), 0.0);

        player.update(&beat);
        assert!(player.clock().auto_beat());
        assert_eq!(player.overlay_text(), "BPM:120 AUTO");
    }

    #[test]
    fn held_tempo_controls_step_and_clamp() {
        let mut player = player();
        let up = idle().with(InputEvent::TempoUp);
        for _ in 0..5 {
            player.update(&up);
        }
        assert_eq!(player.clock().tempo(), 125);
        assert_eq!(player.clock().beat_period(), 60.0 / 125.0);

        for _ in 0..500 {
            player.update(&up);
        }
        assert_eq!(player.clock().tempo(), MAX_TEMPO);

        let down = idle().with(InputEvent::TempoDown);
        for _ in 0..500 {
            player.update(&down);
        }
        assert_eq!(player.clock().tempo(), MIN_TEMPO);
    }

    #[test]
    fn selection_input_switches_effects() {
        let mut player = player();
        player.update(&idle().with(InputEvent::SelectEffect(6)));
        assert_eq!(player.active_effect(), Effect::BeatCircles);

        player.update(&idle().with(InputEvent::SelectEffect(EFFECT_COUNT)));
        assert_eq!(player.effects().active_index(), 6);
    }

    #[test]
    fn quit_stops_without_advancing() {
        let mut player = player();
        run(&mut player, 2);
        let elapsed = player.clock().elapsed();

        let mut canvas = DrawList::new();
        let control = player.step(&idle().with(InputEvent::Quit), &mut canvas);
        assert_eq!(control, Control::Quit);
        assert_eq!(player.clock().elapsed(), elapsed);
        assert_eq!(player.frame(), 2);
        assert!(canvas.is_empty());
    }

    #[test]
    fn draw_clears_renders_effect_and_overlay() {
        let mut player = player();
        run(&mut player, 15);

        let mut canvas = DrawList::new();
        player.draw(&mut canvas);
        let commands = canvas.commands();

        assert_eq!(commands.first(), Some(&DrawCommand::Clear { color: 0 }));
        match commands.last() {
            Some(DrawCommand::Text { x, y, text, color }) => {
                assert_eq!((*x, *y), (4.0, 4.0));
                assert_eq!(text, "BPM:120 AUTO");
                assert_eq!(*color, 11);
            }
            other => panic!("expected overlay text, got {other:?}"),
        }

        run(&mut player, 5);
        assert_eq!(player.overlay_color(), 7);
    }

    #[test]
    fn switching_effects_leaves_state_untouched() {
        let mut player = player();
        run(&mut player, 20);
        let phase = player.clock().phase();
        let offset = player.palette_offset();
        let particles = player.state().particles.particles().to_vec();

        for index in 0..EFFECT_COUNT {
            player.select_effect(index);
            let mut canvas = DrawList::new();
            player.draw(&mut canvas);
            assert!(canvas.len() > 1);
        }

        assert_eq!(player.clock().phase(), phase);
        assert_eq!(player.palette_offset(), offset);
        assert_eq!(player.state().particles.particles(), particles.as_slice());
    }

    #[test]
    fn long_runs_keep_invariants() {
        let mut player = player();
        let beat = idle().with(InputEvent::BeatOverride);
        for tick in 0..10_000u64 {
            let input = if tick % 997 == 0 { beat.clone() } else { idle() };
            player.update(&input);

            let clock = player.clock();
            assert!(clock.last_beat_time() <= clock.elapsed());
            assert!(clock.beat_period() > 0.0);
            assert!((0.0..=1.0).contains(&clock.intensity()));
            for p in player.state().particles.particles() {
                assert!((0.0..160.0).contains(&p.x) && (0.0..120.0).contains(&p.y));
            }
        }
    }
}
