pub const MIN_TEMPO: u32 = 60;
pub const MAX_TEMPO: u32 = 240;
pub const DEFAULT_TEMPO: u32 = 120;

/// Slack applied when comparing accumulated tick time against the beat
/// period, so fifteen ticks of 1/30 s count as half a second.
const BEAT_EPSILON: f64 = 1e-9;

/// Same slack for whole-beat boundaries of the phase, so a phase of
/// 3.9999999999999996 sits at the start of beat window 4.
const PHASE_EPSILON: f64 = 1e-9;

/// Linear decaying beat intensity, quantised to whole frames so that it lands
/// on exactly 0.0 after `decay_frames` decays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEnvelope {
    level: u32,
    decay_frames: u32,
}

impl BeatEnvelope {
    pub fn new(decay_frames: u32) -> Self {
        Self {
            level: 0,
            decay_frames: decay_frames.max(1),
        }
    }

    /// Current intensity in `[0, 1]`.
    pub fn intensity(&self) -> f32 {
        self.level as f32 / self.decay_frames as f32
    }

    /// Amount removed by each call to [`BeatEnvelope::decay`].
    pub fn step(&self) -> f32 {
        1.0 / self.decay_frames as f32
    }

    pub fn trigger(&mut self) {
        self.level = self.decay_frames;
    }

    pub fn decay(&mut self) {
        self.level = self.level.saturating_sub(1);
    }
}

impl Default for BeatEnvelope {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Synthetic metronome: elapsed time, tempo and the most recent beat onset.
#[derive(Debug, Clone)]
pub struct BeatClock {
    elapsed: f64,
    tempo: u32,
    beat_period: f64,
    last_beat: f64,
    auto_beat: bool,
    envelope: BeatEnvelope,
}

impl BeatClock {
    pub fn new(tempo: u32, auto_beat: bool, envelope: BeatEnvelope) -> Self {
        let tempo = clamp_tempo(tempo);
        Self {
            elapsed: 0.0,
            tempo,
            beat_period: period_for(tempo),
            last_beat: 0.0,
            auto_beat,
            envelope,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
    }

    /// Clamps `bpm` to the supported range and recomputes the beat period.
    /// The current beat window is not rescaled; only the next one is affected.
    pub fn set_tempo(&mut self, bpm: u32) {
        let tempo = clamp_tempo(bpm);
        if tempo != self.tempo {
            tracing::trace!(from = self.tempo, to = tempo, "tempo changed");
        }
        self.tempo = tempo;
        self.beat_period = period_for(tempo);
    }

    pub fn tempo_up(&mut self) {
        self.set_tempo(self.tempo.saturating_add(1));
    }

    pub fn tempo_down(&mut self) {
        self.set_tempo(self.tempo.saturating_sub(1));
    }

    /// Fires a beat when auto mode is on and a full period has elapsed since
    /// the last onset. Level-triggered: a late check fires one beat, never a
    /// burst. Returns whether a beat fired.
    pub fn maybe_auto_beat(&mut self) -> bool {
        if !self.auto_beat {
            return false;
        }
        if self.elapsed - self.last_beat + BEAT_EPSILON < self.beat_period {
            return false;
        }
        self.onset();
        tracing::debug!(time = self.elapsed, tempo = self.tempo, "auto beat");
        true
    }

    /// Forces a beat onset and toggles auto mode. This is the only switch
    /// between AUTO and MANUAL.
    pub fn manual_beat(&mut self) {
        self.onset();
        self.auto_beat = !self.auto_beat;
        tracing::info!(
            time = self.elapsed,
            auto_beat = self.auto_beat,
            "manual beat"
        );
    }

    pub fn decay_envelope(&mut self) {
        self.envelope.decay();
    }

    /// Time since the last onset in units of beat periods. Unbounded when no
    /// further beat fires.
    pub fn phase(&self) -> f64 {
        (self.elapsed - self.last_beat) / self.beat_period
    }

    /// Position inside the current beat window, in `[0, 1)`.
    pub fn window_position(&self) -> f64 {
        (self.phase() + PHASE_EPSILON).rem_euclid(1.0)
    }

    /// Whether the clock sits in the leading `fraction` of a beat window.
    pub fn in_beat_window(&self, fraction: f64) -> bool {
        self.window_position() < fraction
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn beat_period(&self) -> f64 {
        self.beat_period
    }

    pub fn last_beat_time(&self) -> f64 {
        self.last_beat
    }

    pub fn auto_beat(&self) -> bool {
        self.auto_beat
    }

    pub fn intensity(&self) -> f32 {
        self.envelope.intensity()
    }

    fn onset(&mut self) {
        self.last_beat = self.elapsed;
        self.envelope.trigger();
    }
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO, true, BeatEnvelope::default())
    }
}

pub fn clamp_tempo(bpm: u32) -> u32 {
    bpm.clamp(MIN_TEMPO, MAX_TEMPO)
}

fn period_for(tempo: u32) -> f64 {
    60.0 / f64::from(tempo)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    #[test]
    fn tempo_is_clamped_and_period_recomputed() {
        let mut clock = BeatClock::default();
        for bpm in [0, 1, 59, 60, 61, 120, 200, 240, 241, 1_000, u32::MAX] {
            clock.set_tempo(bpm);
            assert!((MIN_TEMPO..=MAX_TEMPO).contains(&clock.tempo()));
            assert_eq!(clock.beat_period(), 60.0 / clock.tempo() as f64);
        }
        clock.set_tempo(120);
        assert_eq!(clock.beat_period(), 0.5);
    }

    #[test]
    fn tempo_nudges_stop_at_bounds() {
        let mut clock = BeatClock::new(MIN_TEMPO, true, BeatEnvelope::default());
        clock.tempo_down();
        assert_eq!(clock.tempo(), MIN_TEMPO);

        clock.set_tempo(MAX_TEMPO);
        clock.tempo_up();
        assert_eq!(clock.tempo(), MAX_TEMPO);
    }

    #[test]
    fn auto_beat_fires_after_one_period() {
        let mut clock = BeatClock::default();
        for _ in 0..14 {
            clock.advance(DT);
            assert!(!clock.maybe_auto_beat());
        }
        clock.advance(DT);
        assert!((clock.elapsed() - 0.5).abs() < 1e-9);
        assert!(clock.maybe_auto_beat());
        assert_eq!(clock.last_beat_time(), clock.elapsed());
        assert_eq!(clock.intensity(), 1.0);
    }

    #[test]
    fn late_check_fires_a_single_beat() {
        let mut clock = BeatClock::default();
        clock.advance(1.7);
        assert!(clock.maybe_auto_beat());
        assert!(!clock.maybe_auto_beat());
        assert_eq!(clock.phase(), 0.0);
    }

    #[test]
    fn manual_beat_toggles_auto_mode() {
        let mut clock = BeatClock::default();
        let original = clock.auto_beat();

        clock.advance(0.1);
        clock.manual_beat();
        assert_ne!(clock.auto_beat(), original);
        assert_eq!(clock.last_beat_time(), clock.elapsed());
        assert_eq!(clock.intensity(), 1.0);

        clock.manual_beat();
        assert_eq!(clock.auto_beat(), original);
    }

    #[test]
    fn manual_mode_lets_phase_grow() {
        let mut clock = BeatClock::default();
        clock.manual_beat();
        assert!(!clock.auto_beat());

        for _ in 0..300 {
            clock.advance(DT);
            assert!(!clock.maybe_auto_beat());
        }
        assert!(clock.phase() > 19.0);
        assert!(clock.window_position() < 1.0);
    }

    #[test]
    fn manual_mode_hits_every_beat_window_start() {
        let mut clock = BeatClock::default();
        clock.manual_beat();

        for beat in 0..40 {
            let mut hits = 0;
            for _ in 0..15 {
                clock.advance(DT);
                if clock.in_beat_window(0.1) {
                    hits += 1;
                }
            }
            assert_eq!(hits, 2, "beat {beat} at phase {}", clock.phase());
        }
    }

    #[test]
    fn envelope_reaches_exact_zero() {
        let mut envelope = BeatEnvelope::new(10);
        envelope.trigger();
        assert_eq!(envelope.intensity(), 1.0);

        let mut previous = envelope.intensity();
        for _ in 0..10 {
            envelope.decay();
            assert!(envelope.intensity() <= previous);
            previous = envelope.intensity();
        }
        assert_eq!(envelope.intensity(), 0.0);

        envelope.decay();
        assert_eq!(envelope.intensity(), 0.0);
    }

    #[test]
    fn envelope_steps_by_a_tenth() {
        let mut envelope = BeatEnvelope::default();
        envelope.trigger();
        envelope.decay();
        assert!((envelope.intensity() - 0.9).abs() < 1e-6);
        assert!((envelope.step() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn tempo_change_does_not_move_last_beat() {
        let mut clock = BeatClock::default();
        clock.advance(0.25);
        let before = clock.last_beat_time();
        clock.set_tempo(60);
        assert_eq!(clock.last_beat_time(), before);
        assert!((clock.phase() - 0.25).abs() < 1e-12);
    }
}
