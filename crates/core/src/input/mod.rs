use serde::{Deserialize, Serialize};

/// Discrete control observed during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputEvent {
    Quit,
    SelectEffect(usize),
    /// Held control: one BPM down per frame it is present.
    TempoDown,
    /// Held control: one BPM up per frame it is present.
    TempoUp,
    /// Forces a beat onset and toggles AUTO/MANUAL.
    BeatOverride,
}

/// All events observed during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    events: Vec<InputEvent>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, event: InputEvent) -> Self {
        self.push(event);
        self
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, event: InputEvent) -> bool {
        self.events.contains(&event)
    }

    pub fn quit(&self) -> bool {
        self.contains(InputEvent::Quit)
    }

    /// Selection requests in the order they arrived.
    pub fn selections(&self) -> impl Iterator<Item = usize> + '_ {
        self.events.iter().filter_map(|event| match event {
            InputEvent::SelectEffect(index) => Some(*index),
            _ => None,
        })
    }
}

impl FromIterator<InputEvent> for FrameInput {
    fn from_iter<I: IntoIterator<Item = InputEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Anything able to report the controls pressed on a given frame.
pub trait InputSource {
    fn poll(&mut self, frame: u64) -> FrameInput;
}

/// Source that never reports any input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _frame: u64) -> FrameInput {
        FrameInput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_round_trip_through_kebab_case_json() {
        let events = vec![
            InputEvent::Quit,
            InputEvent::SelectEffect(3),
            InputEvent::BeatOverride,
        ];
        let json = serde_json::to_string(&events).unwrap();
        assert_eq!(json, r#"["quit",{"select-effect":3},"beat-override"]"#);
    }

    #[test]
    fn collects_selections_in_order() {
        let input: FrameInput = [
            InputEvent::SelectEffect(2),
            InputEvent::TempoUp,
            InputEvent::SelectEffect(7),
        ]
        .into_iter()
        .collect();

        assert_eq!(input.selections().collect::<Vec<_>>(), vec![2, 7]);
        assert!(!input.quit());
        assert!(FrameInput::new().with(InputEvent::Quit).quit());
    }

    #[test]
    fn silent_source_reports_nothing() {
        let mut source = NoInput;
        assert!((0..100).all(|frame| source.poll(frame).is_empty()));
    }
}
