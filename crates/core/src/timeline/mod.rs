use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    input::{FrameInput, InputEvent, InputSource},
    Result, VjError,
};

/// Input event pinned to a frame. With `until` set the event repeats on every
/// frame through `until` inclusive, like a held key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledInput {
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,
    pub event: InputEvent,
}

impl ScheduledInput {
    pub fn new(frame: u64, event: InputEvent) -> Self {
        Self {
            frame,
            until: None,
            event,
        }
    }

    pub fn held(frame: u64, until: u64, event: InputEvent) -> Self {
        Self {
            frame,
            until: Some(until),
            event,
        }
    }

    fn last_frame(&self) -> u64 {
        self.until.unwrap_or(self.frame)
    }

    fn covers(&self, frame: u64) -> bool {
        (self.frame..=self.last_frame()).contains(&frame)
    }
}

/// Frame-indexed input timeline used for headless and reproducible runs.
#[derive(Debug, Default, Clone)]
pub struct InputScript {
    events: Vec<ScheduledInput>,
    next_event: usize,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<ScheduledInput>) -> Result<Self> {
        let mut script = Self::new();
        script.set_events(events)?;
        Ok(script)
    }

    /// Reads a JSON array of [`ScheduledInput`] entries.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let script = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), events = script.len(), "loaded input script");
        Ok(script)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let events: Vec<ScheduledInput> = serde_json::from_str(raw)?;
        Self::from_events(events)
    }

    pub fn set_events(&mut self, events: Vec<ScheduledInput>) -> Result<()> {
        if let Some(bad) = events.iter().find(|e| e.last_frame() < e.frame) {
            return Err(VjError::InvalidScript(format!(
                "event {:?} ends at frame {} before it starts at frame {}",
                bad.event,
                bad.last_frame(),
                bad.frame
            )));
        }
        self.events = events;
        self.events.sort_by_key(|event| event.frame);
        self.next_event = 0;
        Ok(())
    }

    pub fn events(&self) -> &[ScheduledInput] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Frame of the first scripted quit, if any.
    pub fn quit_frame(&self) -> Option<u64> {
        self.events
            .iter()
            .filter(|e| e.event == InputEvent::Quit)
            .map(|e| e.frame)
            .min()
    }

    /// Events active on `frame`. Entries are kept sorted by start frame, so
    /// the scan stops at the first entry that starts later.
    pub fn events_at(&self, frame: u64) -> FrameInput {
        self.events
            .iter()
            .take_while(|e| e.frame <= frame)
            .filter(|e| e.covers(frame))
            .map(|e| e.event)
            .collect()
    }
}

impl InputSource for InputScript {
    /// Polls monotonically increasing frames; entries that have fully elapsed
    /// are skipped on later polls.
    fn poll(&mut self, frame: u64) -> FrameInput {
        while let Some(event) = self.events.get(self.next_event) {
            if event.last_frame() >= frame {
                break;
            }
            self.next_event += 1;
        }
        self.events[self.next_event..]
            .iter()
            .take_while(|e| e.frame <= frame)
            .filter(|e| e.covers(frame))
            .map(|e| e.event)
            .collect()
    }
}
