//! Button press classification.
//!
//! Turns raw press/release edges into single, double and long presses.
//! [`PressClassifier::poll`] must be called regularly (every display frame
//! is plenty) so that held buttons and expired double-press windows are
//! noticed without a further edge.

use crate::config::InputConfig;
use crate::time::Timestamp;
use crate::types::{Button, PressKind};
use heapless::Deque;

/// Classified presses waiting to be collected.
pub const EVENT_QUEUE_LEN: usize = 4;

/// Press classifier for one button.
#[derive(Debug, Clone)]
pub struct PressClassifier {
    button: Button,
    config: InputConfig,
    pressed: bool,
    pressed_at: Timestamp,
    long_fired: bool,
    first_release: Option<Timestamp>,
    events: Deque<PressKind, EVENT_QUEUE_LEN>,
}

impl PressClassifier {
    pub fn new(button: Button, config: InputConfig) -> Self {
        Self {
            button,
            config,
            pressed: false,
            pressed_at: Timestamp::default(),
            long_fired: false,
            first_release: None,
            events: Deque::new(),
        }
    }

    /// The button this classifier watches.
    pub fn button(&self) -> Button {
        self.button
    }

    /// Returns true while the button is held.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Button went down. Repeated presses while held are ignored.
    pub fn press(&mut self, now: Timestamp) {
        if self.pressed {
            return;
        }
        self.pressed = true;
        self.pressed_at = now;
    }

    /// Button came up.
    pub fn release(&mut self, now: Timestamp) {
        if !self.pressed {
            return;
        }
        self.pressed = false;

        if !self.long_fired {
            if !self.config.double_press_enabled {
                self.emit(PressKind::Single);
            } else if self.first_release.take().is_some() {
                self.emit(PressKind::Double);
            } else {
                self.first_release = Some(now);
            }
        }
        self.long_fired = false;
    }

    /// Pointer slid off the button: release without classifying.
    pub fn cancel(&mut self) {
        self.pressed = false;
        self.long_fired = false;
    }

    /// Fires presses that depend on elapsed time rather than an edge.
    pub fn poll(&mut self, now: Timestamp) {
        if !self.pressed && self.config.double_press_enabled {
            if let Some(released) = self.first_release {
                if now > released.saturating_add(self.config.double_press_threshold_ms) {
                    self.first_release = None;
                    self.emit(PressKind::Single);
                }
            }
        }

        if self.pressed
            && !self.long_fired
            && now > self.pressed_at.saturating_add(self.config.long_press_threshold_ms)
        {
            self.long_fired = true;
            self.emit(PressKind::Long);
        }
    }

    /// Takes the oldest classified press.
    pub fn next_event(&mut self) -> Option<PressKind> {
        self.events.pop_front()
    }

    fn emit(&mut self, kind: PressKind) {
        log::debug!("{:?} button {:?} press", self.button, kind);
        if let Err(kind) = self.events.push_back(kind) {
            // Full: drop the oldest press
            self.events.pop_front();
            let _ = self.events.push_back(kind);
        }
    }
}
