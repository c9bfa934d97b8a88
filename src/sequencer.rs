//! Playback driver.
//!
//! Provides [`Sequencer`], which follows a [`Project`] at display rate:
//! it resolves the showing step, hands every frame to the on-screen
//! [`Renderer`] and sends changed frames to the watch over a [`Transport`].

use crate::error::SchedulerError;
use crate::frame::Frame;
use crate::project::Project;
use crate::protocol::{FrameGate, Packet};
use crate::scheduler::resolve_position;
use crate::time::{TimeSource, Timestamp};
use crate::types::{SequenceId, StepId};

/// Sink for wire packets, e.g. a serial port.
///
/// Handle write errors internally - this method cannot fail.
pub trait Transport {
    fn send(&mut self, packet: &Packet);
}

/// On-screen preview of the showing frame.
pub trait Renderer {
    /// Draws `frame`, including its LED colour, and plays its buzzer tone.
    ///
    /// Called on every tick, whether or not the frame changed.
    fn render(&mut self, frame: &Frame);

    /// Stops the tone. Called once when playback stops.
    fn silence(&mut self) {}
}

/// Outcome of one [`Sequencer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Playback is stopped. Nothing was drawn.
    Stopped,

    /// A step is showing. Tick again within `remaining_ms`.
    Showing {
        sequence: SequenceId,
        step: StepId,
        /// Whether a packet went out on this tick.
        sent: bool,
        /// Milliseconds until the next step begins.
        remaining_ms: u64,
    },

    /// The current sequence could not be played; nothing was drawn.
    Skipped,
}

/// Drives a renderer and a transport from a project's playback state.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `T` - Transport implementation type
/// * `R` - Renderer implementation type
/// * `C` - Time source implementation type
pub struct Sequencer<'t, T: Transport, R: Renderer, C: TimeSource> {
    transport: T,
    renderer: R,
    time_source: &'t C,
    gate: FrameGate,
    showing: Option<(SequenceId, StepId)>,
    was_playing: bool,
}

impl<'t, T: Transport, R: Renderer, C: TimeSource> Sequencer<'t, T, R, C> {
    pub fn new(transport: T, renderer: R, time_source: &'t C) -> Self {
        Self {
            transport,
            renderer,
            time_source,
            gate: FrameGate::new(),
            showing: None,
            was_playing: false,
        }
    }

    /// Reads the time source.
    pub fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Advances playback by one display frame.
    ///
    /// The playing flag is checked first; a stopped project is never drawn.
    /// The first tick after playback stops silences the renderer and forgets
    /// the last sent frame, so resuming always re-sends.
    pub fn tick(&mut self, project: &Project) -> Tick {
        let animation = project.animation();
        if !animation.is_playing {
            if self.was_playing {
                self.renderer.silence();
                self.gate.reset();
                self.showing = None;
                self.was_playing = false;
            }
            return Tick::Stopped;
        }
        self.was_playing = true;

        let Some(sequence) = project.current_sequence() else {
            return Tick::Skipped;
        };

        let now = self.time_source.now();
        let position = match resolve_position(sequence, animation.start_time, now) {
            Ok(position) => position,
            Err(e) => {
                self.report(sequence.index(), e);
                return Tick::Skipped;
            }
        };

        let step = &sequence.steps()[position.order];
        let showing = (sequence.index(), step.index);
        if self.showing != Some(showing) {
            log::debug!("showing step {} of sequence {}", step.index, sequence.index());
            self.showing = Some(showing);
        }

        self.renderer.render(&step.frame);

        // Update the watch only if the frame changed
        let sent = match self.gate.admit(&step.frame) {
            Some(packet) => {
                self.transport.send(&packet);
                true
            }
            None => false,
        };

        Tick::Showing {
            sequence: showing.0,
            step: showing.1,
            sent,
            remaining_ms: position.remaining_ms,
        }
    }

    /// Returns the sequence and step shown by the last tick.
    pub fn showing(&self) -> Option<(SequenceId, StepId)> {
        self.showing
    }

    /// Returns the last frame sent over the transport.
    pub fn last_sent(&self) -> Option<&Frame> {
        self.gate.last_sent()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the sequencer, returning its transport and renderer.
    pub fn into_parts(self) -> (T, R) {
        (self.transport, self.renderer)
    }

    fn report(&self, sequence: SequenceId, error: SchedulerError) {
        debug_assert!(false, "sequence {sequence} cannot be played: {error}");
        log::error!("sequence {sequence} cannot be played: {error}");
    }
}
