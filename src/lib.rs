#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Project`**: Every sequence, the current selection, playback state and undo history
//! - **`Sequence`**: An ordered, named list of steps with button bindings
//! - **`Step`**: A frame held for a duration
//! - **`Frame`**: Which segments are lit, plus LED and buzzer state
//! - **`Segment`**: One addressable element of the watch display
//! - **`Trigger`**: What a button does while a sequence is current
//! - **`Sequencer`**: Drives a `Renderer` and a `Transport` from a project's playback state
//! - **`Transport`**: Trait to implement for the link to the watch
//! - **`Renderer`**: Trait to implement for the on-screen preview
//! - **`TimeSource`**: Trait to implement for your clock
//! - **`KeyValueStore`**: Trait to implement for durable history storage
//! - **`Command`**: Inbound events that can be dispatched to a project
//!
//! LED preview colours are `Srgb<f32>` values from `palette`.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod colors;
pub mod command;
pub mod config;
pub mod error;
pub mod format;
pub mod frame;
pub mod history;
pub mod input;
pub mod project;
pub mod protocol;
pub mod scheduler;
pub mod segments;
pub mod sequence;
pub mod sequencer;
pub mod storage;
pub mod time;
pub mod types;

pub use colors::LedColor;
pub use command::Command;
pub use config::{DEFAULT_HISTORY_LIMIT, DesignerConfig, InputConfig};
pub use error::{DesignerError, ReferenceError, SchedulerError, StorageError, ValidationError};
pub use format::{FORMAT_VERSION, ProjectDocument};
pub use frame::{Frame, Hardware};
pub use history::{HistoryStack, UndoState};
pub use input::PressClassifier;
pub use project::{AnimationState, MAX_INDEX, Project};
pub use protocol::{FrameGate, PACKET_LEN, Packet, encode};
pub use scheduler::{resolve_position, resolve_step};
pub use segments::{Group, SEGMENTS, Segment, SegmentName};
pub use sequence::{Sequence, StepPosition};
pub use sequencer::{Renderer, Sequencer, Tick, Transport};
pub use storage::{FileStore, InMemoryStore, KeyValueStore};
pub use time::{SystemClock, TimeSource, Timestamp};
pub use types::{
    Button, DEFAULT_DURATION_MS, PressKind, SequenceId, Step, StepId, Trigger, Triggers,
    TransportAction,
};
