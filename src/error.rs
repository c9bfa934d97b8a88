//! Error types, one per failure class.
//!
//! - [`ValidationError`]: rejected input. The edit is refused and prior state is kept.
//! - [`ReferenceError`]: an id that no longer resolves. Callers treat it as a no-op.
//! - [`SchedulerError`]: playback asked to resolve a sequence that breaks its invariants.
//! - [`StorageError`]: durable storage could not be read or written.

use crate::types::{SequenceId, StepId};

/// Input that cannot be applied to the project.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Duration text is not an integer of at least 1 millisecond.
    #[error("invalid duration {0:?}: expected a whole number of milliseconds >= 1")]
    InvalidDuration(String),

    /// Digit group id outside `digit_0`..`digit_9`.
    #[error("unknown digit group {0:?}")]
    UnknownGroup(String),

    /// Segment key that does not exist in its group.
    #[error("unknown segment {segment:?} in group {group}")]
    UnknownSegment { group: String, segment: String },

    /// Segment key the group defines but the data omitted.
    #[error("missing segment {segment:?} in group {group}")]
    MissingSegment { group: String, segment: String },

    /// Segment group listed twice in one step.
    #[error("segment group {0} listed more than once")]
    DuplicateGroup(String),

    /// Segment group absent from a step.
    #[error("segment group {0} missing")]
    MissingGroup(String),

    /// Imported sequence carries no steps.
    #[error("sequence {0} has no steps")]
    EmptySequence(SequenceId),

    /// Two entities share an index.
    #[error("index {0} is used more than once")]
    DuplicateIndex(u32),

    /// Index above [`MAX_INDEX`](crate::project::MAX_INDEX).
    #[error("index {0} is out of range")]
    IndexOutOfRange(u32),

    /// Trigger value that is neither -1, a command, nor a sequence index.
    #[error("unrecognised trigger {0:?}")]
    UnknownTrigger(String),

    /// Button name other than `mode`, `light` or `alarm`.
    #[error("unknown button {0:?}")]
    UnknownButton(String),

    /// Project document written by a newer format.
    #[error("unsupported project version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Document contains no sequences.
    #[error("project has no sequences")]
    NoSequences,

    /// Removing this step would leave its sequence empty.
    #[error("cannot delete the last step of sequence {0}")]
    LastStep(SequenceId),

    /// Removing this sequence would leave the project empty.
    #[error("cannot delete the last sequence")]
    LastSequence,

    /// Text that does not parse as a project document.
    #[error("malformed project document: {0}")]
    Malformed(String),
}

/// A reference to an entity that is not (or no longer) in the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("sequence {0} does not exist")]
    UnknownSequence(SequenceId),

    #[error("step {step} does not exist in sequence {sequence}")]
    UnknownStep { sequence: SequenceId, step: StepId },
}

/// Precondition violations detected while resolving the showing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// The sequence holds no steps.
    #[error("sequence has no steps")]
    EmptySequence,

    /// Every step of the sequence lasts zero milliseconds.
    #[error("sequence has zero total duration")]
    ZeroDuration,
}

/// Durable storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Any failure surfaced by a project operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesignerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}
