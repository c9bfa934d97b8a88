//! Command-based control for projects.
//!
//! Every inbound presentation event maps onto one [`Command`], so a UI can
//! forward events without matching on them itself. Dispatch happens in
//! [`Project::handle_command`](crate::project::Project::handle_command).

use crate::frame::Hardware;
use crate::segments::Segment;
use crate::types::{Button, PressKind, SequenceId, StepId, Trigger, TransportAction};

/// Actions for editing and playing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Play, pause or toggle playback.
    Transport(TransportAction),
    Undo,
    Redo,

    /// Append a new sequence holding one blank step.
    AddSequence,
    /// Copy a sequence and its steps under fresh indices.
    DuplicateSequence(SequenceId),
    DeleteSequence(SequenceId),
    /// Make a sequence current. Not an undo step.
    SelectSequence(SequenceId),
    MoveSequence {
        sequence: SequenceId,
        position: usize,
    },
    /// Commit an edited name.
    RenameSequence {
        sequence: SequenceId,
        name: String,
    },
    SetTrigger {
        sequence: SequenceId,
        button: Button,
        trigger: Trigger,
    },

    /// Append a blank step.
    AddStep { sequence: SequenceId },
    /// Insert a blank step after `step`.
    InsertStepAfter { sequence: SequenceId, step: StepId },
    /// Insert a copy of `step` after it.
    DuplicateStep { sequence: SequenceId, step: StepId },
    DeleteStep { sequence: SequenceId, step: StepId },
    MoveStep {
        sequence: SequenceId,
        step: StepId,
        position: usize,
    },
    /// Commit duration text typed into the editor.
    SetDuration {
        sequence: SequenceId,
        step: StepId,
        text: String,
    },
    ToggleSegment {
        sequence: SequenceId,
        step: StepId,
        segment: Segment,
    },
    SetHardware {
        sequence: SequenceId,
        step: StepId,
        hardware: Hardware,
    },

    /// Replace the project with an imported document.
    Import(String),
    /// Serialize the project. The document is returned from dispatch.
    Export,
    /// A watch button event.
    Button { button: Button, kind: PressKind },
}
