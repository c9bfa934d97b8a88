//! The project: every sequence, the current selection, playback state and
//! undo history.
//!
//! All edits go through [`Project`]. Each user-visible edit records exactly
//! one history snapshot after it has been applied; a rejected edit records
//! nothing and leaves the project as it was. Selection changes replace the
//! snapshot at the cursor instead of adding an undo step.
//!
//! Sequence and step indices come from one project-wide counter that only
//! moves forward, so an index is never handed out twice, even across
//! deletes, undo and import.

use crate::command::Command;
use crate::config::DesignerConfig;
use crate::error::{DesignerError, ReferenceError, ValidationError};
use crate::format::{FORMAT_VERSION, ProjectDocument, SequenceDocument};
use crate::frame::Hardware;
use crate::history::{HistoryStack, UndoState};
use crate::segments::Segment;
use crate::sequence::Sequence;
use crate::time::Timestamp;
use crate::types::{
    Button, PressKind, SequenceId, Step, StepId, Trigger, TransportAction, parse_duration,
};
use std::collections::BTreeSet;

/// Largest index a project document may carry. The range above it is left
/// for indices handed out after import.
pub const MAX_INDEX: u32 = i32::MAX as u32;

/// Playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub is_playing: bool,
    /// When the current sequence started from its first step.
    pub start_time: Timestamp,
}

/// Owns all sequences and orchestrates editing, playback and history.
#[derive(Debug)]
pub struct Project {
    config: DesignerConfig,
    sequences: Vec<Sequence>,
    current: Option<SequenceId>,
    index_counter: u32,
    animation: AnimationState,
    history: HistoryStack<ProjectDocument>,
}

impl Project {
    /// Creates a project with one blank sequence and an in-memory history.
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_history(config, HistoryStack::new())
    }

    /// Creates a project on top of an existing (possibly persisted) history.
    ///
    /// The snapshot at the history cursor is restored if it is valid;
    /// otherwise the project starts blank and records that as its first
    /// snapshot. The history is capped at `config.history_limit` snapshots.
    pub fn with_history(config: DesignerConfig, mut history: HistoryStack<ProjectDocument>) -> Self {
        history.set_limit(config.history_limit);
        let mut project = Self {
            config,
            sequences: Vec::new(),
            current: None,
            index_counter: 0,
            animation: AnimationState::default(),
            history,
        };

        let restored = match project.history.retrieve().cloned() {
            Some(doc) => match project.put_state(&doc) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("stored project snapshot rejected, starting blank: {e}");
                    false
                }
            },
            None => false,
        };

        if !restored {
            let id = project.create_sequence();
            project.current = Some(id);
            project.commit();
        }
        project
    }

    /// Returns a fresh index. Indices are unique across sequences and steps.
    pub fn next_index(&mut self) -> u32 {
        let index = self.index_counter;
        self.index_counter = index.saturating_add(1);
        index
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// Turns segment coupling on or off for subsequent toggles.
    pub fn set_segment_coupling(&mut self, enabled: bool) {
        self.config.segment_coupling = enabled;
    }

    /// Returns the sequences in display order.
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.index() == id)
    }

    pub fn current_sequence_id(&self) -> Option<SequenceId> {
        self.current
    }

    pub fn current_sequence(&self) -> Option<&Sequence> {
        self.current.and_then(|id| self.sequence(id))
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    pub fn is_playing(&self) -> bool {
        self.animation.is_playing
    }

    pub fn has_undo(&self) -> UndoState {
        self.history.has_undo()
    }

    pub fn history(&self) -> &HistoryStack<ProjectDocument> {
        &self.history
    }

    // ------------------------------------------------------------------
    // Document state
    // ------------------------------------------------------------------

    /// Captures the whole project as a document.
    pub fn get_state(&self) -> ProjectDocument {
        ProjectDocument {
            version: FORMAT_VERSION,
            start_time: self.animation.start_time,
            current_sequence_index: self.current,
            sequences: self
                .sequences
                .iter()
                .map(SequenceDocument::from_sequence)
                .collect(),
        }
    }

    /// Replaces the project with `doc`, without touching history.
    ///
    /// The document is fully validated before anything changes. Sequences
    /// and steps are arranged by their `order` fields; triggers that point at
    /// sequences absent from the document are cleared; a current sequence
    /// that does not exist falls back to the first sequence. Playing state is
    /// kept, the start time is taken from the document.
    ///
    /// # Errors
    /// * `UnsupportedVersion` - Document from a newer format
    /// * `NoSequences` - Document holds no sequences
    /// * `DuplicateIndex` - Two sequences, or two steps of one sequence, share an index
    /// * `IndexOutOfRange` - An index above [`MAX_INDEX`]
    /// * Any frame or duration validation error
    pub fn put_state(&mut self, doc: &ProjectDocument) -> Result<(), ValidationError> {
        if doc.version > FORMAT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: doc.version,
                supported: FORMAT_VERSION,
            });
        }
        if doc.sequences.is_empty() {
            return Err(ValidationError::NoSequences);
        }

        let mut sequence_ids = BTreeSet::new();
        let mut highest = 0u32;
        for seq in &doc.sequences {
            if !sequence_ids.insert(seq.index) {
                return Err(ValidationError::DuplicateIndex(seq.index.0));
            }
            highest = highest.max(seq.index.0);
            let mut step_ids = BTreeSet::new();
            for step in &seq.steps {
                if !step_ids.insert(step.index) {
                    return Err(ValidationError::DuplicateIndex(step.index.0));
                }
                highest = highest.max(step.index.0);
            }
        }
        if highest > MAX_INDEX {
            return Err(ValidationError::IndexOutOfRange(highest));
        }

        let mut docs: Vec<&SequenceDocument> = doc.sequences.iter().collect();
        docs.sort_by_key(|s| s.order);
        let mut sequences = docs
            .into_iter()
            .map(SequenceDocument::to_sequence)
            .collect::<Result<Vec<_>, _>>()?;

        for seq in &mut sequences {
            for button in Button::ALL {
                if let Trigger::Jump(target) = seq.triggers().get(button) {
                    if !sequence_ids.contains(&target) {
                        log::warn!(
                            "sequence {} {button:?} trigger points at missing sequence {target}, cleared",
                            seq.index()
                        );
                        seq.set_trigger(button, Trigger::None);
                    }
                }
            }
        }

        let current = doc
            .current_sequence_index
            .filter(|id| sequence_ids.contains(id))
            .or_else(|| sequences.first().map(Sequence::index));

        self.sequences = sequences;
        self.renumber_sequences();
        self.current = current;
        self.animation.start_time = doc.start_time;
        self.index_counter = self.index_counter.max(highest + 1);
        Ok(())
    }

    /// Serializes the project for export.
    pub fn export_json(&self) -> String {
        self.get_state().to_json()
    }

    /// Replaces the project with an exported document. Undoable.
    pub fn import_json(&mut self, json: &str) -> Result<(), DesignerError> {
        let doc = ProjectDocument::from_json(json)?;
        self.put_state(&doc)?;
        log::info!("imported project with {} sequences", self.sequences.len());
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Starts playback of the current sequence from its first step.
    /// Does nothing if already playing.
    pub fn play(&mut self, now: Timestamp) {
        if self.animation.is_playing {
            return;
        }
        self.animation = AnimationState {
            is_playing: true,
            start_time: now,
        };
        log::info!("playback started");
    }

    /// Stops playback. Does nothing if already stopped.
    pub fn pause(&mut self) {
        if !self.animation.is_playing {
            return;
        }
        self.animation.is_playing = false;
        log::info!("playback paused");
    }

    pub fn play_pause(&mut self, now: Timestamp) {
        if self.animation.is_playing {
            self.pause();
        } else {
            self.play(now);
        }
    }

    pub fn transport(&mut self, action: TransportAction, now: Timestamp) {
        match action {
            TransportAction::Play => self.play(now),
            TransportAction::Pause => self.pause(),
            TransportAction::PlayPause => self.play_pause(now),
        }
    }

    /// Makes `id` the current sequence.
    ///
    /// While playing, switching to a different sequence restarts playback
    /// at its first step.
    pub fn select_sequence(&mut self, id: SequenceId, now: Timestamp) -> Result<(), ReferenceError> {
        self.require_sequence(id)?;
        self.set_current(id, now);
        self.record_selection();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sequence edits
    // ------------------------------------------------------------------

    /// Appends a new sequence holding one blank step.
    pub fn add_sequence(&mut self) -> SequenceId {
        let id = self.create_sequence();
        self.commit();
        id
    }

    /// Copies a sequence and all its steps under fresh indices, placing the
    /// copy directly after the source.
    pub fn duplicate_sequence(&mut self, id: SequenceId) -> Result<SequenceId, DesignerError> {
        let pos = self.sequence_position(id)?;
        let source = self.sequences[pos].clone();

        let new_id = SequenceId(self.next_index());
        let steps = source
            .steps()
            .iter()
            .map(|step| Step {
                index: StepId(self.next_index()),
                ..*step
            })
            .collect();
        let copy = Sequence::from_parts(
            new_id,
            format!("{} copy", source.name()),
            *source.triggers(),
            steps,
        )?;

        self.sequences.insert(pos + 1, copy);
        self.renumber_sequences();
        self.commit();
        Ok(new_id)
    }

    /// Deletes a sequence and clears every trigger that jumped to it.
    ///
    /// Deleting the current sequence selects its successor (or the new last
    /// sequence).
    ///
    /// # Errors
    /// * `UnknownSequence` - No such sequence
    /// * `LastSequence` - It is the only sequence
    pub fn delete_sequence(&mut self, id: SequenceId, now: Timestamp) -> Result<(), DesignerError> {
        let pos = self.sequence_position(id)?;
        if self.sequences.len() == 1 {
            return Err(ValidationError::LastSequence.into());
        }

        self.sequences.remove(pos);
        let cleared: usize = self
            .sequences
            .iter_mut()
            .map(|s| s.triggers_mut().clear_jumps_to(id))
            .sum();
        if cleared > 0 {
            log::debug!("cleared {cleared} triggers pointing at deleted sequence {id}");
        }
        self.renumber_sequences();

        if self.current == Some(id) {
            let next = self.sequences[pos.min(self.sequences.len() - 1)].index();
            self.current = None;
            self.set_current(next, now);
        }
        self.commit();
        Ok(())
    }

    /// Moves a sequence to `position`, clamped to the end of the list.
    pub fn move_sequence(&mut self, id: SequenceId, position: usize) -> Result<(), DesignerError> {
        let pos = self.sequence_position(id)?;
        let sequence = self.sequences.remove(pos);
        let position = position.min(self.sequences.len());
        self.sequences.insert(position, sequence);
        self.renumber_sequences();
        if pos != position {
            self.commit();
        }
        Ok(())
    }

    /// Commits an edited name. An unchanged name records nothing.
    pub fn rename_sequence(&mut self, id: SequenceId, name: &str) -> Result<(), DesignerError> {
        let sequence = self.sequence_mut(id)?;
        if sequence.name() == name {
            return Ok(());
        }
        sequence.set_name(name.to_string());
        self.commit();
        Ok(())
    }

    /// Binds a button of sequence `id`.
    ///
    /// # Errors
    /// `UnknownSequence` for `id`, or for a jump target that does not exist.
    pub fn set_trigger(
        &mut self,
        id: SequenceId,
        button: Button,
        trigger: Trigger,
    ) -> Result<(), DesignerError> {
        if let Trigger::Jump(target) = trigger {
            self.require_sequence(target)?;
        }
        let sequence = self.sequence_mut(id)?;
        if sequence.triggers().get(button) == trigger {
            return Ok(());
        }
        sequence.set_trigger(button, trigger);
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Step edits
    // ------------------------------------------------------------------

    /// Appends a blank step to a sequence.
    pub fn add_step(&mut self, sequence: SequenceId) -> Result<StepId, DesignerError> {
        self.require_sequence(sequence)?;
        let step = self.blank_step();
        let id = step.index;
        self.sequence_mut(sequence)?.push_step(step);
        self.commit();
        Ok(id)
    }

    /// Inserts a blank step directly after `after`.
    pub fn insert_step_after(
        &mut self,
        sequence: SequenceId,
        after: StepId,
    ) -> Result<StepId, DesignerError> {
        self.require_step(sequence, after)?;
        let step = self.blank_step();
        let id = step.index;
        self.sequence_mut(sequence)?.insert_step_after(after, step)?;
        self.commit();
        Ok(id)
    }

    /// Inserts a copy of `source` directly after it.
    pub fn duplicate_step(
        &mut self,
        sequence: SequenceId,
        source: StepId,
    ) -> Result<StepId, DesignerError> {
        let original = *self.require_step(sequence, source)?;
        let id = StepId(self.next_index());
        let copy = Step {
            index: id,
            ..original
        };
        self.sequence_mut(sequence)?.insert_step_after(source, copy)?;
        self.commit();
        Ok(id)
    }

    /// Deletes a step. The last step of a sequence cannot be deleted.
    pub fn delete_step(&mut self, sequence: SequenceId, step: StepId) -> Result<(), DesignerError> {
        self.sequence_mut(sequence)?.remove_step(step)?;
        self.commit();
        Ok(())
    }

    /// Moves a step to `position` within its sequence.
    pub fn move_step(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        position: usize,
    ) -> Result<(), DesignerError> {
        let before = self.require_step(sequence, step)?.order;
        self.sequence_mut(sequence)?.move_step(step, position)?;
        if self.require_step(sequence, step)?.order != before {
            self.commit();
        }
        Ok(())
    }

    /// Sets a step duration. An unchanged duration records nothing.
    pub fn set_step_duration(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        duration_ms: u32,
    ) -> Result<(), DesignerError> {
        if self.require_step(sequence, step)?.duration_ms == duration_ms {
            return Ok(());
        }
        self.sequence_mut(sequence)?.set_step_duration(step, duration_ms)?;
        self.commit();
        Ok(())
    }

    /// Commits duration text typed into the editor.
    ///
    /// # Errors
    /// `InvalidDuration` unless the text is a whole number >= 1.
    pub fn set_step_duration_text(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        text: &str,
    ) -> Result<(), DesignerError> {
        let duration_ms = parse_duration(text)?;
        self.set_step_duration(sequence, step, duration_ms)
    }

    /// Flips a segment, carrying coupled segments along when coupling is on.
    pub fn toggle_segment(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        segment: Segment,
    ) -> Result<(), DesignerError> {
        let coupling = self.config.segment_coupling;
        self.sequence_mut(sequence)?
            .update_frame(step, |frame| frame.toggled(segment, coupling))?;
        self.commit();
        Ok(())
    }

    /// Sets one segment without coupling.
    pub fn set_segment(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        segment: Segment,
        on: bool,
    ) -> Result<(), DesignerError> {
        if self.require_step(sequence, step)?.frame.is_on(segment) == on {
            return Ok(());
        }
        self.sequence_mut(sequence)?
            .update_frame(step, |frame| frame.with_segment(segment, on))?;
        self.commit();
        Ok(())
    }

    /// Sets the LEDs and buzzer of a step.
    pub fn set_hardware(
        &mut self,
        sequence: SequenceId,
        step: StepId,
        hardware: Hardware,
    ) -> Result<(), DesignerError> {
        if self.require_step(sequence, step)?.frame.hardware() == hardware {
            return Ok(());
        }
        self.sequence_mut(sequence)?
            .update_frame(step, |frame| Ok(frame.with_hardware(hardware)))?;
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Restores the previous snapshot. Returns false if there is none.
    ///
    /// A snapshot that fails validation is skipped over: the project and
    /// the history cursor both stay where they were.
    pub fn undo(&mut self, now: Timestamp) -> bool {
        let Some(doc) = self.history.peek_undo().cloned() else {
            return false;
        };
        if !self.restore(&doc, now) {
            return false;
        }
        self.history.undo();
        true
    }

    /// Restores the next snapshot. Returns false if there is none.
    pub fn redo(&mut self, now: Timestamp) -> bool {
        let Some(doc) = self.history.peek_redo().cloned() else {
            return false;
        };
        if !self.restore(&doc, now) {
            return false;
        }
        self.history.redo();
        true
    }

    fn restore(&mut self, doc: &ProjectDocument, now: Timestamp) -> bool {
        let animation = self.animation;
        let previous = self.current;
        if let Err(e) = self.put_state(doc) {
            log::error!("history snapshot rejected: {e}");
            return false;
        }
        self.animation = animation;
        if animation.is_playing && self.current != previous {
            self.animation.start_time = now;
        }
        true
    }

    // ------------------------------------------------------------------
    // Buttons and commands
    // ------------------------------------------------------------------

    /// Runs the current sequence's binding for `button`.
    ///
    /// Releases are ignored. A jump selects the target sequence and makes
    /// sure playback is running; a jump to a sequence that no longer exists
    /// does nothing.
    pub fn handle_button(&mut self, button: Button, kind: PressKind, now: Timestamp) {
        if !kind.activates() {
            return;
        }
        let Some(trigger) = self.current_sequence().map(|s| s.triggers().get(button)) else {
            return;
        };

        match trigger {
            Trigger::None => {}
            Trigger::Transport(action) => self.transport(action, now),
            Trigger::Jump(target) => {
                if self.sequence(target).is_none() {
                    log::warn!("{button:?} trigger points at missing sequence {target}");
                    return;
                }
                self.set_current(target, now);
                self.play(now);
                self.record_selection();
            }
        }
    }

    /// Dispatches a command to the matching operation.
    ///
    /// Returns the exported document for [`Command::Export`] and `None` for
    /// every other command.
    pub fn handle_command(
        &mut self,
        command: Command,
        now: Timestamp,
    ) -> Result<Option<String>, DesignerError> {
        match command {
            Command::Transport(action) => self.transport(action, now),
            Command::Undo => {
                self.undo(now);
            }
            Command::Redo => {
                self.redo(now);
            }
            Command::AddSequence => {
                self.add_sequence();
            }
            Command::DuplicateSequence(id) => {
                self.duplicate_sequence(id)?;
            }
            Command::DeleteSequence(id) => self.delete_sequence(id, now)?,
            Command::SelectSequence(id) => self.select_sequence(id, now)?,
            Command::MoveSequence { sequence, position } => {
                self.move_sequence(sequence, position)?
            }
            Command::RenameSequence { sequence, name } => self.rename_sequence(sequence, &name)?,
            Command::SetTrigger {
                sequence,
                button,
                trigger,
            } => self.set_trigger(sequence, button, trigger)?,
            Command::AddStep { sequence } => {
                self.add_step(sequence)?;
            }
            Command::InsertStepAfter { sequence, step } => {
                self.insert_step_after(sequence, step)?;
            }
            Command::DuplicateStep { sequence, step } => {
                self.duplicate_step(sequence, step)?;
            }
            Command::DeleteStep { sequence, step } => self.delete_step(sequence, step)?,
            Command::MoveStep {
                sequence,
                step,
                position,
            } => self.move_step(sequence, step, position)?,
            Command::SetDuration {
                sequence,
                step,
                text,
            } => self.set_step_duration_text(sequence, step, &text)?,
            Command::ToggleSegment {
                sequence,
                step,
                segment,
            } => self.toggle_segment(sequence, step, segment)?,
            Command::SetHardware {
                sequence,
                step,
                hardware,
            } => self.set_hardware(sequence, step, hardware)?,
            Command::Import(json) => self.import_json(&json)?,
            Command::Export => return Ok(Some(self.export_json())),
            Command::Button { button, kind } => self.handle_button(button, kind, now),
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit(&mut self) {
        let snapshot = self.get_state();
        self.history.save(&snapshot);
    }

    fn record_selection(&mut self) {
        let snapshot = self.get_state();
        self.history.overwrite(&snapshot);
    }

    fn set_current(&mut self, id: SequenceId, now: Timestamp) {
        if self.current == Some(id) {
            return;
        }
        self.current = Some(id);
        if self.animation.is_playing {
            self.animation.start_time = now;
        }
        log::debug!("current sequence is now {id}");
    }

    fn create_sequence(&mut self) -> SequenceId {
        let id = SequenceId(self.next_index());
        let first = self.blank_step();
        let mut n = self.sequences.len() + 1;
        while self.sequences.iter().any(|s| s.name() == format!("Sequence {n}")) {
            n += 1;
        }
        let name = format!("Sequence {n}");
        self.sequences.push(Sequence::new(id, name, first));
        self.renumber_sequences();
        id
    }

    fn blank_step(&mut self) -> Step {
        Step::new(StepId(self.next_index()), self.config.default_step_duration_ms)
    }

    fn renumber_sequences(&mut self) {
        for (order, sequence) in self.sequences.iter_mut().enumerate() {
            sequence.set_order(order);
        }
    }

    fn sequence_position(&self, id: SequenceId) -> Result<usize, ReferenceError> {
        self.sequences
            .iter()
            .position(|s| s.index() == id)
            .ok_or(ReferenceError::UnknownSequence(id))
    }

    fn require_sequence(&self, id: SequenceId) -> Result<&Sequence, ReferenceError> {
        self.sequence(id).ok_or(ReferenceError::UnknownSequence(id))
    }

    fn require_step(&self, sequence: SequenceId, step: StepId) -> Result<&Step, ReferenceError> {
        self.require_sequence(sequence)?
            .step(step)
            .ok_or(ReferenceError::UnknownStep { sequence, step })
    }

    fn sequence_mut(&mut self, id: SequenceId) -> Result<&mut Sequence, ReferenceError> {
        self.sequences
            .iter_mut()
            .find(|s| s.index() == id)
            .ok_or(ReferenceError::UnknownSequence(id))
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}
