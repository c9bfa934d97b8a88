use crate::error::{DesignerError, ReferenceError, SchedulerError, ValidationError};
use crate::frame::Frame;
use crate::types::{Button, SequenceId, Step, StepId, Trigger, Triggers, check_duration};

/// Where playback sits within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPosition {
    /// Identity of the showing step.
    pub step: StepId,
    /// Position of the showing step in playback order.
    pub order: usize,
    /// Milliseconds since the showing step began.
    pub elapsed_in_step_ms: u64,
    /// Milliseconds until the next step begins.
    pub remaining_ms: u64,
}

/// An ordered, named list of steps with button bindings.
///
/// A sequence always holds at least one step. Step `order` fields and the
/// cached total duration are recomputed after every structural edit, so
/// they never disagree with the list itself.
///
/// Structural edits are crate-private: step identities come from the
/// project's index counter, so all edits go through
/// [`Project`](crate::project::Project).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    index: SequenceId,
    order: usize,
    name: String,
    steps: Vec<Step>,
    triggers: Triggers,
    total_duration_ms: u64,
}

impl Sequence {
    /// Creates a sequence holding a single step.
    pub(crate) fn new(index: SequenceId, name: String, first: Step) -> Self {
        let mut sequence = Self {
            index,
            order: 0,
            name,
            steps: vec![first],
            triggers: Triggers::default(),
            total_duration_ms: 0,
        };
        sequence.recalculate();
        sequence
    }

    /// Builds a sequence from already-identified steps, in playback order.
    ///
    /// # Errors
    /// * `EmptySequence` - No steps given
    /// * `InvalidDuration` - A step lasts zero milliseconds
    pub(crate) fn from_parts(
        index: SequenceId,
        name: String,
        triggers: Triggers,
        steps: Vec<Step>,
    ) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::EmptySequence(index));
        }
        for step in &steps {
            check_duration(step.duration_ms)?;
        }

        let mut sequence = Self {
            index,
            order: 0,
            name,
            steps,
            triggers,
            total_duration_ms: 0,
        };
        sequence.recalculate();
        Ok(sequence)
    }

    /// Returns the stable identity of this sequence.
    pub fn index(&self) -> SequenceId {
        self.index
    }

    /// Returns the position among sibling sequences.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the steps in playback order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    /// Returns the sum of all step durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Returns the number of steps in this sequence.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Returns the step with the given identity.
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.index == id)
    }

    /// Resolves the step showing `elapsed_ms` into one pass of the sequence.
    ///
    /// `elapsed_ms` wraps modulo the total duration. Step intervals are
    /// half-open, so a step's own start boundary belongs to it.
    ///
    /// # Errors
    /// * `EmptySequence` - The sequence holds no steps
    /// * `ZeroDuration` - The total duration is zero
    pub fn position_at(&self, elapsed_ms: u64) -> Result<StepPosition, SchedulerError> {
        if self.steps.is_empty() {
            return Err(SchedulerError::EmptySequence);
        }
        if self.total_duration_ms == 0 {
            return Err(SchedulerError::ZeroDuration);
        }

        let time_in_loop = elapsed_ms % self.total_duration_ms;

        let mut accumulated = 0u64;
        for (order, step) in self.steps.iter().enumerate() {
            let step_end = accumulated + u64::from(step.duration_ms);
            if time_in_loop < step_end {
                return Ok(StepPosition {
                    step: step.index,
                    order,
                    elapsed_in_step_ms: time_in_loop - accumulated,
                    remaining_ms: step_end - time_in_loop,
                });
            }
            accumulated = step_end;
        }

        // time_in_loop < total, so the walk above always returns
        Err(SchedulerError::ZeroDuration)
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_trigger(&mut self, button: Button, trigger: Trigger) {
        self.triggers.set(button, trigger);
    }

    pub(crate) fn triggers_mut(&mut self) -> &mut Triggers {
        &mut self.triggers
    }

    /// Appends a step.
    pub(crate) fn push_step(&mut self, step: Step) {
        self.steps.push(step);
        self.recalculate();
    }

    /// Inserts a step directly after `after`.
    pub(crate) fn insert_step_after(
        &mut self,
        after: StepId,
        step: Step,
    ) -> Result<(), ReferenceError> {
        let pos = self.position_of(after)?;
        self.steps.insert(pos + 1, step);
        self.recalculate();
        Ok(())
    }

    /// Removes a step.
    ///
    /// # Errors
    /// * `UnknownStep` - No such step
    /// * `LastStep` - The step is the only one left
    pub(crate) fn remove_step(&mut self, id: StepId) -> Result<Step, DesignerError> {
        let pos = self.position_of(id)?;
        if self.steps.len() == 1 {
            return Err(ValidationError::LastStep(self.index).into());
        }
        let removed = self.steps.remove(pos);
        self.recalculate();
        Ok(removed)
    }

    /// Moves a step to `position`, clamped to the end of the list.
    pub(crate) fn move_step(&mut self, id: StepId, position: usize) -> Result<(), ReferenceError> {
        let pos = self.position_of(id)?;
        let step = self.steps.remove(pos);
        let position = position.min(self.steps.len());
        self.steps.insert(position, step);
        self.recalculate();
        Ok(())
    }

    pub(crate) fn set_step_duration(
        &mut self,
        id: StepId,
        duration_ms: u32,
    ) -> Result<(), DesignerError> {
        let duration_ms = check_duration(duration_ms)?;
        let pos = self.position_of(id)?;
        self.steps[pos].duration_ms = duration_ms;
        self.recalculate();
        Ok(())
    }

    /// Replaces a step's frame with the result of `edit`.
    ///
    /// The step is left untouched when `edit` fails.
    pub(crate) fn update_frame<F>(&mut self, id: StepId, edit: F) -> Result<(), DesignerError>
    where
        F: FnOnce(Frame) -> Result<Frame, ValidationError>,
    {
        let pos = self.position_of(id)?;
        let frame = edit(self.steps[pos].frame)?;
        self.steps[pos].frame = frame;
        Ok(())
    }

    fn position_of(&self, id: StepId) -> Result<usize, ReferenceError> {
        self.steps
            .iter()
            .position(|s| s.index == id)
            .ok_or(ReferenceError::UnknownStep {
                sequence: self.index,
                step: id,
            })
    }

    /// Recomputes step order and the total duration.
    fn recalculate(&mut self) {
        for (order, step) in self.steps.iter_mut().enumerate() {
            step.order = order;
        }
        self.total_duration_ms = self.steps.iter().map(|s| u64::from(s.duration_ms)).sum();
    }
}
