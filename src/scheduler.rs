//! Resolves which step of a sequence is showing at a given instant.
//!
//! Playback time is circular: the elapsed time since `start` is wrapped
//! modulo the sequence's total duration, then matched against each step's
//! half-open `[start, end)` interval. A clock that reads earlier than
//! `start` wraps backwards rather than failing.

use crate::error::SchedulerError;
use crate::sequence::{Sequence, StepPosition};
use crate::time::Timestamp;
use crate::types::Step;

/// Returns the step of `sequence` that is showing at `now` for playback
/// that began at `start`.
///
/// # Errors
/// * `EmptySequence` - The sequence holds no steps
/// * `ZeroDuration` - The total duration is zero
pub fn resolve_step(
    sequence: &Sequence,
    start: Timestamp,
    now: Timestamp,
) -> Result<&Step, SchedulerError> {
    let position = resolve_position(sequence, start, now)?;
    Ok(&sequence.steps()[position.order])
}

/// Like [`resolve_step`], but also reports timing within the showing step.
pub fn resolve_position(
    sequence: &Sequence,
    start: Timestamp,
    now: Timestamp,
) -> Result<StepPosition, SchedulerError> {
    if sequence.steps().is_empty() {
        return Err(SchedulerError::EmptySequence);
    }
    let total = sequence.total_duration_ms();
    if total == 0 {
        return Err(SchedulerError::ZeroDuration);
    }

    let elapsed = now.millis_since(start).rem_euclid(i128::from(total)) as u64;
    sequence.position_at(elapsed)
}
