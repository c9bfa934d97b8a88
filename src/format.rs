//! Project document: the JSON shape used for export, import and undo
//! snapshots.
//!
//! ```json
//! {
//!   "version": 1,
//!   "start_time": 0,
//!   "current_sequence_index": 0,
//!   "sequences": [{
//!     "name": "Sequence 1", "index": 0, "order": 0,
//!     "triggers": {"mode": -1, "light": "playpause", "alarm": 3},
//!     "steps": [{
//!       "index": 1, "order": 0, "duration": 500,
//!       "hardware": {"led_0": false, "led_1": false, "buzzer": 0},
//!       "segments": [
//!         {"type": "digit", "digit": "digit_0", "data": {"segment_A": false, "...": false}},
//!         {"type": "special", "data": {"colon": false, "...": false}}
//!       ]
//!     }]
//!   }]
//! }
//! ```
//!
//! Converting a document back into frames validates every segment group:
//! each group must appear exactly once and carry exactly its own segments.

use crate::error::ValidationError;
use crate::frame::{Frame, Hardware};
use crate::segments::{Group, Segment};
use crate::sequence::Sequence;
use crate::time::Timestamp;
use crate::types::{SequenceId, Step, StepId, Triggers};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Newest document version this crate reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

/// Whole-project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub start_time: Timestamp,
    #[serde(default)]
    pub current_sequence_index: Option<SequenceId>,
    pub sequences: Vec<SequenceDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDocument {
    pub name: String,
    pub index: SequenceId,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub triggers: Triggers,
    pub steps: Vec<StepDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDocument {
    pub index: StepId,
    #[serde(default)]
    pub order: usize,
    pub duration: u32,
    #[serde(default)]
    pub hardware: Hardware,
    pub segments: Vec<SegmentGroupDocument>,
}

/// Segment states of one group, keyed by segment name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentGroupDocument {
    Digit {
        digit: String,
        data: BTreeMap<String, bool>,
    },
    Special {
        data: BTreeMap<String, bool>,
    },
}

impl ProjectDocument {
    /// Parses a document and checks its version.
    ///
    /// # Errors
    /// * `Malformed` - Not JSON, or not shaped like a project
    /// * `UnsupportedVersion` - Written by a newer format
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let doc: Self =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        if doc.version > FORMAT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: doc.version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(doc)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        // Plain data with string keys: serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl SequenceDocument {
    pub fn from_sequence(sequence: &Sequence) -> Self {
        Self {
            name: sequence.name().to_string(),
            index: sequence.index(),
            order: sequence.order(),
            triggers: *sequence.triggers(),
            steps: sequence.steps().iter().map(StepDocument::from_step).collect(),
        }
    }

    /// Rebuilds the sequence, ordering steps by their `order` field.
    pub fn to_sequence(&self) -> Result<Sequence, ValidationError> {
        let mut docs: Vec<&StepDocument> = self.steps.iter().collect();
        docs.sort_by_key(|s| s.order);
        let steps = docs
            .into_iter()
            .map(StepDocument::to_step)
            .collect::<Result<Vec<_>, _>>()?;
        Sequence::from_parts(self.index, self.name.clone(), self.triggers, steps)
    }
}

impl StepDocument {
    pub fn from_step(step: &Step) -> Self {
        Self {
            index: step.index,
            order: step.order,
            duration: step.duration_ms,
            hardware: step.frame.hardware(),
            segments: groups_from_frame(&step.frame),
        }
    }

    pub fn to_step(&self) -> Result<Step, ValidationError> {
        let frame = frame_from_groups(&self.segments)?.with_hardware(self.hardware);
        Ok(Step {
            index: self.index,
            order: self.order,
            duration_ms: self.duration,
            frame,
        })
    }
}

/// Lists every group of `frame` in document order.
pub fn groups_from_frame(frame: &Frame) -> Vec<SegmentGroupDocument> {
    Group::all()
        .map(|group| {
            let data = frame
                .group_states(group)
                .map(|(seg, on)| (seg.name.key().to_string(), on))
                .collect();
            match group {
                Group::Digit(_) => SegmentGroupDocument::Digit {
                    digit: group.id(),
                    data,
                },
                Group::Special => SegmentGroupDocument::Special { data },
            }
        })
        .collect()
}

/// Builds a frame's segment state from document groups.
///
/// # Errors
/// Any unknown, duplicate or missing group or segment.
pub fn frame_from_groups(groups: &[SegmentGroupDocument]) -> Result<Frame, ValidationError> {
    let mut frame = Frame::BLANK;
    let mut seen = BTreeSet::new();

    for doc in groups {
        let (group, data) = match doc {
            SegmentGroupDocument::Digit { digit, data } => (Group::parse_digit(digit)?, data),
            SegmentGroupDocument::Special { data } => (Group::Special, data),
        };
        if !seen.insert(group) {
            return Err(ValidationError::DuplicateGroup(group.id()));
        }

        for (key, on) in data {
            frame = frame.with_segment(Segment::lookup(group, key)?, *on)?;
        }
        if let Some(missing) = group.segments().find(|s| !data.contains_key(s.name.key())) {
            return Err(ValidationError::MissingSegment {
                group: group.id(),
                segment: missing.name.key().to_string(),
            });
        }
    }

    if let Some(missing) = Group::all().find(|g| !seen.contains(g)) {
        return Err(ValidationError::MissingGroup(missing.id()));
    }
    Ok(frame)
}
