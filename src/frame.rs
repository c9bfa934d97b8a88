//! Display frames: one instant of segment and hardware output state.

use crate::colors::LedColor;
use crate::error::ValidationError;
use crate::segments::{Group, SEGMENTS, Segment};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Indicator lights and buzzer for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hardware {
    /// Red indicator.
    pub led_0: bool,
    /// Green indicator.
    pub led_1: bool,
    /// Buzzer tone in Hz. Zero is silent.
    ///
    /// Always written as an integer. Numeric strings such as `"440"` are
    /// read too, as older exports stored the tone that way.
    #[serde(deserialize_with = "tone_hz")]
    pub buzzer: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTone {
    Hz(u32),
    Text(String),
}

fn tone_hz<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match RawTone::deserialize(deserializer)? {
        RawTone::Hz(hz) => Ok(hz),
        RawTone::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0);
            }
            text.parse()
                .map_err(|_| de::Error::invalid_value(Unexpected::Str(text), &"a buzzer tone in Hz"))
        }
    }
}

impl Hardware {
    /// Combined colour shown by the two indicators.
    #[inline]
    pub fn led_color(&self) -> LedColor {
        LedColor::from_leds(self.led_0, self.led_1)
    }
}

/// Immutable snapshot of every segment and hardware output.
///
/// Edits return a new frame. Segment state is kept as a bitset indexed by
/// catalogue position, so frames are `Copy` and compare in constant time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    bits: u128,
    hardware: Hardware,
}

impl Frame {
    /// All segments off, LEDs off, buzzer silent.
    pub const BLANK: Frame = Frame {
        bits: 0,
        hardware: Hardware {
            led_0: false,
            led_1: false,
            buzzer: 0,
        },
    };

    /// Returns true if the segment is lit. Unknown segments are never lit.
    #[inline]
    pub fn is_on(&self, segment: Segment) -> bool {
        segment
            .position()
            .is_some_and(|pos| self.bits & (1u128 << pos) != 0)
    }

    /// Returns a copy with one segment set.
    ///
    /// # Errors
    /// `UnknownSegment` if the glass has no such segment.
    pub fn with_segment(self, segment: Segment, on: bool) -> Result<Frame, ValidationError> {
        let pos = segment
            .position()
            .ok_or_else(|| ValidationError::UnknownSegment {
                group: segment.group.id(),
                segment: segment.name.key().to_string(),
            })?;
        let mask = 1u128 << pos;
        let bits = if on { self.bits | mask } else { self.bits & !mask };
        Ok(Frame { bits, ..self })
    }

    /// Returns a copy with the segment flipped.
    ///
    /// With `coupling` set, every segment sharing the electrode takes the
    /// flipped segment's new state.
    pub fn toggled(self, segment: Segment, coupling: bool) -> Result<Frame, ValidationError> {
        let on = !self.is_on(segment);
        let mut frame = self.with_segment(segment, on)?;
        if coupling {
            for member in segment.couple() {
                frame = frame.with_segment(*member, on)?;
            }
        }
        Ok(frame)
    }

    /// Returns a copy with new hardware outputs.
    #[inline]
    pub fn with_hardware(self, hardware: Hardware) -> Frame {
        Frame { hardware, ..self }
    }

    /// Hardware outputs of this frame.
    #[inline]
    pub fn hardware(&self) -> Hardware {
        self.hardware
    }

    /// Segments currently lit, in catalogue order.
    pub fn lit(&self) -> impl Iterator<Item = Segment> + '_ {
        SEGMENTS
            .iter()
            .enumerate()
            .filter(|(pos, _)| self.bits & (1u128 << pos) != 0)
            .map(|(_, seg)| *seg)
    }

    /// State of every segment in `group`, in catalogue order.
    pub fn group_states(&self, group: Group) -> impl Iterator<Item = (Segment, bool)> + '_ {
        group.segments().map(move |seg| (seg, self.is_on(seg)))
    }
}
