//! Segment catalogue for the watch face.
//!
//! The glass carries ten digit slots and one group of indicator icons:
//!
//! | group      | segments                                   |
//! |------------|--------------------------------------------|
//! | `digit_0`  | A–G plus H, I (weekday glyph strokes)      |
//! | `digit_1`  | A–G plus the decimal dot                   |
//! | `digit_2`  | A–E, G (no F pixel on the glass)           |
//! | `digit_3`–`digit_9` | A–G                               |
//! | special    | colon, signal, bell, pm, hr (24h), lap     |
//!
//! Every segment has a fixed position in [`SEGMENTS`], which is also its bit
//! in a [`Frame`](crate::frame::Frame).

use crate::error::ValidationError;

/// Number of digit slots on the face.
pub const DIGIT_COUNT: u8 = 10;

/// One group of segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Group {
    /// Digit slot `0..DIGIT_COUNT`.
    Digit(u8),
    /// Indicator icons.
    Special,
}

impl Group {
    /// Parses a digit group id such as `digit_4`.
    pub fn parse_digit(id: &str) -> Result<Self, ValidationError> {
        id.strip_prefix("digit_")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n < DIGIT_COUNT && id.len() == "digit_0".len())
            .map(Group::Digit)
            .ok_or_else(|| ValidationError::UnknownGroup(id.to_string()))
    }

    /// Group id as used in the project document.
    pub fn id(&self) -> String {
        match self {
            Group::Digit(n) => format!("digit_{n}"),
            Group::Special => "special".to_string(),
        }
    }

    /// The segments this group defines, in catalogue order.
    pub fn segments(self) -> impl Iterator<Item = Segment> {
        SEGMENTS.iter().copied().filter(move |s| s.group == self)
    }

    /// All groups in document order: digits first, then special.
    pub fn all() -> impl Iterator<Item = Group> {
        (0..DIGIT_COUNT).map(Group::Digit).chain(core::iter::once(Group::Special))
    }
}

impl core::fmt::Display for Group {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Group::Digit(n) => write!(f, "digit_{n}"),
            Group::Special => write!(f, "special"),
        }
    }
}

/// Name of a segment within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    Dot,
    Colon,
    Signal,
    Bell,
    Pm,
    Hr,
    Lap,
}

impl SegmentName {
    /// Key used for this segment in the project document.
    pub fn key(&self) -> &'static str {
        match self {
            SegmentName::A => "segment_A",
            SegmentName::B => "segment_B",
            SegmentName::C => "segment_C",
            SegmentName::D => "segment_D",
            SegmentName::E => "segment_E",
            SegmentName::F => "segment_F",
            SegmentName::G => "segment_G",
            SegmentName::H => "segment_H",
            SegmentName::I => "segment_I",
            SegmentName::Dot => "segment_dot",
            SegmentName::Colon => "colon",
            SegmentName::Signal => "signal",
            SegmentName::Bell => "bell",
            SegmentName::Pm => "pm",
            SegmentName::Hr => "hr",
            SegmentName::Lap => "lap",
        }
    }
}

/// A single addressable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    pub group: Group,
    pub name: SegmentName,
}

impl Segment {
    /// Creates a digit segment. Not checked against the catalogue.
    pub const fn digit(slot: u8, name: SegmentName) -> Self {
        Self {
            group: Group::Digit(slot),
            name,
        }
    }

    /// Creates an indicator segment. Not checked against the catalogue.
    pub const fn special(name: SegmentName) -> Self {
        Self {
            group: Group::Special,
            name,
        }
    }

    /// Position in [`SEGMENTS`], or `None` if the glass has no such segment.
    pub fn position(&self) -> Option<usize> {
        SEGMENTS.iter().position(|s| s == self)
    }

    /// Looks up a segment by its group and document key.
    pub fn lookup(group: Group, key: &str) -> Result<Self, ValidationError> {
        group
            .segments()
            .find(|s| s.name.key() == key)
            .ok_or_else(|| ValidationError::UnknownSegment {
                group: group.id(),
                segment: key.to_string(),
            })
    }

    /// Segments sharing an electrode with this one, including itself.
    ///
    /// Returns a single-element slice for uncoupled segments.
    pub fn couple(&self) -> &'static [Segment] {
        if let Some(couple) = COUPLES.iter().copied().find(|c| c.contains(self)) {
            return couple;
        }
        match self.position() {
            Some(pos) => core::slice::from_ref(&SEGMENTS[pos]),
            None => &[],
        }
    }
}

impl core::fmt::Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.group, self.name.key())
    }
}

use SegmentName::*;

const fn d(slot: u8, name: SegmentName) -> Segment {
    Segment::digit(slot, name)
}

const fn s(name: SegmentName) -> Segment {
    Segment::special(name)
}

/// Total number of segments on the face.
pub const SEGMENT_COUNT: usize = 78;

/// Every segment in document order.
#[rustfmt::skip]
pub static SEGMENTS: [Segment; SEGMENT_COUNT] = [
    d(0, A), d(0, B), d(0, C), d(0, D), d(0, E), d(0, F), d(0, G), d(0, H), d(0, I),
    d(1, A), d(1, B), d(1, C), d(1, D), d(1, E), d(1, F), d(1, G), d(1, Dot),
    d(2, A), d(2, B), d(2, C), d(2, D), d(2, E), d(2, G),
    d(3, A), d(3, B), d(3, C), d(3, D), d(3, E), d(3, F), d(3, G),
    d(4, A), d(4, B), d(4, C), d(4, D), d(4, E), d(4, F), d(4, G),
    d(5, A), d(5, B), d(5, C), d(5, D), d(5, E), d(5, F), d(5, G),
    d(6, A), d(6, B), d(6, C), d(6, D), d(6, E), d(6, F), d(6, G),
    d(7, A), d(7, B), d(7, C), d(7, D), d(7, E), d(7, F), d(7, G),
    d(8, A), d(8, B), d(8, C), d(8, D), d(8, E), d(8, F), d(8, G),
    d(9, A), d(9, B), d(9, C), d(9, D), d(9, E), d(9, F), d(9, G),
    s(Colon), s(Signal), s(Bell), s(Pm), s(Hr), s(Lap),
];

/// Segments wired to a shared electrode. The first member is the one the
/// wire table addresses.
pub const COUPLES: &[&[Segment]] = &[
    &[d(1, B), d(1, C)],
    &[d(1, E), d(1, F)],
    &[d(2, A), d(2, D), d(2, G)],
    &[d(4, A), d(4, D)],
    &[d(6, A), d(6, D)],
];
