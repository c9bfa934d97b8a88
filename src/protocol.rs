//! Wire encoding for the watch-face hardware.
//!
//! Every frame travels as a fixed 12-byte packet:
//!
//! | byte  | content                                             |
//! |-------|-----------------------------------------------------|
//! | 0     | [`FRAME_MARKER`]                                    |
//! | 1..=9 | pixel bitfields, LSB first, laid out by [`WIRE_MAP`] |
//! | 10    | [`LED_MARKER`]                                      |
//! | 11    | LED colour code, see [`wire_code`](crate::colors::LedColor::wire_code) |
//!
//! The buzzer is simulated locally and never sent.

use crate::frame::Frame;
use crate::segments::{Segment, SegmentName};

/// Length of an encoded packet.
pub const PACKET_LEN: usize = 12;

/// Number of pixel bitfield bytes.
pub const PIXEL_BYTES: usize = 9;

/// First byte of every packet.
pub const FRAME_MARKER: u8 = b'#';

/// Byte preceding the LED colour code.
pub const LED_MARKER: u8 = b'L';

/// One encoded frame.
pub type Packet = [u8; PACKET_LEN];

/// What a single bit of the pixel bitfields carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixel {
    /// Drives the electrode of this segment.
    Segment(Segment),
    /// No electrode behind this bit. Always encodes `false`.
    Reserved,
}

use SegmentName::*;

const fn d(slot: u8, name: SegmentName) -> Pixel {
    Pixel::Segment(Segment::digit(slot, name))
}

const fn s(name: SegmentName) -> Pixel {
    Pixel::Segment(Segment::special(name))
}

const GAP: Pixel = Pixel::Reserved;

/// Pixel carried by each bit, indexed `[byte][bit]` with byte 0 being the
/// first pixel byte (packet byte 1).
///
/// Fixed by the PCB routing. Couples are addressed through their first
/// member only; `digit_1.segment_dot` has no electrode. Byte 2 bit 2 is the
/// hole left by the missing `digit_2` F pixel.
#[rustfmt::skip]
pub const WIRE_MAP: [[Pixel; 8]; PIXEL_BYTES] = [
    [d(0, A), d(0, B), d(0, C), d(0, D), d(0, E), d(0, F), d(0, G), d(0, H)],
    [d(0, I), d(1, A), d(1, B), d(1, D), d(1, E), d(1, G), d(2, A), d(2, B)],
    [d(2, C), d(2, E), GAP,     d(3, A), d(3, B), d(3, C), d(3, D), d(3, E)],
    [d(3, F), d(3, G), s(Colon), s(Signal), s(Bell), s(Pm), s(Hr), s(Lap)],
    [d(4, A), d(4, B), d(4, C), d(4, E), d(4, F), d(4, G), d(5, A), d(5, B)],
    [d(5, C), d(5, D), d(5, E), d(5, F), d(5, G), d(6, A), d(6, B), d(6, C)],
    [d(6, E), d(6, F), d(6, G), d(7, A), d(7, B), d(7, C), d(7, D), d(7, E)],
    [d(7, F), d(7, G), d(8, A), d(8, B), d(8, C), d(8, D), d(8, E), d(8, F)],
    [d(8, G), d(9, A), d(9, B), d(9, C), d(9, D), d(9, E), d(9, F), d(9, G)],
];

/// Encodes a frame into its wire packet.
pub fn encode(frame: &Frame) -> Packet {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = FRAME_MARKER;

    for (byte_idx, row) in WIRE_MAP.iter().enumerate() {
        let mut byte = 0u8;
        for (bit, pixel) in row.iter().enumerate() {
            if let Pixel::Segment(segment) = pixel {
                if frame.is_on(*segment) {
                    byte |= 1 << bit;
                }
            }
        }
        packet[1 + byte_idx] = byte;
    }

    packet[1 + PIXEL_BYTES] = LED_MARKER;
    packet[2 + PIXEL_BYTES] = frame.hardware().led_color().wire_code();
    packet
}

/// Byte and bit carrying `segment`, or `None` if it has no electrode.
///
/// The byte is a packet offset (1..=9).
pub fn wire_position(segment: Segment) -> Option<(usize, u8)> {
    WIRE_MAP.iter().enumerate().find_map(|(byte_idx, row)| {
        row.iter()
            .position(|p| *p == Pixel::Segment(segment))
            .map(|bit| (1 + byte_idx, bit as u8))
    })
}

/// Change-detection gate in front of the transport.
///
/// Lets a frame through only if it differs from the last frame that was
/// let through.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    last_sent: Option<Frame>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the packet to send, or `None` if `frame` repeats the last one.
    pub fn admit(&mut self, frame: &Frame) -> Option<Packet> {
        if self.last_sent.as_ref() == Some(frame) {
            return None;
        }
        self.last_sent = Some(*frame);
        Some(encode(frame))
    }

    /// Forgets the last frame so the next one always goes out.
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    /// Returns the last frame let through.
    pub fn last_sent(&self) -> Option<&Frame> {
        self.last_sent.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Hardware;
    use crate::segments::SEGMENTS;

    #[test]
    fn blank_frame_encodes_to_markers_and_zeros() {
        let packet = encode(&Frame::BLANK);
        assert_eq!(
            packet,
            [b'#', 0, 0, 0, 0, 0, 0, 0, 0, 0, b'L', b'0']
        );
    }

    #[test]
    fn wire_map_addresses_each_segment_at_most_once() {
        let mut seen = 0;
        for row in WIRE_MAP.iter() {
            for pixel in row.iter() {
                if let Pixel::Segment(seg) = pixel {
                    assert!(seg.position().is_some(), "{seg} is not on the glass");
                    seen += 1;
                }
            }
        }
        assert_eq!(seen, 71);

        let reserved = WIRE_MAP.iter().flatten().filter(|p| **p == Pixel::Reserved).count();
        assert_eq!(reserved, 1);

        let wired: Vec<_> = SEGMENTS.iter().filter(|s| wire_position(**s).is_some()).collect();
        assert_eq!(wired.len(), 71);
    }

    #[test]
    fn each_wired_segment_flips_exactly_one_bit() {
        let blank = encode(&Frame::BLANK);
        for seg in SEGMENTS.iter().copied() {
            let Some((byte, bit)) = wire_position(seg) else {
                continue;
            };
            let frame = Frame::BLANK.with_segment(seg, true).unwrap();
            let packet = encode(&frame);
            for i in 0..PACKET_LEN {
                let expected = if i == byte { blank[i] | (1 << bit) } else { blank[i] };
                assert_eq!(packet[i], expected, "{seg} touched byte {i}");
            }
        }
    }

    #[test]
    fn unwired_segments_do_not_reach_the_wire() {
        let dot = Segment::digit(1, SegmentName::Dot);
        let coupled = Segment::digit(2, SegmentName::G);
        let frame = Frame::BLANK
            .with_segment(dot, true)
            .unwrap()
            .with_segment(coupled, true)
            .unwrap();
        assert_eq!(encode(&frame), encode(&Frame::BLANK));
    }

    #[test]
    fn first_and_last_bits_map_as_routed() {
        let frame = Frame::BLANK
            .with_segment(Segment::digit(0, SegmentName::A), true)
            .unwrap()
            .with_segment(Segment::digit(9, SegmentName::G), true)
            .unwrap();
        let packet = encode(&frame);
        assert_eq!(packet[1], 0b0000_0001);
        assert_eq!(packet[9], 0b1000_0000);
    }

    #[test]
    fn led_byte_tracks_hardware() {
        let frame = Frame::BLANK.with_hardware(Hardware {
            led_0: true,
            led_1: true,
            buzzer: 880,
        });
        let packet = encode(&frame);
        assert_eq!(packet[10], b'L');
        assert_eq!(packet[11], b'Y');
    }

    #[test]
    fn gate_drops_repeated_frames() {
        let mut gate = FrameGate::new();
        assert!(gate.admit(&Frame::BLANK).is_some());
        assert!(gate.admit(&Frame::BLANK).is_none());

        let lit = Frame::BLANK
            .with_segment(Segment::special(SegmentName::Colon), true)
            .unwrap();
        assert!(gate.admit(&lit).is_some());
        assert!(gate.admit(&Frame::BLANK).is_some());

        gate.reset();
        assert!(gate.admit(&Frame::BLANK).is_some());
    }
}
