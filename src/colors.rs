//! Indicator LED colours.
//!
//! The two indicator LEDs sit under one diffuser: `led_0` is red, `led_1` is
//! green, and both together read as yellow. Preview colours are returned as
//! `palette::Srgb` so renderers can feed them straight into their drawing code.

use palette::Srgb;

pub const OFF: Srgb = Srgb::new(0.0, 0.0, 0.0);
pub const RED: Srgb = Srgb::new(1.0, 0.0, 0.0);
pub const GREEN: Srgb = Srgb::new(0.0, 1.0, 0.0);
pub const YELLOW: Srgb = Srgb::new(1.0, 1.0, 0.0);

/// Colour produced by the indicator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedColor {
    Off,
    Red,
    Green,
    Yellow,
}

impl LedColor {
    /// Packs the LED states as a 2-bit value (`led_0` = bit 0, `led_1` = bit 1).
    #[inline]
    pub fn from_leds(led_0: bool, led_1: bool) -> Self {
        match (led_0 as u8) | ((led_1 as u8) << 1) {
            0 => LedColor::Off,
            1 => LedColor::Red,
            2 => LedColor::Green,
            _ => LedColor::Yellow,
        }
    }

    /// Character code sent on the wire.
    #[inline]
    pub fn wire_code(&self) -> u8 {
        match self {
            LedColor::Off => b'0',
            LedColor::Red => b'R',
            LedColor::Green => b'G',
            LedColor::Yellow => b'Y',
        }
    }

    /// Colour for on-screen previews.
    #[inline]
    pub fn preview(&self) -> Srgb {
        match self {
            LedColor::Off => OFF,
            LedColor::Red => RED,
            LedColor::Green => GREEN,
            LedColor::Yellow => YELLOW,
        }
    }
}
