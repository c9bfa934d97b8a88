//! Time abstraction for platform-agnostic playback timing.

use serde::{Deserialize, Serialize};

/// A point in time, in milliseconds on the host's clock.
///
/// Only differences between timestamps are meaningful to playback, so any
/// monotonic millisecond counter works. Serialized as a bare integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Milliseconds since the clock's epoch.
    #[inline]
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Signed distance from `earlier` to `self`.
    ///
    /// Negative when the clock stepped backwards past `earlier`.
    #[inline]
    pub fn millis_since(&self, earlier: Timestamp) -> i128 {
        i128::from(self.0) - i128::from(earlier.0)
    }

    /// Adds milliseconds, saturating at the end of the clock range.
    #[inline]
    pub fn saturating_add(self, millis: u64) -> Self {
        Timestamp(self.0.saturating_add(millis))
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Timestamp(millis)
    }
}

/// Trait for abstracting time sources.
pub trait TimeSource {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source backed by [`std::time::SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(millis)
    }
}
