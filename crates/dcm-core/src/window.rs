//! Time-of-day windows for nested sub-choice contracts.
//!
//! Minutes count from the simulation day origin (3:00 AM), the convention
//! of the travel models this engine serves, so a whole day is `0..1440`
//! and an overnight activity never wraps.  A window is a half-open minute
//! range; only the arithmetic the nested-call contract needs lives here.

use std::fmt;

/// Half-open range of minutes after the 3:00 AM day origin.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    /// First minute inside the window.
    pub start_minute: u32,
    /// First minute past the window.
    pub end_minute: u32,
}

impl TimeWindow {
    /// Minutes in one simulation day.
    pub const MINUTES_PER_DAY: u32 = 1_440;

    /// The whole day, `0..1440`.
    pub const ALL_DAY: TimeWindow = TimeWindow {
        start_minute: 0,
        end_minute:   Self::MINUTES_PER_DAY,
    };

    /// Window covering `start_minute..end_minute`.
    #[inline]
    pub fn new(start_minute: u32, end_minute: u32) -> Self {
        debug_assert!(start_minute <= end_minute);
        Self { start_minute, end_minute }
    }

    /// `true` if `minute` falls inside the window.
    #[inline]
    pub fn contains(self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }

    /// Width of the window in minutes.
    #[inline]
    pub fn duration_minutes(self) -> u32 {
        self.end_minute - self.start_minute
    }

    /// `true` if the two windows share at least one minute.
    #[inline]
    pub fn overlaps(self, other: TimeWindow) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    /// `true` if the window has zero width.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.start_minute == self.end_minute
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start_minute, self.end_minute)
    }
}
