//! Time abstraction for the fixed-period control loop.
//!
//! Timestamps are monotonic `u32` millisecond counters, the same width the
//! flight stack hands to flight modes. All duration arithmetic goes through
//! [`elapsed_ms`] so that a counter wrap between two readings is harmless.

use core::cell::Cell;

/// Milliseconds elapsed from `start_ms` to `now_ms`, tolerant of counter wrap.
///
/// The durations measured by the autorotation mode (entry timer, flare
/// timer, bailout timer) are seconds long, far below the ~49 day wrap period.
#[inline]
pub fn elapsed_ms(now_ms: u32, start_ms: u32) -> u32 {
    now_ms.wrapping_sub(start_ms)
}

/// Same as [`elapsed_ms`], converted to seconds.
#[inline]
pub fn elapsed_s(now_ms: u32, start_ms: u32) -> f32 {
    elapsed_ms(now_ms, start_ms) as f32 / 1000.0
}

/// Platform-agnostic time source.
///
/// - Firmware provides an implementation backed by the hardware timer
/// - [`MockTime`] is used for host testing with controllable time
///
/// # Example
///
/// ```
/// use heli_arot_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let start = time.millis();
/// time.advance_ms(2500);
/// assert_eq!(time.elapsed_since(start), 2500);
/// ```
pub trait TimeSource {
    /// Current time in milliseconds since system start (wraps at `u32::MAX`).
    fn millis(&self) -> u32;

    /// Milliseconds elapsed since `reference_ms`, wrap-safe.
    fn elapsed_since(&self, reference_ms: u32) -> u32 {
        elapsed_ms(self.millis(), reference_ms)
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source with manual advancement.
#[derive(Clone, Default)]
pub struct MockTime {
    current_ms: Cell<u32>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(ms: u32) -> Self {
        Self {
            current_ms: Cell::new(ms),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, ms: u32) {
        self.current_ms.set(ms);
    }

    /// Advances the current time, wrapping like the hardware counter.
    pub fn advance_ms(&self, ms: u32) {
        self.current_ms.set(self.current_ms.get().wrapping_add(ms));
    }
}

impl TimeSource for MockTime {
    fn millis(&self) -> u32 {
        self.current_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_initial_value() {
        let time = MockTime::new();
        assert_eq!(time.millis(), 0);
    }

    #[test]
    fn mock_time_with_initial() {
        let time = MockTime::with_initial(5_000);
        assert_eq!(time.millis(), 5_000);
    }

    #[test]
    fn mock_time_advance() {
        let time = MockTime::new();
        time.advance_ms(400);
        time.advance_ms(600);
        assert_eq!(time.millis(), 1_000);
    }

    #[test]
    fn elapsed_across_counter_wrap() {
        let start = u32::MAX - 499;
        let time = MockTime::with_initial(start);
        time.advance_ms(1_500);
        assert_eq!(time.millis(), 1_000);
        assert_eq!(time.elapsed_since(start), 1_500);
        assert!((elapsed_s(time.millis(), start) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn elapsed_plain() {
        assert_eq!(elapsed_ms(10_000, 3_000), 7_000);
        assert!((elapsed_s(2_000, 0) - 2.0).abs() < 1e-6);
    }
}
