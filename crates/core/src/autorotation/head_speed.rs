//! Head speed / collective controller
//!
//! Holds the rotor at a normalised head speed target by moving collective.
//! The collective output and its trim filter live in [`Collective`], which
//! the flare controller takes over once the flare starts.

use crate::filter::LowPassFilter;

/// Fixed cutoff pushed to the motor library's throttle filter (Hz)
pub const THROTTLE_FILTER_CUTOFF_HZ: f32 = 2.0;

/// Collective assumed when the controller starts
pub const INITIAL_COLLECTIVE: f32 = 0.4;

/// Output understood by the motor library as "minimum collective"
pub const MIN_COLLECTIVE_SENTINEL: f32 = -1.0;

/// Collective output with its low-pass trim filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collective {
    output: f32,
    trim_lpf: LowPassFilter,
}

impl Collective {
    pub const fn new() -> Self {
        Self {
            output: INITIAL_COLLECTIVE,
            trim_lpf: LowPassFilter::with_output(0.0, INITIAL_COLLECTIVE),
        }
    }

    /// Last commanded collective, 0..1 or the minimum sentinel
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Last commanded collective usable as a throttle hand-over value
    pub fn last_valid(&self) -> f32 {
        if self.output < 0.0 {
            self.trim_lpf.output()
        } else {
            self.output
        }
    }

    /// Force the output and move the trim filter with it
    pub fn reset(&mut self, value: f32) {
        self.output = value;
        self.trim_lpf.reset(value);
    }

    /// Reset the trim filter to the current output
    pub fn reset_trim(&mut self) {
        self.trim_lpf.reset(self.last_valid());
    }

    pub fn set_cutoff_frequency(&mut self, cutoff_hz: f32) {
        self.trim_lpf.set_cutoff_frequency(cutoff_hz);
    }

    pub fn cutoff_frequency(&self) -> f32 {
        self.trim_lpf.cutoff_frequency()
    }

    pub fn trim(&self) -> f32 {
        self.trim_lpf.output()
    }

    /// Feed the previous output through the trim filter (feed-forward term)
    pub fn feed_forward(&mut self, dt: f32) -> f32 {
        let previous = self.last_valid();
        self.trim_lpf.apply(previous, dt)
    }

    /// Store a new output, clamped to 0..1 (NaN falls back to the trim)
    pub fn set(&mut self, value: f32) {
        self.output = sanitize_collective(value, self.trim_lpf.output());
    }

    /// Command the minimum collective sentinel
    pub fn set_minimum(&mut self) {
        self.output = MIN_COLLECTIVE_SENTINEL;
    }
}

impl Default for Collective {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a collective command to 0..1, replacing non-finite values
pub fn sanitize_collective(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else if fallback.is_finite() {
        fallback.clamp(0.0, 1.0)
    } else {
        INITIAL_COLLECTIVE
    }
}

/// Result of one head speed controller step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadSpeedStatus {
    /// Collective computed from the rotor speed
    Tracking,
    /// Unusable reading, previous collective held
    Holding,
    /// Sensor failed, minimum collective commanded
    MinimumCollective,
}

/// Proportional head speed controller with collective trim feed-forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadSpeedController {
    kp: f32,
    target_ratio: f32,
    head_speed_error: f32,
    p_term: f32,
    ff_term: f32,
}

impl HeadSpeedController {
    pub fn new(kp: f32) -> Self {
        Self {
            kp,
            target_ratio: 1.0,
            head_speed_error: 0.0,
            p_term: 0.0,
            ff_term: 0.0,
        }
    }

    /// Normalised head speed target
    pub fn set_target_ratio(&mut self, ratio: f32) {
        self.target_ratio = ratio;
    }

    pub fn target_ratio(&self) -> f32 {
        self.target_ratio
    }

    pub fn head_speed_error(&self) -> f32 {
        self.head_speed_error
    }

    pub fn p_term(&self) -> f32 {
        self.p_term
    }

    pub fn ff_term(&self) -> f32 {
        self.ff_term
    }

    /// One controller step.
    ///
    /// `ratio` is the measured rotor speed over the set point. A failed
    /// sensor commands the minimum collective; an unusable sample that has
    /// not yet failed the sensor holds the previous output.
    pub fn update(
        &mut self,
        collective: &mut Collective,
        ratio: f32,
        sample_usable: bool,
        sensor_failed: bool,
        dt: f32,
    ) -> HeadSpeedStatus {
        if sensor_failed {
            collective.set_minimum();
            return HeadSpeedStatus::MinimumCollective;
        }

        if !sample_usable || !ratio.is_finite() {
            let held = collective.last_valid();
            collective.set(held);
            return HeadSpeedStatus::Holding;
        }

        self.head_speed_error = ratio - self.target_ratio;
        self.p_term = self.kp * self.head_speed_error;
        self.ff_term = collective.feed_forward(dt);
        collective.set(self.p_term + self.ff_term);
        HeadSpeedStatus::Tracking
    }
}
