//! First-order low-pass filter
//!
//! Owned value object: the filter only changes through [`LowPassFilter::apply`],
//! [`LowPassFilter::reset`] and [`LowPassFilter::set_cutoff_frequency`]. The
//! autorotation controllers reconfigure the same filter across phases, so a
//! cutoff change keeps the output; only `reset` moves it.

use core::f32::consts::PI;

/// First-order IIR low-pass filter with a variable time step.
///
/// `alpha = dt / (dt + 1 / (2π·fc))`. A cutoff or time step of zero (or
/// below) makes the filter pass the sample through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    cutoff_hz: f32,
    output: f32,
}

impl LowPassFilter {
    /// Create a filter with the given cutoff and zero output
    pub const fn new(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            output: 0.0,
        }
    }

    /// Create a filter whose output starts at `output`
    pub const fn with_output(cutoff_hz: f32, output: f32) -> Self {
        Self { cutoff_hz, output }
    }

    /// Change the cutoff frequency. The current output is kept.
    pub fn set_cutoff_frequency(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
    }

    /// Current cutoff frequency (Hz)
    pub fn cutoff_frequency(&self) -> f32 {
        self.cutoff_hz
    }

    /// Force the output to `value`
    pub fn reset(&mut self, value: f32) {
        self.output = value;
    }

    /// Latest output
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Filter a new sample taken `dt` seconds after the previous one
    pub fn apply(&mut self, sample: f32, dt: f32) -> f32 {
        if !sample.is_finite() {
            // Keep the last good output
            return self.output;
        }
        if self.cutoff_hz <= 0.0 || dt <= 0.0 {
            self.output = sample;
            return self.output;
        }
        let rc = 1.0 / (2.0 * PI * self.cutoff_hz);
        let alpha = (dt / (dt + rc)).clamp(0.0, 1.0);
        self.output += (sample - self.output) * alpha;
        self.output
    }
}

impl Default for LowPassFilter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cutoff_passes_through() {
        let mut lpf = LowPassFilter::new(0.0);
        assert_eq!(lpf.apply(3.5, 0.0025), 3.5);
        assert_eq!(lpf.apply(-1.0, 0.0025), -1.0);
    }

    #[test]
    fn test_zero_dt_passes_through() {
        let mut lpf = LowPassFilter::new(2.0);
        lpf.reset(1.0);
        assert_eq!(lpf.apply(5.0, 0.0), 5.0);
    }

    #[test]
    fn test_single_step_alpha() {
        let mut lpf = LowPassFilter::new(1.0);
        let dt = 0.01;
        let rc = 1.0 / (2.0 * PI);
        let alpha = dt / (dt + rc);
        let out = lpf.apply(1.0, dt);
        assert!((out - alpha).abs() < 1e-6);
    }

    #[test]
    fn test_converges_to_step_input() {
        let mut lpf = LowPassFilter::new(10.0);
        for _ in 0..2000 {
            lpf.apply(2.0, 0.0025);
        }
        assert!((lpf.output() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset_sets_output() {
        let mut lpf = LowPassFilter::new(0.5);
        lpf.apply(10.0, 0.1);
        lpf.reset(0.4);
        assert_eq!(lpf.output(), 0.4);
    }

    #[test]
    fn test_with_output_starts_there() {
        let mut lpf = LowPassFilter::with_output(0.0, 0.4);
        assert_eq!(lpf.output(), 0.4);
        lpf.set_cutoff_frequency(1.0);
        assert_eq!(lpf.apply(0.4, 0.0025), 0.4);
    }

    #[test]
    fn test_cutoff_change_keeps_output() {
        let mut lpf = LowPassFilter::new(0.7);
        lpf.reset(0.4);
        lpf.set_cutoff_frequency(0.1);
        assert_eq!(lpf.output(), 0.4);
        assert_eq!(lpf.cutoff_frequency(), 0.1);
    }

    #[test]
    fn test_lower_cutoff_is_slower() {
        let mut fast = LowPassFilter::new(0.7);
        let mut slow = LowPassFilter::new(0.1);
        let a = fast.apply(1.0, 0.0025);
        let b = slow.apply(1.0, 0.0025);
        assert!(a > b);
    }

    #[test]
    fn test_non_finite_sample_holds_output() {
        let mut lpf = LowPassFilter::new(1.0);
        lpf.reset(0.25);
        assert_eq!(lpf.apply(f32::NAN, 0.01), 0.25);
        assert_eq!(lpf.apply(f32::INFINITY, 0.01), 0.25);
    }
}
