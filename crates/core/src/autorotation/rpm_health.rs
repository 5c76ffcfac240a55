//! RPM sensor health monitor
//!
//! Debounces rotor speed readings into a trustworthy/untrustworthy signal.
//! A bad reading degrades immediately; recovery needs a run of good readings.

/// Readings at or below this value are the driver's "unhealthy" sentinel
pub const RPM_UNHEALTHY_SENTINEL: f32 = -1.0;

/// Bad-sample count above which the sensor is treated as failed
pub const UNHEALTHY_LIMIT: u16 = 30;

/// Consecutive good samples needed to clear a degraded sensor
pub const RECOVERY_SAMPLES: u16 = 10;

/// True if a raw reading must not be used
pub fn is_bad_reading(raw: Option<f32>) -> bool {
    match raw {
        Some(rpm) => !rpm.is_finite() || rpm <= RPM_UNHEALTHY_SENTINEL,
        None => true,
    }
}

/// Unhealthy/healthy sample counters with asymmetric hysteresis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RpmHealth {
    unhealthy_count: u16,
    healthy_count: u16,
}

impl RpmHealth {
    pub const fn new() -> Self {
        Self {
            unhealthy_count: 0,
            healthy_count: 0,
        }
    }

    /// Clear both counters
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Count one reading.
    ///
    /// Returns the reading (0 when the sensor is missing) and whether the
    /// signal is currently trustworthy, i.e. no unrecovered bad samples.
    pub fn sample(&mut self, raw: Option<f32>) -> (f32, bool) {
        if is_bad_reading(raw) {
            self.unhealthy_count = self.unhealthy_count.saturating_add(1);
            self.healthy_count = 0;
        } else if self.unhealthy_count > 0 {
            self.healthy_count += 1;
            if self.healthy_count >= RECOVERY_SAMPLES {
                self.reset();
            }
        }
        (raw.unwrap_or(0.0), self.unhealthy_count == 0)
    }

    /// Sustained failure: minimum collective must be applied
    pub fn is_failed(&self) -> bool {
        self.unhealthy_count > UNHEALTHY_LIMIT
    }

    pub fn unhealthy_count(&self) -> u16 {
        self.unhealthy_count
    }

    pub fn healthy_count(&self) -> u16 {
        self.healthy_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(health: &mut RpmHealth, raw: Option<f32>, n: usize) {
        for _ in 0..n {
            health.sample(raw);
        }
    }

    #[test]
    fn test_bad_reading_classification() {
        assert!(is_bad_reading(None));
        assert!(is_bad_reading(Some(-1.0)));
        assert!(is_bad_reading(Some(-5.0)));
        assert!(is_bad_reading(Some(f32::NAN)));
        assert!(!is_bad_reading(Some(-0.5)));
        assert!(!is_bad_reading(Some(0.0)));
        assert!(!is_bad_reading(Some(1500.0)));
    }

    #[test]
    fn test_single_bad_sample_degrades_immediately() {
        let mut health = RpmHealth::new();
        let (rpm, healthy) = health.sample(Some(-1.0));
        assert_eq!(rpm, -1.0);
        assert!(!healthy);
        assert!(!health.is_failed());
    }

    #[test]
    fn test_missing_sensor_reads_zero() {
        let mut health = RpmHealth::new();
        assert_eq!(health.sample(None), (0.0, false));
    }

    #[test]
    fn test_thirty_bad_samples_not_failed() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(-1.0), 30);
        assert!(!health.is_failed());
    }

    #[test]
    fn test_thirty_one_bad_samples_failed() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(-1.0), 31);
        assert!(health.is_failed());
    }

    #[test]
    fn test_nine_good_samples_do_not_clear() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(-1.0), 31);
        feed(&mut health, Some(1500.0), 9);
        assert!(health.is_failed());
        assert_eq!(health.healthy_count(), 9);
    }

    #[test]
    fn test_ten_good_samples_clear() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(-1.0), 31);
        feed(&mut health, Some(1500.0), 9);
        let (_, healthy) = health.sample(Some(1500.0));
        assert!(healthy);
        assert!(!health.is_failed());
        assert_eq!(health.unhealthy_count(), 0);
        assert_eq!(health.healthy_count(), 0);
    }

    #[test]
    fn test_bad_sample_restarts_recovery() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(-1.0), 31);
        feed(&mut health, Some(1500.0), 8);
        health.sample(Some(-1.0));
        assert_eq!(health.healthy_count(), 0);
        feed(&mut health, Some(1500.0), 9);
        assert!(health.is_failed());
    }

    #[test]
    fn test_good_samples_while_healthy_do_not_count() {
        let mut health = RpmHealth::new();
        feed(&mut health, Some(1500.0), 50);
        assert_eq!(health.healthy_count(), 0);
        assert_eq!(health.unhealthy_count(), 0);
    }

    #[test]
    fn test_counter_saturates() {
        let mut health = RpmHealth::new();
        feed(&mut health, None, u16::MAX as usize + 5);
        assert_eq!(health.unhealthy_count(), u16::MAX);
        assert!(health.is_failed());
    }
}
