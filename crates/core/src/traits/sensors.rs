//! Sensor collaborator traits
//!
//! The autorotation engine reads the rotor speed and the navigation
//! estimate once per tick through these traits. Firmware wires them to the
//! real drivers; the mocks below feed synthetic inputs in tests.

use libm::{cosf, sinf};

/// Standard gravity (m/s/s)
pub const GRAVITY_MSS: f32 = 9.80665;

/// Number of RPM sensor instances selectable by `AROT_HS_SENSOR`
pub const RPM_INSTANCES: usize = 2;

/// Main rotor RPM source
pub trait RpmSensor {
    /// Latest reading for `instance`.
    ///
    /// `None` when the sensor is not available at all. A reading of −1 or
    /// below is the driver's "unhealthy" sentinel.
    fn rpm(&self, instance: u8) -> Option<f32>;
}

/// Navigation estimate sampled once per control tick.
///
/// Vertical quantities follow the inertial-nav convention (positive up),
/// horizontal earth-frame vectors are north/east, acceleration is NED.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavState {
    /// Vertical velocity (cm/s, positive up)
    pub velocity_z_cms: f32,
    /// Altitude above the landing surface (cm)
    pub altitude_cm: f32,
    /// Ground speed vector, north/east (m/s)
    pub groundspeed_ms: [f32; 2],
    /// Cosine of the yaw angle
    pub cos_yaw: f32,
    /// Sine of the yaw angle
    pub sin_yaw: f32,
    /// Pitch angle (rad, nose up positive)
    pub pitch_rad: f32,
    /// Blended earth-frame acceleration, NED (m/s/s)
    pub accel_ef_mss: [f32; 3],
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            velocity_z_cms: 0.0,
            altitude_cm: 0.0,
            groundspeed_ms: [0.0, 0.0],
            cos_yaw: 1.0,
            sin_yaw: 0.0,
            pitch_rad: 0.0,
            accel_ef_mss: [0.0, 0.0, -GRAVITY_MSS],
        }
    }
}

impl NavState {
    /// Build a snapshot for straight flight along `yaw_rad`.
    ///
    /// Convenience for tests and the simulator: forward speed and forward
    /// acceleration are projected back onto the north/east axes.
    pub fn along_heading(
        yaw_rad: f32,
        forward_speed_ms: f32,
        velocity_z_cms: f32,
        altitude_cm: f32,
    ) -> Self {
        let cos_yaw = cosf(yaw_rad);
        let sin_yaw = sinf(yaw_rad);
        Self {
            velocity_z_cms,
            altitude_cm,
            groundspeed_ms: [forward_speed_ms * cos_yaw, forward_speed_ms * sin_yaw],
            cos_yaw,
            sin_yaw,
            ..Self::default()
        }
    }

    /// Set the measured forward and vertical acceleration (cm/s/s, vertical
    /// positive up), keeping the heading.
    pub fn with_accel_cms2(mut self, accel_z_cms2: f32, accel_fwd_cms2: f32) -> Self {
        let fwd_mss = accel_fwd_cms2 / 100.0;
        self.accel_ef_mss = [
            fwd_mss * self.cos_yaw,
            fwd_mss * self.sin_yaw,
            -accel_z_cms2 / 100.0,
        ];
        self
    }

    /// Forward ground speed: ground-speed vector projected on the heading (cm/s)
    pub fn speed_forward_cms(&self) -> f32 {
        (self.groundspeed_ms[0] * self.cos_yaw + self.groundspeed_ms[1] * self.sin_yaw) * 100.0
    }

    /// Measured acceleration decomposed into (vertical up, forward) in cm/s/s
    pub fn accel_z_fwd_cms2(&self) -> (f32, f32) {
        let z_accel = self.accel_ef_mss[2] * -100.0;
        let fwd_accel =
            (self.accel_ef_mss[0] * self.cos_yaw + self.accel_ef_mss[1] * self.sin_yaw) * 100.0;
        (z_accel, fwd_accel)
    }

    /// Pitch angle in degrees
    pub fn pitch_deg(&self) -> f32 {
        self.pitch_rad.to_degrees()
    }
}

/// Inertial navigation / AHRS estimate
pub trait NavigationSource {
    /// Snapshot of the current estimate
    fn nav_state(&self) -> NavState;
}

// ============================================================================
// Mock Implementations (always available for testing)
// ============================================================================

/// RPM sensor returning programmable readings
#[derive(Debug, Clone, Default)]
pub struct MockRpmSensor {
    /// Reading per instance (`None` = instance missing)
    pub readings: [Option<f32>; RPM_INSTANCES],
}

impl MockRpmSensor {
    /// Sensor with instance 0 reporting `rpm`
    pub fn new(rpm: f32) -> Self {
        Self {
            readings: [Some(rpm), None],
        }
    }

    /// Update the instance 0 reading
    pub fn set(&mut self, rpm: f32) {
        self.readings[0] = Some(rpm);
    }
}

impl RpmSensor for MockRpmSensor {
    fn rpm(&self, instance: u8) -> Option<f32> {
        self.readings.get(instance as usize).copied().flatten()
    }
}

/// Navigation source returning a programmable snapshot
#[derive(Debug, Clone, Default)]
pub struct MockNavigation {
    /// Snapshot returned by `nav_state`
    pub state: NavState,
}

impl MockNavigation {
    /// Create with the given snapshot
    pub fn new(state: NavState) -> Self {
        Self { state }
    }
}

impl NavigationSource for MockNavigation {
    fn nav_state(&self) -> NavState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_forward_projection() {
        // Heading east, flying east at 10 m/s
        let nav = NavState::along_heading(core::f32::consts::FRAC_PI_2, 10.0, 0.0, 0.0);
        assert!((nav.speed_forward_cms() - 1000.0).abs() < 0.1);

        // Pure crosswind component does not count as forward speed
        let mut nav = NavState::default();
        nav.groundspeed_ms = [0.0, 5.0];
        assert!(nav.speed_forward_cms().abs() < 0.001);
    }

    #[test]
    fn test_accel_decomposition() {
        let nav = NavState::along_heading(0.3, 0.0, 0.0, 0.0).with_accel_cms2(981.0, -150.0);
        let (z, fwd) = nav.accel_z_fwd_cms2();
        assert!((z - 981.0).abs() < 0.01);
        assert!((fwd + 150.0).abs() < 0.01);
    }

    #[test]
    fn test_default_accel_is_one_g_up() {
        let (z, fwd) = NavState::default().accel_z_fwd_cms2();
        assert!((z - GRAVITY_MSS * 100.0).abs() < 0.01);
        assert!(fwd.abs() < 0.001);
    }

    #[test]
    fn test_mock_rpm_instances() {
        let sensor = MockRpmSensor::new(1500.0);
        assert_eq!(sensor.rpm(0), Some(1500.0));
        assert_eq!(sensor.rpm(1), None);
        assert_eq!(sensor.rpm(7), None);
    }
}
