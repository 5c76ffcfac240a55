//! Simulator configuration

use crate::error::SimulatorError;

/// Configuration for the point-mass helicopter.
///
/// The rotor and lift model is normalised: the aircraft glides at
/// `glide_descent_ms` with `glide_collective` applied and the rotor at the
/// head speed set point, and hovers at `hover_collective` with no inflow.
#[derive(Debug, Clone)]
pub struct HeliSimConfig {
    /// Head speed set point used to scale the RPM reading (rpm).
    pub rpm_set_point: f32,
    /// Rotor speed over the set point when the engine fails.
    pub initial_rotor_ratio: f32,
    /// Altitude above the landing surface at mode entry in meters.
    pub initial_altitude_m: f32,
    /// Descent rate at mode entry in m/s (positive down).
    pub initial_descent_ms: f32,
    /// Forward speed at mode entry in m/s.
    pub initial_forward_speed_ms: f32,
    /// Heading in radians.
    pub yaw_rad: f32,
    /// Collective holding the set point in a steady glide.
    pub glide_collective: f32,
    /// Steady glide descent rate in m/s.
    pub glide_descent_ms: f32,
    /// Collective giving one g of thrust with no inflow.
    pub hover_collective: f32,
    /// Collective applied for the minimum-collective command.
    pub min_collective: f32,
    /// Rotor spin-down time constant in seconds.
    pub rotor_time_constant_s: f32,
    /// Engine governor time constant once power is back, in seconds.
    pub engine_time_constant_s: f32,
    /// Attitude response time constant in seconds.
    pub pitch_time_constant_s: f32,
    /// Altitude controller velocity time constant in seconds.
    pub z_time_constant_s: f32,
    /// Floor on the altitude controller acceleration limit in cm/s/s.
    pub min_z_accel_cmss: f32,
    /// Quadratic fuselage drag coefficient (1/m).
    pub drag_coefficient: f32,
    /// Maximum lean angle in centidegrees.
    pub lean_angle_max_cd: f32,
    /// Pilot climb rate demand in cm/s.
    pub pilot_climb_rate_cms: f32,
    /// RPM noise standard deviation in rpm.
    pub rpm_noise: f32,
    /// Probability that a single RPM sample is a dropout.
    pub rpm_dropout_probability: f32,
    /// Time after which the RPM sensor only reports dropouts, in seconds.
    pub rpm_failure_at_s: Option<f32>,
    /// Time at which the engine is restored and the interlock engaged, in seconds.
    pub interlock_at_s: Option<f32>,
    /// RNG seed for deterministic mode. None = random.
    pub seed: Option<u64>,
    /// Simulation step size in microseconds.
    pub step_size_us: u64,
}

impl Default for HeliSimConfig {
    fn default() -> Self {
        Self {
            rpm_set_point: 1500.0,
            initial_rotor_ratio: 1.1,
            initial_altitude_m: 150.0,
            initial_descent_ms: 8.0,
            initial_forward_speed_ms: 11.0,
            yaw_rad: 0.0,
            glide_collective: 0.4,
            glide_descent_ms: 8.0,
            hover_collective: 0.6,
            min_collective: 0.0,
            rotor_time_constant_s: 3.0,
            engine_time_constant_s: 0.5,
            pitch_time_constant_s: 0.15,
            z_time_constant_s: 0.1,
            min_z_accel_cmss: 50.0,
            drag_coefficient: 0.002,
            lean_angle_max_cd: 3000.0,
            pilot_climb_rate_cms: 0.0,
            rpm_noise: 5.0,
            rpm_dropout_probability: 0.0,
            rpm_failure_at_s: None,
            interlock_at_s: None,
            seed: Some(1),
            step_size_us: 2_500, // 400 Hz
        }
    }
}

impl HeliSimConfig {
    /// Step size in seconds
    pub fn dt(&self) -> f32 {
        self.step_size_us as f32 / 1_000_000.0
    }

    /// Thrust gain per m/s of descent that balances the glide operating point
    pub fn inflow_gain(&self) -> f32 {
        (self.hover_collective / self.glide_collective - 1.0) / self.glide_descent_ms
    }

    /// Reject configurations the model cannot integrate.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        let positive = [
            ("rpm_set_point", self.rpm_set_point),
            ("initial_rotor_ratio", self.initial_rotor_ratio),
            ("initial_altitude_m", self.initial_altitude_m),
            ("glide_collective", self.glide_collective),
            ("glide_descent_ms", self.glide_descent_ms),
            ("rotor_time_constant_s", self.rotor_time_constant_s),
            ("engine_time_constant_s", self.engine_time_constant_s),
            ("pitch_time_constant_s", self.pitch_time_constant_s),
            ("z_time_constant_s", self.z_time_constant_s),
            ("lean_angle_max_cd", self.lean_angle_max_cd),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulatorError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.step_size_us == 0 {
            return Err(SimulatorError::InvalidConfig(
                "step_size_us must be non-zero".to_string(),
            ));
        }
        if !(self.hover_collective > self.glide_collective && self.hover_collective <= 1.0) {
            return Err(SimulatorError::InvalidConfig(format!(
                "hover_collective must lie in ({}, 1], got {}",
                self.glide_collective, self.hover_collective
            )));
        }
        if !(0.0..=1.0).contains(&self.min_collective) {
            return Err(SimulatorError::InvalidConfig(format!(
                "min_collective must lie in [0, 1], got {}",
                self.min_collective
            )));
        }
        if !(0.0..=1.0).contains(&self.rpm_dropout_probability) {
            return Err(SimulatorError::InvalidConfig(format!(
                "rpm_dropout_probability must lie in [0, 1], got {}",
                self.rpm_dropout_probability
            )));
        }
        if self.rpm_noise < 0.0 || self.min_z_accel_cmss < 0.0 || self.drag_coefficient < 0.0 {
            return Err(SimulatorError::InvalidConfig(
                "noise, drag and acceleration floor must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
