//! Point-mass helicopter with a lumped rotor.
//!
//! Longitudinal plane only: altitude, vertical speed, forward speed, pitch
//! and the normalised rotor speed. Thrust scales with collective, the square
//! of the rotor speed and the inflow through the disc; the rotor is spun by
//! the descent and slowed by collective. Once the altitude controller has
//! been updated in a step it owns the vertical axis and tracks its climb
//! rate target within the commanded acceleration limit.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use heli_arot_core::autorotation::LogRecord;
use heli_arot_core::traits::{
    AttitudeControl, GcsNotifier, MotorOutput, NavState, NavigationSource, PilotInput,
    PositionControl, RpmSensor, Severity, SpoolState, TelemetrySink, TimeSource, GRAVITY_MSS,
};

use crate::config::HeliSimConfig;
use crate::error::SimulatorError;

/// RPM driver value for an unhealthy sensor
const RPM_DROPOUT: f32 = -1.0;

/// Altitude controller state driven through [`PositionControl`]
#[derive(Debug, Clone, Default)]
struct ZController {
    active: bool,
    updated: bool,
    climb_target_cms: f32,
    max_speed_down_cms: f32,
    max_speed_up_cms: f32,
    max_accel_cmss: f32,
}

/// Simulated helicopter implementing every autorotation collaborator.
pub struct SimHeli {
    config: HeliSimConfig,
    rng: StdRng,
    sim_time_us: u64,
    step_count: u64,
    altitude_m: f32,
    /// Vertical speed, positive up (m/s)
    velocity_z_ms: f32,
    forward_speed_ms: f32,
    pitch_rad: f32,
    rotor_ratio: f32,
    accel_z_ms2: f32,
    accel_fwd_ms2: f32,
    collective_cmd: f32,
    applied_collective: f32,
    throttle_cutoff_hz: f32,
    spool_state: SpoolState,
    pitch_target_cd: f32,
    roll_target_cd: f32,
    yaw_rate_target_cds: f32,
    z_ctrl: ZController,
    interlock: bool,
    landed: bool,
    touchdown_speed_ms: Option<f32>,
    rpm_reading: f32,
    messages: Vec<(Severity, String)>,
    records: HashMap<&'static str, usize>,
}

impl SimHeli {
    /// Create the helicopter at the entry conditions in `config`.
    pub fn new(config: HeliSimConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut heli = Self {
            altitude_m: config.initial_altitude_m,
            velocity_z_ms: -config.initial_descent_ms,
            forward_speed_ms: config.initial_forward_speed_ms,
            rotor_ratio: config.initial_rotor_ratio,
            collective_cmd: config.glide_collective,
            applied_collective: config.glide_collective,
            config,
            rng,
            sim_time_us: 0,
            step_count: 0,
            pitch_rad: 0.0,
            accel_z_ms2: 0.0,
            accel_fwd_ms2: 0.0,
            throttle_cutoff_hz: 0.0,
            spool_state: SpoolState::ThrottleUnlimited,
            pitch_target_cd: 0.0,
            roll_target_cd: 0.0,
            yaw_rate_target_cds: 0.0,
            z_ctrl: ZController::default(),
            interlock: false,
            landed: false,
            touchdown_speed_ms: None,
            rpm_reading: 0.0,
            messages: Vec::new(),
            records: HashMap::new(),
        };
        heli.sample_rpm();
        Ok(heli)
    }

    /// Advance the model by one step using the latest commands.
    pub fn step(&mut self) {
        let dt = self.config.dt();

        if let Some(at) = self.config.interlock_at_s {
            if self.time_s() >= at {
                self.interlock = true;
            }
        }

        if !self.landed {
            self.integrate(dt);
        }

        self.z_ctrl.updated = false;
        self.sim_time_us += self.config.step_size_us;
        self.step_count += 1;
        self.sample_rpm();
    }

    fn integrate(&mut self, dt: f32) {
        let cfg = &self.config;

        let alpha = (dt / cfg.pitch_time_constant_s).min(1.0);
        let pitch_target_rad = (self.pitch_target_cd / 100.0).to_radians();
        self.pitch_rad += (pitch_target_rad - self.pitch_rad) * alpha;
        let cos_pitch = self.pitch_rad.cos();
        let sin_pitch = self.pitch_rad.sin();

        let inflow_ms = (-self.velocity_z_ms).max(0.0);
        let lift_per_collective =
            self.rotor_ratio * self.rotor_ratio * (1.0 + cfg.inflow_gain() * inflow_ms)
                / cfg.hover_collective;

        // Thrust in g
        let thrust = if self.z_ctrl.updated {
            let accel_limit = (self.z_ctrl.max_accel_cmss.max(cfg.min_z_accel_cmss)) / 100.0;
            let error = (self.z_ctrl.climb_target_cms / 100.0 - self.velocity_z_ms)
                / cfg.z_time_constant_s;
            self.accel_z_ms2 = error.clamp(-accel_limit, accel_limit);
            let thrust = ((self.accel_z_ms2 + GRAVITY_MSS) / (GRAVITY_MSS * cos_pitch)).max(0.0);
            self.applied_collective = if lift_per_collective > f32::EPSILON {
                (thrust / lift_per_collective).clamp(0.0, 1.0)
            } else {
                1.0
            };
            thrust
        } else {
            self.applied_collective = if self.collective_cmd < 0.0 {
                cfg.min_collective
            } else {
                self.collective_cmd.clamp(0.0, 1.0)
            };
            let thrust = self.applied_collective * lift_per_collective;
            self.accel_z_ms2 = GRAVITY_MSS * (thrust * cos_pitch - 1.0);
            thrust
        };

        let drag = cfg.drag_coefficient * self.forward_speed_ms * self.forward_speed_ms.abs();
        self.accel_fwd_ms2 = -GRAVITY_MSS * thrust * sin_pitch - drag;

        let mut rotor_rate = (inflow_ms / cfg.glide_descent_ms
            - self.applied_collective / cfg.glide_collective * self.rotor_ratio * self.rotor_ratio)
            / cfg.rotor_time_constant_s;
        if self.interlock {
            rotor_rate += (1.0 - self.rotor_ratio) / cfg.engine_time_constant_s;
        }
        self.rotor_ratio = (self.rotor_ratio + rotor_rate * dt).max(0.0);

        self.velocity_z_ms += self.accel_z_ms2 * dt;
        self.forward_speed_ms += self.accel_fwd_ms2 * dt;
        self.altitude_m += self.velocity_z_ms * dt;

        if self.altitude_m <= 0.0 {
            self.altitude_m = 0.0;
            self.touchdown_speed_ms = Some(-self.velocity_z_ms);
            self.velocity_z_ms = 0.0;
            self.forward_speed_ms = 0.0;
            self.accel_z_ms2 = 0.0;
            self.accel_fwd_ms2 = 0.0;
            self.landed = true;
        }
    }

    fn sample_rpm(&mut self) {
        let failed = self
            .config
            .rpm_failure_at_s
            .is_some_and(|at| self.time_s() >= at);
        let p = self.config.rpm_dropout_probability;
        let dropout = p > 0.0 && self.rng.gen::<f32>() < p;
        self.rpm_reading = if failed || dropout {
            RPM_DROPOUT
        } else {
            let rpm = self.rotor_ratio * self.config.rpm_set_point;
            (rpm + self.gaussian_noise(self.config.rpm_noise)).max(0.0)
        };
    }

    /// Generate Gaussian noise using Box-Muller transform.
    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen::<f32>().max(f32::EPSILON);
        let u2: f32 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        z * stddev
    }

    pub fn config(&self) -> &HeliSimConfig {
        &self.config
    }

    pub fn sim_time_us(&self) -> u64 {
        self.sim_time_us
    }

    pub fn time_s(&self) -> f32 {
        self.sim_time_us as f32 / 1_000_000.0
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn altitude_m(&self) -> f32 {
        self.altitude_m
    }

    /// Vertical speed, positive up (m/s)
    pub fn velocity_z_ms(&self) -> f32 {
        self.velocity_z_ms
    }

    pub fn forward_speed_ms(&self) -> f32 {
        self.forward_speed_ms
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch_rad.to_degrees()
    }

    /// Rotor speed over the set point
    pub fn rotor_ratio(&self) -> f32 {
        self.rotor_ratio
    }

    /// Last collective command, including the minimum sentinel
    pub fn collective_cmd(&self) -> f32 {
        self.collective_cmd
    }

    /// Collective the rotor actually saw in the last step
    pub fn applied_collective(&self) -> f32 {
        self.applied_collective
    }

    pub fn throttle_cutoff_hz(&self) -> f32 {
        self.throttle_cutoff_hz
    }

    pub fn spool_state(&self) -> SpoolState {
        self.spool_state
    }

    pub fn roll_target_cd(&self) -> f32 {
        self.roll_target_cd
    }

    pub fn yaw_rate_target_cds(&self) -> f32 {
        self.yaw_rate_target_cds
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    /// Vertical speed at ground contact (m/s, positive down)
    pub fn touchdown_speed_ms(&self) -> Option<f32> {
        self.touchdown_speed_ms
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|(_, text)| text.as_str())
    }

    /// Number of ground station messages equal to `text`
    pub fn message_count(&self, text: &str) -> usize {
        self.messages().filter(|m| *m == text).count()
    }

    /// Number of telemetry records written under `name`
    pub fn record_count(&self, name: &str) -> usize {
        self.records.get(name).copied().unwrap_or(0)
    }
}

impl std::fmt::Debug for SimHeli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimHeli")
            .field("sim_time_us", &self.sim_time_us)
            .field("altitude_m", &self.altitude_m)
            .field("velocity_z_ms", &self.velocity_z_ms)
            .field("forward_speed_ms", &self.forward_speed_ms)
            .field("rotor_ratio", &self.rotor_ratio)
            .field("landed", &self.landed)
            .finish()
    }
}

impl TimeSource for SimHeli {
    fn millis(&self) -> u32 {
        (self.sim_time_us / 1_000) as u32
    }
}

impl RpmSensor for SimHeli {
    fn rpm(&self, instance: u8) -> Option<f32> {
        (instance == 0).then_some(self.rpm_reading)
    }
}

impl NavigationSource for SimHeli {
    fn nav_state(&self) -> NavState {
        let mut nav = NavState::along_heading(
            self.config.yaw_rad,
            self.forward_speed_ms,
            self.velocity_z_ms * 100.0,
            self.altitude_m * 100.0,
        )
        .with_accel_cms2(
            (self.accel_z_ms2 + GRAVITY_MSS) * 100.0,
            self.accel_fwd_ms2 * 100.0,
        );
        nav.pitch_rad = self.pitch_rad;
        nav
    }
}

impl MotorOutput for SimHeli {
    fn set_throttle_filter_cutoff(&mut self, cutoff_hz: f32) {
        self.throttle_cutoff_hz = cutoff_hz;
    }

    fn set_throttle(&mut self, collective: f32) {
        self.collective_cmd = collective;
    }

    fn set_desired_spool_state(&mut self, state: SpoolState) {
        self.spool_state = state;
    }

    fn interlock_engaged(&self) -> bool {
        self.interlock
    }
}

impl AttitudeControl for SimHeli {
    fn lean_angle_max_cd(&self) -> f32 {
        self.config.lean_angle_max_cd
    }

    fn input_euler_angle_roll_pitch_euler_rate_yaw(
        &mut self,
        roll_cd: f32,
        pitch_cd: f32,
        yaw_rate_cds: f32,
    ) {
        self.roll_target_cd = roll_cd;
        self.pitch_target_cd = pitch_cd;
        self.yaw_rate_target_cds = yaw_rate_cds;
    }
}

impl PositionControl for SimHeli {
    fn is_active_z(&self) -> bool {
        self.z_ctrl.active
    }

    fn relax_alt_hold_controllers(&mut self, throttle_setting: f32) {
        self.z_ctrl.active = true;
        self.z_ctrl.climb_target_cms = self.velocity_z_ms * 100.0;
        self.collective_cmd = throttle_setting;
    }

    fn set_max_speed_z(&mut self, speed_down_cms: f32, speed_up_cms: f32) {
        self.z_ctrl.max_speed_down_cms = speed_down_cms;
        self.z_ctrl.max_speed_up_cms = speed_up_cms;
    }

    fn set_max_accel_z(&mut self, accel_cmss: f32) {
        self.z_ctrl.max_accel_cmss = accel_cmss;
    }

    fn set_alt_target_from_climb_rate(&mut self, climb_rate_cms: f32, _dt: f32, force_descend: bool) {
        // Forced descents ignore the speed limits
        self.z_ctrl.climb_target_cms = if force_descend {
            climb_rate_cms.min(0.0)
        } else {
            climb_rate_cms.clamp(
                self.z_ctrl.max_speed_down_cms.min(0.0),
                self.z_ctrl.max_speed_up_cms.max(0.0),
            )
        };
    }

    fn update_z_controller(&mut self) {
        self.z_ctrl.active = true;
        self.z_ctrl.updated = true;
    }
}

impl PilotInput for SimHeli {
    fn desired_lean_angles_cd(&self, _angle_max_cd: f32) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn desired_yaw_rate_cds(&self) -> f32 {
        0.0
    }

    fn desired_climb_rate_cms(&self) -> f32 {
        self.config.pilot_climb_rate_cms
    }

    fn pilot_speed_up_cms(&self) -> f32 {
        250.0
    }

    fn pilot_speed_dn_cms(&self) -> f32 {
        150.0
    }
}

impl GcsNotifier for SimHeli {
    fn send_text(&mut self, severity: Severity, text: &str) {
        self.messages.push((severity, text.to_string()));
    }
}

impl TelemetrySink for SimHeli {
    fn write_record(&mut self, record: &LogRecord) {
        *self.records.entry(record.name()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> HeliSimConfig {
        HeliSimConfig {
            rpm_noise: 0.0,
            initial_rotor_ratio: 1.0,
            ..HeliSimConfig::default()
        }
    }

    #[test]
    fn test_glide_operating_point_is_steady() {
        let mut heli = SimHeli::new(quiet_config()).unwrap();
        heli.set_throttle(0.4);
        for _ in 0..400 {
            heli.step();
        }
        assert!((heli.velocity_z_ms() + 8.0).abs() < 0.05);
        assert!((heli.rotor_ratio() - 1.0).abs() < 0.01);
        assert!((heli.altitude_m() - 142.0).abs() < 0.1);
    }

    #[test]
    fn test_collective_slows_rotor_and_descent() {
        let mut heli = SimHeli::new(quiet_config()).unwrap();
        heli.set_throttle(0.6);
        for _ in 0..400 {
            heli.step();
        }
        assert!(heli.rotor_ratio() < 1.0);
        assert!(heli.velocity_z_ms() > -8.0);
    }

    #[test]
    fn test_minimum_collective_sentinel_uses_floor() {
        let mut heli = SimHeli::new(quiet_config()).unwrap();
        heli.set_throttle(-1.0);
        heli.step();
        assert_eq!(heli.applied_collective(), 0.0);
        assert_eq!(heli.collective_cmd(), -1.0);
    }

    #[test]
    fn test_rpm_reading_tracks_rotor() {
        let heli = SimHeli::new(quiet_config()).unwrap();
        assert_eq!(heli.rpm(0), Some(1500.0));
        assert_eq!(heli.rpm(1), None);
    }

    #[test]
    fn test_rpm_failure_reports_sentinel() {
        let config = HeliSimConfig {
            rpm_failure_at_s: Some(0.0),
            ..quiet_config()
        };
        let heli = SimHeli::new(config).unwrap();
        assert_eq!(heli.rpm(0), Some(-1.0));
    }

    #[test]
    fn test_interlock_engages_at_configured_time() {
        let config = HeliSimConfig {
            interlock_at_s: Some(0.01),
            ..quiet_config()
        };
        let mut heli = SimHeli::new(config).unwrap();
        for _ in 0..4 {
            heli.step();
        }
        assert!(!heli.interlock_engaged());
        heli.step();
        assert!(heli.interlock_engaged());
    }

    #[test]
    fn test_altitude_controller_tracks_climb_rate() {
        let mut heli = SimHeli::new(quiet_config()).unwrap();
        heli.relax_alt_hold_controllers(0.4);
        heli.set_max_accel_z(500.0);
        for _ in 0..800 {
            heli.set_alt_target_from_climb_rate(-50.0, 0.0025, true);
            heli.update_z_controller();
            heli.step();
        }
        assert!(heli.is_active_z());
        assert!((heli.velocity_z_ms() + 0.5).abs() < 0.01);
    }

    #[test]
    fn test_ground_contact_latches_landing() {
        let config = HeliSimConfig {
            initial_altitude_m: 0.01,
            ..quiet_config()
        };
        let mut heli = SimHeli::new(config).unwrap();
        heli.step();
        assert!(heli.is_landed());
        let speed = heli.touchdown_speed_ms().unwrap();
        assert!(speed > 7.9 && speed < 8.1);
        assert_eq!(heli.altitude_m(), 0.0);
    }

    #[test]
    fn test_nav_state_units() {
        let heli = SimHeli::new(quiet_config()).unwrap();
        let nav = heli.nav_state();
        assert_eq!(nav.altitude_cm, 15_000.0);
        assert_eq!(nav.velocity_z_cms, -800.0);
        assert!((nav.speed_forward_cms() - 1100.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let config = HeliSimConfig {
            seed: Some(42),
            ..HeliSimConfig::default()
        };
        let mut a = SimHeli::new(config.clone()).unwrap();
        let mut b = SimHeli::new(config).unwrap();
        for _ in 0..10 {
            a.step();
            b.step();
            assert_eq!(a.rpm(0), b.rpm(0));
        }
    }
}
