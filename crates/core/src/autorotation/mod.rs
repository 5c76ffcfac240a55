//! Autorotation controller engine
//!
//! Continuous-control half of the autorotation mode. The engine owns the
//! controller state (head speed, forward speed, flare tracking, RPM health)
//! and is driven one step at a time by the flight mode, which decides the
//! phase. Collaborators are passed into each call; the engine never holds
//! references to them.
//!
//! # Sub-controllers
//!
//! - [`head_speed`]: rotor speed held by collective
//! - [`forward_speed`]: ground speed held by pitch
//! - [`flare`]: feasibility test and half-cosine trajectory tracking
//! - [`rpm_health`]: sensor dropout debounce
//!
//! All vertical quantities are positive up, in cm, cm/s and cm/s/s. Angles
//! are in centidegrees unless noted.

pub mod flare;
pub mod forward_speed;
pub mod head_speed;
pub mod log;
pub mod rpm_health;

pub use flare::{
    assess_flare, FlareAssessment, FlareController, FlareGains, FlareInputs, FlareLimits,
    FlareRejection,
};
pub use forward_speed::{pitch_for_accel_cd, ForwardSpeedController};
pub use head_speed::{
    Collective, HeadSpeedController, HeadSpeedStatus, MIN_COLLECTIVE_SENTINEL,
    THROTTLE_FILTER_CUTOFF_HZ,
};
pub use log::{
    FlareAssessmentRecord, FlareDetail, FlareTuning, GlideTuning, LogBitmask, LogRecord, Tracking,
};
pub use rpm_health::{is_bad_reading, RpmHealth};

use crate::parameters::AutorotationParams;
use crate::traits::{MotorOutput, NavState, RpmSensor, TelemetrySink, RPM_INSTANCES};

/// Lowest accepted head speed set point (rpm)
pub const HS_SET_POINT_MIN: f32 = 500.0;

/// Smallest pitch limit the controller will work with (cdeg)
pub const ANGLE_MAX_MIN: f32 = 1500.0;

/// Collective assumed by the flare when the head speed controller never ran
pub const FLARE_FALLBACK_COLLECTIVE: f32 = 0.5;

/// Autorotation controller engine
#[derive(Debug, Clone)]
pub struct AutorotationController {
    params: AutorotationParams,
    hs_set_point: f32,
    angle_max_cd: f32,
    rpm_instance: u8,
    log_bitmask: LogBitmask,
    dt: f32,
    col_cutoff_hz: f32,
    current_rpm: f32,
    pitch_target_cd: f32,
    bad_rpm: bool,
    bad_rpm_warning: bool,
    hs_ctrl_running: bool,
    health: RpmHealth,
    collective: Collective,
    head_speed: HeadSpeedController,
    forward: ForwardSpeedController,
    flare: FlareController,
    last_assessment: Option<FlareAssessment>,
}

impl AutorotationController {
    /// Build the engine from its parameters.
    ///
    /// `lean_angle_max_cd` is the attitude controller's limit, used when
    /// `AROT_ANGLE_MAX` is 0.
    pub fn new(params: AutorotationParams, lean_angle_max_cd: f32) -> Self {
        let head_speed = HeadSpeedController::new(params.hs_p);
        let forward =
            ForwardSpeedController::new(params.fw_v_p, params.fw_v_ff, params.fwd_accel_max);
        let flare = FlareController::new(
            Self::flare_gains(&params),
            params.flare_period_s,
            ANGLE_MAX_MIN,
        );
        let mut controller = Self {
            params,
            hs_set_point: HS_SET_POINT_MIN,
            angle_max_cd: ANGLE_MAX_MIN,
            rpm_instance: 0,
            log_bitmask: LogBitmask::empty(),
            dt: 0.0,
            col_cutoff_hz: 0.0,
            current_rpm: 0.0,
            pitch_target_cd: 0.0,
            bad_rpm: false,
            bad_rpm_warning: false,
            hs_ctrl_running: false,
            health: RpmHealth::new(),
            collective: Collective::new(),
            head_speed,
            forward,
            flare,
            last_assessment: None,
        };
        controller.init(lean_angle_max_cd);
        controller
    }

    fn flare_gains(params: &AutorotationParams) -> FlareGains {
        FlareGains {
            z_vel_kp: params.flare_z_vel_p,
            fwd_vel_kp: params.flare_fwd_vel_p,
            pos_kp: params.pos_p,
            pitch_kp: params.flare_pitch_p,
            col_kp: params.flare_col_p,
            pitch_cutoff_hz: params.flare_pitch_filt_hz,
            pos_cutoff_hz: params.pos_filt_hz,
        }
    }

    /// Reset flags and RPM health, and apply the runtime parameter guards
    pub fn init(&mut self, lean_angle_max_cd: f32) {
        self.bad_rpm = false;
        self.bad_rpm_warning = false;
        self.hs_ctrl_running = false;
        self.health.reset();
        self.last_assessment = None;

        self.hs_set_point = self.params.hs_set_point.max(HS_SET_POINT_MIN);

        let angle_max = if self.params.angle_max_cd == 0.0 {
            lean_angle_max_cd
        } else {
            self.params.angle_max_cd
        };
        self.angle_max_cd = angle_max.max(ANGLE_MAX_MIN);

        self.rpm_instance = if (0..RPM_INSTANCES as i32).contains(&self.params.rpm_instance) {
            self.params.rpm_instance as u8
        } else {
            0
        };
        self.log_bitmask = LogBitmask::from_bits_truncate(self.params.log_bitmask);

        self.forward = ForwardSpeedController::new(
            self.params.fw_v_p,
            self.params.fw_v_ff,
            self.params.fwd_accel_max,
        );
        self.flare = FlareController::new(
            Self::flare_gains(&self.params),
            self.params.flare_period_s,
            self.angle_max_cd,
        );
    }

    /// Start the head speed controller from the default collective
    pub fn init_hs_controller(&mut self) {
        self.hs_ctrl_running = true;
        self.collective.reset(head_speed::INITIAL_COLLECTIVE);
    }

    /// Start the forward speed controller from the current ground speed
    pub fn init_fwd_spd_controller(&mut self, nav: &NavState) {
        self.forward.init(nav.speed_forward_cms());
    }

    /// Control loop time step (s)
    pub fn set_dt(&mut self, dt: f32) {
        self.dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    }

    /// Read the rotor speed from the configured instance.
    ///
    /// With `update_counter` the reading also feeds the health monitor.
    /// Returns 0 when the sensor is missing.
    pub fn get_rpm<R: RpmSensor + ?Sized>(&mut self, sensor: &R, update_counter: bool) -> f32 {
        let raw = sensor.rpm(self.rpm_instance);
        self.bad_rpm = is_bad_reading(raw);
        if update_counter {
            self.health.sample(raw);
        }
        raw.unwrap_or(0.0)
    }

    /// Collective trim filter cutoff used by the next head speed update
    pub fn set_col_cutoff_freq(&mut self, cutoff_hz: f32) {
        self.col_cutoff_hz = cutoff_hz;
    }

    /// Normalised head speed target
    pub fn set_target_head_speed(&mut self, ratio: f32) {
        self.head_speed.set_target_ratio(ratio);
    }

    /// Glide speed target from `AROT_TARG_SP`
    pub fn set_desired_fwd_speed(&mut self) {
        self.forward.set_desired_speed(self.params.target_speed_cms);
    }

    /// Run the head speed controller and push the collective to the motors.
    ///
    /// Returns true when the RPM sensor has failed and minimum collective
    /// was commanded.
    pub fn update_hs_glide_controller<V>(&mut self, vehicle: &mut V) -> bool
    where
        V: RpmSensor + MotorOutput + ?Sized,
    {
        self.bad_rpm_warning = false;
        self.current_rpm = self.get_rpm(vehicle, true);

        self.collective.set_cutoff_frequency(self.col_cutoff_hz);
        let status = self.head_speed.update(
            &mut self.collective,
            self.current_rpm / self.hs_set_point,
            !self.bad_rpm,
            self.health.is_failed(),
            self.dt,
        );
        self.bad_rpm_warning = status == HeadSpeedStatus::MinimumCollective;

        self.set_collective(vehicle);
        self.bad_rpm_warning
    }

    /// Push the collective and the fixed throttle filter cutoff to the motors
    pub fn set_collective<M: MotorOutput + ?Sized>(&self, motors: &mut M) {
        motors.set_throttle_filter_cutoff(THROTTLE_FILTER_CUTOFF_HZ);
        motors.set_throttle(self.collective.output());
    }

    /// Run the forward speed controller; returns the pitch target (cdeg)
    pub fn update_forward_speed_controller(&mut self, nav: &NavState) -> f32 {
        self.pitch_target_cd = self.forward.update(nav.speed_forward_cms(), self.dt);
        self.pitch_target_cd
    }

    /// Flare limits after the runtime guards
    pub fn flare_limits(&self) -> FlareLimits {
        FlareLimits {
            td_vel_z_cms: self.params.td_vel_z_cms,
            period_s: self.flare.period(),
            accel_max_g: self.params.flare_accel_max_g,
            angle_max_cd: self.angle_max_cd,
            td_alt_target_cm: self.params.td_alt_target_cm,
        }
    }

    /// Flare feasibility test on the current state.
    ///
    /// The full assessment is kept for the flare controller and logged.
    pub fn should_flare<T: TelemetrySink + ?Sized>(&mut self, nav: &NavState, telemetry: &mut T) -> bool {
        let assessment = assess_flare(&FlareInputs::from_nav(nav), &self.flare_limits());
        telemetry.write_record(&LogRecord::FlareAssessment(FlareAssessmentRecord {
            velocity_z_cms: nav.velocity_z_cms,
            td_vel_z_cms: self.params.td_vel_z_cms,
            resultant_accel_peak: assessment.resultant_accel_peak,
            accel_min: assessment.accel_min,
            accel_max: assessment.accel_max,
            td_alt_predicted_cm: assessment.td_alt_predicted_cm,
            feasible: assessment.is_feasible(),
        }));
        self.last_assessment = Some(assessment);
        assessment.is_feasible()
    }

    /// Snapshot the flare initial conditions from the current state
    pub fn set_flare_initial_cond(&mut self, nav: &NavState) {
        let inputs = FlareInputs::from_nav(nav);
        let assessment = match self.last_assessment {
            Some(assessment) => assessment,
            None => assess_flare(&inputs, &self.flare_limits()),
        };
        self.flare
            .set_initial_conditions(&inputs, &assessment, self.pitch_target_cd);
    }

    /// Configure and reset the flare filters. Call after the flare
    /// collective cutoff has been set.
    pub fn init_flare_controller(&mut self, nav: &NavState) {
        if !self.hs_ctrl_running {
            self.collective.reset(FLARE_FALLBACK_COLLECTIVE);
            self.pitch_target_cd = nav.pitch_deg() * 100.0;
        }
        self.flare
            .init(&mut self.collective, self.col_cutoff_hz, self.pitch_target_cd);
    }

    /// Elapsed flare time (ms)
    pub fn set_flare_time(&mut self, elapsed_ms: u32) {
        self.flare.set_flare_time(elapsed_ms as f32 / 1000.0);
    }

    /// Run the flare controller; returns the pitch target (cdeg).
    ///
    /// The collective is updated but not pushed to the motors; call
    /// [`Self::set_collective`] for that.
    pub fn update_flare_controller<T: TelemetrySink + ?Sized>(
        &mut self,
        nav: &NavState,
        telemetry: &mut T,
    ) -> f32 {
        let inputs = FlareInputs::from_nav(nav);
        self.pitch_target_cd = self.flare.update(&mut self.collective, &inputs, self.dt);

        let detail = self.flare.detail();
        telemetry.write_record(&LogRecord::FlareDetail(FlareDetail {
            pitch_angle_target_deg: detail.pitch_angle_target_deg,
            pitch_angle_measured_deg: detail.pitch_angle_measured_deg,
            accel_mag_target: detail.accel_mag_target,
            accel_mag_measured: detail.accel_mag_measured,
            drag_initial: self.flare.initial_conditions().drag,
            drag: detail.drag,
            total_fwd_accel_target: self.flare.total_fwd_accel_target(),
            total_z_accel_target: self.flare.total_z_accel_target(),
            alt_measured_cm: detail.alt_measured_cm,
            z_pos_correction: self.flare.z_pos_correction(),
            fwd_vel_target: self.flare.fwd_vel_target(),
            z_vel_measured: detail.z_vel_measured,
            collective: self.collective.output(),
            p_term_col: self.flare.p_term_col(),
            ff_term_col: self.flare.ff_term_col(),
        }));

        self.pitch_target_cd
    }

    /// Write the per-tick records selected by `AROT_LOG`, plus tracking
    pub fn log_write_autorotation<T: TelemetrySink + ?Sized>(&self, nav: &NavState, telemetry: &mut T) {
        if self.log_bitmask.contains(LogBitmask::GLIDE) {
            telemetry.write_record(&LogRecord::GlideTuning(GlideTuning {
                p_term_hs: self.head_speed.p_term(),
                head_speed_error: self.head_speed.head_speed_error(),
                collective: self.collective.output(),
                ff_term_hs: self.head_speed.ff_term(),
                rpm: self.current_rpm,
                speed_forward_cms: nav.speed_forward_cms(),
                cmd_vel_cms: self.forward.cmd_vel(),
                vel_p: self.forward.vel_p(),
                vel_ff: self.forward.vel_ff(),
                accel_out: self.forward.accel_out(),
                accel_target: self.forward.accel_target(),
                pitch_target_cd: self.pitch_target_cd,
            }));
        }

        if self.log_bitmask.contains(LogBitmask::FLARE) {
            let assessment = self.last_assessment;
            telemetry.write_record(&LogRecord::FlareTuning(FlareTuning {
                z_accel_target: self.flare.z_accel_target(),
                adjusted_z_accel_target: self.flare.adjusted_z_accel_target(),
                z_vel_target: self.flare.z_vel_target(),
                alt_target: self.flare.alt_target(),
                fwd_accel_target: self.flare.fwd_accel_target(),
                adjusted_fwd_accel_target: self.flare.adjusted_fwd_accel_target(),
                p_term_pitch: self.flare.p_term_pitch(),
                pitch_out_cd: self.flare.pitch_out_cd(),
                resultant_accel_peak: assessment.map_or(0.0, |a| a.resultant_accel_peak),
                pitch_angle_max_cd: assessment.map_or(0.0, |a| a.pitch_angle_max_cd),
            }));
        }

        let (accel_z_cms2, accel_fwd_cms2) = nav.accel_z_fwd_cms2();
        telemetry.write_record(&LogRecord::Tracking(Tracking {
            speed_forward_cms: nav.speed_forward_cms(),
            accel_z_cms2,
            accel_fwd_cms2,
        }));
    }

    // ---- accessors ----

    pub fn params(&self) -> &AutorotationParams {
        &self.params
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enable
    }

    /// Head speed set point after the minimum guard (rpm)
    pub fn hs_set_point(&self) -> f32 {
        self.hs_set_point
    }

    /// Pitch limit after guards (cdeg)
    pub fn angle_max_cd(&self) -> f32 {
        self.angle_max_cd
    }

    /// Forward acceleration limit after the ceiling (cm/s/s)
    pub fn accel_max(&self) -> f32 {
        self.forward.accel_max()
    }

    pub fn rpm_instance(&self) -> u8 {
        self.rpm_instance
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Flare period after the minimum guard (s)
    pub fn flare_period(&self) -> f32 {
        self.flare.period()
    }

    pub fn col_entry_freq(&self) -> f32 {
        self.params.col_filt_entry_hz
    }

    pub fn col_glide_freq(&self) -> f32 {
        self.params.col_filt_glide_hz
    }

    pub fn col_flare_freq(&self) -> f32 {
        self.params.col_filt_flare_hz
    }

    pub fn col_cutoff_freq(&self) -> f32 {
        self.col_cutoff_hz
    }

    pub fn td_alt_target_cm(&self) -> f32 {
        self.params.td_alt_target_cm
    }

    pub fn td_vel_target_cms(&self) -> f32 {
        self.params.td_vel_z_cms
    }

    pub fn bail_time_s(&self) -> f32 {
        self.params.bail_time_s
    }

    /// Latest pitch target from whichever controller ran last (cdeg)
    pub fn pitch_target_cd(&self) -> f32 {
        self.pitch_target_cd
    }

    /// Collective as commanded (may be the minimum sentinel)
    pub fn collective_output(&self) -> f32 {
        self.collective.output()
    }

    /// Last real collective, for handing over to the altitude controller
    pub fn last_collective(&self) -> f32 {
        self.collective.last_valid()
    }

    pub fn collective(&self) -> &Collective {
        &self.collective
    }

    pub fn current_rpm(&self) -> f32 {
        self.current_rpm
    }

    /// Measured head speed over the set point
    pub fn head_speed_ratio(&self) -> f32 {
        self.current_rpm / self.hs_set_point
    }

    pub fn target_head_speed(&self) -> f32 {
        self.head_speed.target_ratio()
    }

    pub fn rpm_health(&self) -> &RpmHealth {
        &self.health
    }

    pub fn is_bad_rpm_warning(&self) -> bool {
        self.bad_rpm_warning
    }

    pub fn is_hs_ctrl_running(&self) -> bool {
        self.hs_ctrl_running
    }

    pub fn forward_speed(&self) -> &ForwardSpeedController {
        &self.forward
    }

    pub fn flare_controller(&self) -> &FlareController {
        &self.flare
    }

    pub fn last_assessment(&self) -> Option<&FlareAssessment> {
        self.last_assessment.as_ref()
    }

    pub fn log_bitmask(&self) -> LogBitmask {
        self.log_bitmask
    }
}
