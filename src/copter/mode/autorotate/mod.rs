//! Helicopter Autorotate Mode
//!
//! Flies an engine-out descent to a touchdown without pilot throttle. The
//! mode owns the phase state machine; the continuous controllers live in
//! [`AutorotationController`].
//!
//! ## Phases
//!
//! - **Entry**: collective brings the head speed from its value at mode
//!   entry down to the set point over 2 s while pitch captures the glide speed
//! - **SteadyGlide**: head speed and glide speed held
//! - **Flare**: half-cosine deceleration to the touchdown descent rate
//! - **TouchDown**: altitude controller lands at a constant descent rate
//! - **BailOut**: power is back; ramp to the pilot's climb rate and hand
//!   control back to the previous mode
//!
//! The pilot keeps roll and yaw in every phase.
//!
//! ## Parameters
//!
//! All `AROT_*` parameters, see [`heli_arot_core::parameters::autorotation`].
//!
//! ## References
//!
//! - ArduPilot Autorotation: https://ardupilot.org/copter/docs/traditional-helicopter-autorotation-mode.html

mod bailout;
mod messages;
mod phases;

use heli_arot_core::autorotation::AutorotationController;
use heli_arot_core::mode::{
    AutorotationPhase, BailoutState, MessageFlags, Mode, ModeError, ModeNumber, PhaseFlags,
    ENTRY_DURATION_S,
};
use heli_arot_core::parameters::AutorotationParams;
use heli_arot_core::traits::{elapsed_ms, elapsed_s, HeliVehicle, NavState, Severity};

pub use messages::Advisory;

/// Normalised head speed held during glide and flare
pub const HEAD_SPEED_TARGET_RATIO: f32 = 1.0;

/// Result of one control tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutorotateOutput {
    /// Phase after this tick's transitions
    pub phase: AutorotationPhase,
    /// Pitch target sent to the attitude controller (cdeg)
    pub pitch_target_cd: f32,
    /// Engine collective, 0..1 or the −1 minimum-collective sentinel.
    /// The altitude controller owns the throttle in touchdown and bailout.
    pub collective: f32,
    /// Mode the vehicle should switch to
    pub mode_change: Option<ModeNumber>,
}

/// Autorotation flight mode
pub struct ModeAutorotate<V: HeliVehicle> {
    vehicle: V,
    params: AutorotationParams,
    arot: AutorotationController,
    dt: f32,
    active: bool,
    phase: AutorotationPhase,
    phase_flags: PhaseFlags,
    msg_flags: MessageFlags,
    previous_mode: ModeNumber,
    entry_time_start_ms: u32,
    flare_time_start_ms: u32,
    initial_hs_ratio: f32,
    hs_decay: f32,
    target_head_speed: f32,
    pitch_target_cd: f32,
    bad_rpm: bool,
    bailout: Option<BailoutState>,
}

impl<V: HeliVehicle> ModeAutorotate<V> {
    /// Create the mode for a control loop running every `dt` seconds
    pub fn new(vehicle: V, params: AutorotationParams, dt: f32) -> Self {
        let arot = AutorotationController::new(params.clone(), vehicle.lean_angle_max_cd());
        Self {
            vehicle,
            params,
            arot,
            dt,
            active: false,
            phase: AutorotationPhase::Entry,
            phase_flags: PhaseFlags::all(),
            msg_flags: MessageFlags::empty(),
            previous_mode: ModeNumber::default(),
            entry_time_start_ms: 0,
            flare_time_start_ms: 0,
            initial_hs_ratio: HEAD_SPEED_TARGET_RATIO,
            hs_decay: 0.0,
            target_head_speed: HEAD_SPEED_TARGET_RATIO,
            pitch_target_cd: 0.0,
            bad_rpm: false,
            bailout: None,
        }
    }

    /// Replace the parameter set; takes effect at the next mode entry
    pub fn set_params(&mut self, params: AutorotationParams) {
        self.params = params;
    }

    /// Start an autorotation.
    ///
    /// Refused when the feature is disabled or the interlock is still
    /// engaged; the reason is also sent to the ground station.
    pub fn enter(&mut self, now_ms: u32, previous: ModeNumber) -> Result<(), ModeError> {
        let check = if !self.params.enable {
            Err(ModeError::NotEnabled)
        } else if self.vehicle.interlock_engaged() {
            Err(ModeError::InterlockEngaged)
        } else {
            Ok(())
        };
        if let Err(err) = check {
            crate::log_warn!("{}", err.gcs_text());
            self.vehicle.send_text(Severity::Info, err.gcs_text());
            return Err(err);
        }

        self.arot = AutorotationController::new(self.params.clone(), self.vehicle.lean_angle_max_cd());
        self.arot.set_dt(self.dt);

        let nav = self.vehicle.nav_state();
        self.arot.init_hs_controller();
        self.arot.init_fwd_spd_controller(&nav);

        // Not counted by the health monitor: the first counted sample is the
        // first control tick
        let rpm = self.arot.get_rpm(&self.vehicle, false);
        let ratio = rpm / self.arot.hs_set_point();
        self.initial_hs_ratio = if rpm > 0.0 && ratio.is_finite() {
            ratio
        } else {
            HEAD_SPEED_TARGET_RATIO
        };
        self.hs_decay = (self.initial_hs_ratio - HEAD_SPEED_TARGET_RATIO) / ENTRY_DURATION_S;
        self.target_head_speed = self.initial_hs_ratio;

        self.vehicle.send_text(Severity::Info, "Autorotation initiated");
        crate::log_info!("Autorotation initiated, head speed ratio {}", self.initial_hs_ratio);

        self.phase = AutorotationPhase::Entry;
        self.phase_flags = PhaseFlags::all();
        self.msg_flags = MessageFlags::empty();
        self.previous_mode = previous;
        self.entry_time_start_ms = now_ms;
        self.flare_time_start_ms = now_ms;
        self.pitch_target_cd = self.arot.pitch_target_cd();
        self.bad_rpm = false;
        self.bailout = None;
        self.active = true;
        Ok(())
    }

    /// Run one control tick.
    ///
    /// `interlock_engaged` is true once the engine drives the rotor again;
    /// `landed` comes from the vehicle's land detector.
    pub fn tick(&mut self, now_ms: u32, interlock_engaged: bool, landed: bool) -> AutorotateOutput {
        if !self.active {
            return self.output(None);
        }

        if interlock_engaged && landed {
            // Power back on the ground: nothing left to do
            crate::log_info!("Autorotation: landed with interlock engaged");
            return self.output(Some(self.previous_mode));
        }

        let nav = self.vehicle.nav_state();
        self.update_phase(now_ms, interlock_engaged, &nav);

        let mut mode_change = None;
        match self.phase {
            AutorotationPhase::Entry => self.run_entry(now_ms, &nav),
            AutorotationPhase::SteadyGlide => self.run_glide(&nav),
            AutorotationPhase::Flare => self.run_flare(now_ms, &nav),
            AutorotationPhase::TouchDown => self.run_touchdown(&nav),
            AutorotationPhase::BailOut => mode_change = self.run_bailout(now_ms, &nav),
        }

        self.update_attitude();

        if self.bad_rpm {
            self.message_handler(Advisory::PoorRpmSensor);
        }

        self.arot.log_write_autorotation(&nav, &mut self.vehicle);

        self.output(mode_change)
    }

    /// Evaluate the phase transitions; the first rule that matches wins
    fn update_phase(&mut self, now_ms: u32, interlock_engaged: bool, nav: &NavState) {
        let phase = self.phase;
        let next = if interlock_engaged {
            AutorotationPhase::BailOut
        } else if phase == AutorotationPhase::Entry
            && elapsed_s(now_ms, self.entry_time_start_ms) >= ENTRY_DURATION_S
        {
            AutorotationPhase::SteadyGlide
        } else if !matches!(phase, AutorotationPhase::TouchDown | AutorotationPhase::BailOut)
            && nav.altitude_cm <= self.arot.td_alt_target_cm()
        {
            self.message_handler(Advisory::TouchdownAltitude);
            AutorotationPhase::TouchDown
        } else if phase == AutorotationPhase::Flare
            && elapsed_s(now_ms, self.flare_time_start_ms) > self.arot.flare_period()
        {
            self.message_handler(Advisory::TouchdownTimer);
            AutorotationPhase::TouchDown
        } else if !matches!(
            phase,
            // A bailout with power back never drops into a flare
            AutorotationPhase::Flare | AutorotationPhase::TouchDown | AutorotationPhase::BailOut
        ) && self.arot.should_flare(nav, &mut self.vehicle)
        {
            AutorotationPhase::Flare
        } else {
            phase
        };

        if next != phase {
            crate::log_info!("Autorotation: {} -> {}", phase.name(), next.name());
            self.phase = next;
        }
    }

    /// Pilot roll and yaw, phase pitch
    fn update_attitude(&mut self) {
        let angle_max = self.arot.angle_max_cd();
        if !self.pitch_target_cd.is_finite() {
            self.pitch_target_cd = 0.0;
        }
        self.pitch_target_cd = self.pitch_target_cd.clamp(-angle_max, angle_max);

        let (pilot_roll, _) = self
            .vehicle
            .desired_lean_angles_cd(self.vehicle.lean_angle_max_cd());
        let pilot_yaw_rate = self.vehicle.desired_yaw_rate_cds();
        self.vehicle.input_euler_angle_roll_pitch_euler_rate_yaw(
            pilot_roll,
            self.pitch_target_cd,
            pilot_yaw_rate,
        );
    }

    fn output(&self, mode_change: Option<ModeNumber>) -> AutorotateOutput {
        AutorotateOutput {
            phase: self.phase,
            pitch_target_cd: self.pitch_target_cd,
            collective: self.arot.collective_output(),
            mode_change,
        }
    }

    /// Send the one-shot setup announcement and take the phase flag.
    /// Returns true the first time the phase runs.
    fn take_initial(&mut self, phase: AutorotationPhase) -> bool {
        if !self.phase_flags.take(phase) {
            return false;
        }
        self.vehicle.send_text(Severity::Info, phase.announcement());
        true
    }

    pub fn phase(&self) -> AutorotationPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn previous_mode(&self) -> ModeNumber {
        self.previous_mode
    }

    pub fn target_head_speed(&self) -> f32 {
        self.target_head_speed
    }

    pub fn pitch_target_cd(&self) -> f32 {
        self.pitch_target_cd
    }

    pub fn controller(&self) -> &AutorotationController {
        &self.arot
    }

    pub fn bailout(&self) -> Option<&BailoutState> {
        self.bailout.as_ref()
    }

    /// Time since the flare started (ms); zero before the flare
    pub fn flare_elapsed_ms(&self, now_ms: u32) -> u32 {
        if self.phase_flags.contains(PhaseFlags::FLARE) {
            0
        } else {
            elapsed_ms(now_ms, self.flare_time_start_ms)
        }
    }

    pub fn vehicle(&self) -> &V {
        &self.vehicle
    }

    pub fn vehicle_mut(&mut self) -> &mut V {
        &mut self.vehicle
    }
}

impl<V: HeliVehicle> Mode for ModeAutorotate<V> {
    fn enter(&mut self, now_ms: u32, previous: ModeNumber) -> Result<(), ModeError> {
        ModeAutorotate::enter(self, now_ms, previous)
    }

    fn update(&mut self, now_ms: u32, landed: bool) -> Option<ModeNumber> {
        let interlock = self.vehicle.interlock_engaged();
        self.tick(now_ms, interlock, landed).mode_change
    }

    fn exit(&mut self) {
        crate::log_info!("Autorotation: exit in {} phase", self.phase.name());
        self.active = false;
        self.bailout = None;
    }

    fn name(&self) -> &'static str {
        ModeNumber::Autorotate.name()
    }

    fn number(&self) -> ModeNumber {
        ModeNumber::Autorotate
    }
}
