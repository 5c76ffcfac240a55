//! Autorotation mode state types
//!
//! Pure state that persists across update cycles: the active phase, the
//! one-shot flags and the bailout ramp.

use bitflags::bitflags;
use libm::fabsf;

use crate::traits::elapsed_s;

/// Time spent in the entry phase before gliding (s)
pub const ENTRY_DURATION_S: f32 = 2.0;

/// Time the motors need to spool back up during a bailout (s)
pub const BAILOUT_MOTOR_RAMP_S: f32 = 1.0;

/// Minimum bailout time beyond the motor ramp (s)
pub const BAILOUT_MARGIN_S: f32 = 0.1;

/// Autorotation flight phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutorotationPhase {
    #[default]
    Entry,
    SteadyGlide,
    Flare,
    TouchDown,
    BailOut,
}

impl AutorotationPhase {
    pub fn name(&self) -> &'static str {
        match self {
            AutorotationPhase::Entry => "Entry",
            AutorotationPhase::SteadyGlide => "Glide",
            AutorotationPhase::Flare => "Flare",
            AutorotationPhase::TouchDown => "Touchdown",
            AutorotationPhase::BailOut => "Bailout",
        }
    }

    /// Ground station announcement sent when the phase starts
    pub fn announcement(&self) -> &'static str {
        match self {
            AutorotationPhase::Entry => "Entry Phase",
            AutorotationPhase::SteadyGlide => "SS Glide Phase",
            AutorotationPhase::Flare => "Flare Phase",
            AutorotationPhase::TouchDown => "Touchdown Phase",
            AutorotationPhase::BailOut => "Bailing Out of Autorotation",
        }
    }
}

bitflags! {
    /// One-shot setup still pending, one bit per phase.
    ///
    /// Armed at mode entry only. A phase re-entered after its bit was
    /// cleared does not repeat its setup.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PhaseFlags: u8 {
        const ENTRY = 1 << 0;
        const SS_GLIDE = 1 << 1;
        const FLARE = 1 << 2;
        const TOUCH_DOWN = 1 << 3;
        const BAIL_OUT = 1 << 4;
    }
}

impl PhaseFlags {
    pub fn of(phase: AutorotationPhase) -> Self {
        match phase {
            AutorotationPhase::Entry => PhaseFlags::ENTRY,
            AutorotationPhase::SteadyGlide => PhaseFlags::SS_GLIDE,
            AutorotationPhase::Flare => PhaseFlags::FLARE,
            AutorotationPhase::TouchDown => PhaseFlags::TOUCH_DOWN,
            AutorotationPhase::BailOut => PhaseFlags::BAIL_OUT,
        }
    }

    /// Clear the bit for `phase`; true if the setup was still pending
    pub fn take(&mut self, phase: AutorotationPhase) -> bool {
        let flag = Self::of(phase);
        let pending = self.contains(flag);
        self.remove(flag);
        pending
    }
}

bitflags! {
    /// Advisory messages already sent during this autorotation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MessageFlags: u8 {
        const BAD_RPM = 1 << 0;
        const TD_REASON_ALT = 1 << 1;
        const TD_REASON_TIMER = 1 << 2;
    }
}

/// Move `value` toward `target` by at most `step`
fn step_toward(value: f32, target: f32, step: f32) -> f32 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// Bailout ramp captured at bailout entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BailoutState {
    start_ms: u32,
    duration_s: f32,
    desired_vz_cms: f32,
    target_vz_cms: f32,
    climb_rate_adjust: f32,
    pitch_target_cd: f32,
    pitch_adjust: f32,
}

impl BailoutState {
    /// Start a bailout.
    ///
    /// The duration is at least the motor ramp plus margin. Descent rate
    /// and pitch decay linearly to `pilot_vz_cms` and zero over the time
    /// left after the ramp.
    pub fn begin(
        start_ms: u32,
        bail_time_s: f32,
        velocity_z_cms: f32,
        pilot_vz_cms: f32,
        pitch_target_cd: f32,
    ) -> Self {
        let duration_s = bail_time_s.max(BAILOUT_MOTOR_RAMP_S + BAILOUT_MARGIN_S);
        let decay_s = duration_s - BAILOUT_MOTOR_RAMP_S;
        Self {
            start_ms,
            duration_s,
            desired_vz_cms: velocity_z_cms,
            target_vz_cms: pilot_vz_cms,
            climb_rate_adjust: (velocity_z_cms - pilot_vz_cms) / decay_s,
            pitch_target_cd,
            pitch_adjust: pitch_target_cd / decay_s,
        }
    }

    /// Advance the ramp; values are held until the motors have spooled up
    pub fn update(&mut self, now_ms: u32, dt: f32) {
        if elapsed_s(now_ms, self.start_ms) < BAILOUT_MOTOR_RAMP_S {
            return;
        }
        self.desired_vz_cms = step_toward(
            self.desired_vz_cms,
            self.target_vz_cms,
            fabsf(self.climb_rate_adjust) * dt,
        );
        self.pitch_target_cd = step_toward(self.pitch_target_cd, 0.0, fabsf(self.pitch_adjust) * dt);
    }

    /// Bail time has run out
    pub fn is_complete(&self, now_ms: u32) -> bool {
        elapsed_s(now_ms, self.start_ms) >= self.duration_s
    }

    pub fn start_ms(&self) -> u32 {
        self.start_ms
    }

    pub fn duration_s(&self) -> f32 {
        self.duration_s
    }

    pub fn desired_vz_cms(&self) -> f32 {
        self.desired_vz_cms
    }

    pub fn pitch_target_cd(&self) -> f32 {
        self.pitch_target_cd
    }

    /// Descent rate change per second after the ramp (cm/s/s)
    pub fn climb_rate_adjust(&self) -> f32 {
        self.climb_rate_adjust
    }

    /// Pitch change per second after the ramp (cdeg/s)
    pub fn pitch_adjust(&self) -> f32 {
        self.pitch_adjust
    }
}
