//! Forward speed / pitch controller
//!
//! Ramps a velocity command toward the glide speed target, turns the
//! velocity error into an acceleration demand and maps that demand to a
//! pitch attitude with `pitch = atan(-accel / g)`.

use core::f32::consts::PI;

use libm::{atanf, fabsf};

use crate::filter::LowPassFilter;
use crate::traits::GRAVITY_MSS;

/// Cutoff of the acceleration target filter (Hz)
pub const ACCEL_FILTER_CUTOFF_HZ: f32 = 10.0;

/// Hard ceiling for the acceleration limit (cm/s/s)
pub const ACCEL_MAX_LIMIT: f32 = 60.0;

/// Pitch (cdeg) that produces `accel_cmss` of forward acceleration.
/// Positive (nose up) for a deceleration.
pub fn pitch_for_accel_cd(accel_cmss: f32) -> f32 {
    atanf(-accel_cmss / (GRAVITY_MSS * 100.0)) * (18000.0 / PI)
}

/// Forward speed controller state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardSpeedController {
    kp: f32,
    kff: f32,
    accel_max: f32,
    vel_target: f32,
    cmd_vel: f32,
    vel_p: f32,
    vel_ff: f32,
    accel_target: f32,
    accel_out: f32,
    accel_out_last: f32,
    speed_forward: f32,
    speed_forward_last: f32,
    limit_accel: bool,
    accel_filter: LowPassFilter,
    pitch_target_cd: f32,
}

impl ForwardSpeedController {
    /// `accel_max` is capped at [`ACCEL_MAX_LIMIT`]
    pub fn new(kp: f32, kff: f32, accel_max: f32) -> Self {
        Self {
            kp,
            kff,
            accel_max: accel_max.min(ACCEL_MAX_LIMIT),
            vel_target: 0.0,
            cmd_vel: 0.0,
            vel_p: 0.0,
            vel_ff: 0.0,
            accel_target: 0.0,
            accel_out: 0.0,
            accel_out_last: 0.0,
            speed_forward: 0.0,
            speed_forward_last: 0.0,
            limit_accel: false,
            accel_filter: LowPassFilter::new(ACCEL_FILTER_CUTOFF_HZ),
            pitch_target_cd: 0.0,
        }
    }

    /// Start from the current forward speed so the command does not jump
    pub fn init(&mut self, speed_forward_cms: f32) {
        self.accel_target = 0.0;
        self.cmd_vel = speed_forward_cms;
        self.speed_forward = speed_forward_cms;
        self.speed_forward_last = speed_forward_cms;
        self.accel_out_last = self.cmd_vel * self.kff;
        self.accel_out = self.accel_out_last;
        self.accel_filter.reset(self.accel_out_last);
    }

    /// Ground speed target (cm/s)
    pub fn set_desired_speed(&mut self, vel_target_cms: f32) {
        self.vel_target = vel_target_cms;
    }

    /// One controller step; returns the pitch target (cdeg)
    pub fn update(&mut self, speed_forward_cms: f32, dt: f32) -> f32 {
        self.speed_forward = speed_forward_cms;
        let delta_speed_fwd = speed_forward_cms - self.speed_forward_last;
        self.speed_forward_last = speed_forward_cms;

        // Ramp the command toward the target without overshoot
        let step = self.accel_max * dt;
        if self.cmd_vel < self.vel_target {
            self.cmd_vel = (self.cmd_vel + step).min(self.vel_target);
        } else {
            self.cmd_vel = (self.cmd_vel - step).max(self.vel_target);
        }

        self.vel_p = self.kp * (self.cmd_vel - speed_forward_cms);
        self.vel_ff = self.cmd_vel * self.kff;

        self.accel_filter.set_cutoff_frequency(ACCEL_FILTER_CUTOFF_HZ);
        self.accel_target = self.accel_filter.apply(self.vel_p + self.vel_ff, dt);

        // Rate limit against the previous output
        self.accel_target = self.accel_target.clamp(
            self.accel_out_last - self.accel_max,
            self.accel_out_last + self.accel_max,
        );

        // The aircraft already gained more speed than the budget allows:
        // only accept targets that back off
        self.limit_accel = fabsf(delta_speed_fwd) > step;
        if !self.limit_accel || fabsf(self.accel_target) < fabsf(self.accel_out_last) {
            self.accel_out = self.accel_target;
        } else {
            self.accel_out = self.accel_out_last;
        }
        self.accel_out_last = self.accel_out;

        self.pitch_target_cd = pitch_for_accel_cd(self.accel_out);
        self.pitch_target_cd
    }

    pub fn pitch_target_cd(&self) -> f32 {
        self.pitch_target_cd
    }

    pub fn cmd_vel(&self) -> f32 {
        self.cmd_vel
    }

    pub fn vel_target(&self) -> f32 {
        self.vel_target
    }

    pub fn accel_max(&self) -> f32 {
        self.accel_max
    }

    pub fn accel_out(&self) -> f32 {
        self.accel_out
    }

    pub fn accel_target(&self) -> f32 {
        self.accel_target
    }

    pub fn vel_p(&self) -> f32 {
        self.vel_p
    }

    pub fn vel_ff(&self) -> f32 {
        self.vel_ff
    }

    pub fn speed_forward(&self) -> f32 {
        self.speed_forward
    }

    pub fn is_accel_limited(&self) -> bool {
        self.limit_accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.0025;

    #[test]
    fn test_accel_max_capped() {
        let ctrl = ForwardSpeedController::new(1.0, 0.15, 250.0);
        assert_eq!(ctrl.accel_max(), ACCEL_MAX_LIMIT);
        let ctrl = ForwardSpeedController::new(1.0, 0.15, 40.0);
        assert_eq!(ctrl.accel_max(), 40.0);
    }

    #[test]
    fn test_init_seeds_from_speed() {
        let mut ctrl = ForwardSpeedController::new(1.0, 0.15, 60.0);
        ctrl.init(800.0);
        assert_eq!(ctrl.cmd_vel(), 800.0);
        assert!((ctrl.accel_out() - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_cmd_vel_step_bounded() {
        for &target in &[0.0_f32, 200.0, 1100.0, 5000.0, -3000.0] {
            let mut ctrl = ForwardSpeedController::new(1.0, 0.15, 60.0);
            ctrl.init(600.0);
            ctrl.set_desired_speed(target);
            let mut last = ctrl.cmd_vel();
            for _ in 0..2000 {
                ctrl.update(600.0, DT);
                let step = (ctrl.cmd_vel() - last).abs();
                assert!(step <= 60.0 * DT + 1e-3, "step {} for target {}", step, target);
                last = ctrl.cmd_vel();
            }
        }
    }

    #[test]
    fn test_cmd_vel_reaches_target_without_overshoot() {
        let mut ctrl = ForwardSpeedController::new(1.0, 0.15, 60.0);
        ctrl.init(1090.0);
        ctrl.set_desired_speed(1100.0);
        for _ in 0..400 {
            ctrl.update(1090.0, DT);
            assert!(ctrl.cmd_vel() <= 1100.0);
        }
        assert_eq!(ctrl.cmd_vel(), 1100.0);
    }

    #[test]
    fn test_accel_out_delta_bounded() {
        let mut ctrl = ForwardSpeedController::new(5.0, 0.15, 60.0);
        ctrl.init(0.0);
        ctrl.set_desired_speed(3000.0);
        let mut last = ctrl.accel_out();
        for _ in 0..1000 {
            ctrl.update(0.0, DT);
            assert!((ctrl.accel_out() - last).abs() <= 60.0 + 1e-3);
            last = ctrl.accel_out();
        }
    }

    #[test]
    fn test_measured_speed_jump_freezes_accel() {
        let mut ctrl = ForwardSpeedController::new(1.0, 0.15, 60.0);
        ctrl.init(1000.0);
        ctrl.set_desired_speed(1500.0);
        ctrl.update(1000.0, DT);
        let before = ctrl.accel_out();
        // Speed jumps by far more than accel_max * dt while the demand grows
        ctrl.update(900.0, DT);
        assert!(ctrl.is_accel_limited());
        assert_eq!(ctrl.accel_out(), before);
    }

    #[test]
    fn test_pitch_sign_convention() {
        // Deceleration demand pitches nose up
        assert!(pitch_for_accel_cd(-100.0) > 0.0);
        assert!(pitch_for_accel_cd(100.0) < 0.0);
        assert_eq!(pitch_for_accel_cd(0.0), 0.0);
        // One g forward acceleration is 45 degrees nose down
        let pitch = pitch_for_accel_cd(GRAVITY_MSS * 100.0);
        assert!((pitch + 4500.0).abs() < 0.5);
    }

    #[test]
    fn test_slow_aircraft_pitches_down() {
        let mut ctrl = ForwardSpeedController::new(1.0, 0.15, 60.0);
        ctrl.init(500.0);
        ctrl.set_desired_speed(1100.0);
        let mut pitch = 0.0;
        for _ in 0..400 {
            pitch = ctrl.update(500.0, DT);
        }
        assert!(pitch < 0.0);
    }
}
