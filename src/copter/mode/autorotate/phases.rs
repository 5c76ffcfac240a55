//! Entry, glide, flare and touchdown phase actions

use libm::fabsf;

use heli_arot_core::mode::AutorotationPhase;
use heli_arot_core::traits::{elapsed_ms, elapsed_s, HeliVehicle, NavState};

use super::{ModeAutorotate, HEAD_SPEED_TARGET_RATIO};

/// Descent rate the touchdown deceleration is sized for (cm/s)
const TOUCHDOWN_END_VEL_CMS: f32 = 50.0;

/// Measured head speed within this fraction of the target counts as on target
const HEAD_SPEED_BAND: f32 = 0.005;

impl<V: HeliVehicle> ModeAutorotate<V> {
    pub(super) fn run_entry(&mut self, now_ms: u32, nav: &NavState) {
        if self.take_initial(AutorotationPhase::Entry) {
            crate::log_info!("Autorotation: entry phase");
            self.arot.set_col_cutoff_freq(self.arot.col_entry_freq());
            // Hold the head speed found at mode entry, then walk it down
            self.target_head_speed = self.initial_hs_ratio;
            self.arot.set_desired_fwd_speed();
        }

        let ratio = self.arot.head_speed_ratio();
        if fabsf(ratio - HEAD_SPEED_TARGET_RATIO) <= HEAD_SPEED_TARGET_RATIO * HEAD_SPEED_BAND {
            // On the set point: the decay is over for the rest of the entry
            self.initial_hs_ratio = HEAD_SPEED_TARGET_RATIO;
            self.hs_decay = 0.0;
            self.target_head_speed = HEAD_SPEED_TARGET_RATIO;
        } else {
            let decayed = self.initial_hs_ratio
                - self.hs_decay * elapsed_s(now_ms, self.entry_time_start_ms);
            self.target_head_speed = if self.initial_hs_ratio >= HEAD_SPEED_TARGET_RATIO {
                decayed.max(HEAD_SPEED_TARGET_RATIO)
            } else {
                decayed.min(HEAD_SPEED_TARGET_RATIO)
            };
        }
        self.arot.set_target_head_speed(self.target_head_speed);

        self.pitch_target_cd = self.arot.update_forward_speed_controller(nav);
        self.bad_rpm = self.arot.update_hs_glide_controller(&mut self.vehicle);
    }

    pub(super) fn run_glide(&mut self, nav: &NavState) {
        if self.take_initial(AutorotationPhase::SteadyGlide) {
            crate::log_info!("Autorotation: steady glide phase");
            self.arot.set_col_cutoff_freq(self.arot.col_glide_freq());
            self.arot.set_desired_fwd_speed();
            // Entry may have ended before the head speed reached the set point
            self.target_head_speed = HEAD_SPEED_TARGET_RATIO;
            self.arot.set_target_head_speed(self.target_head_speed);
        }

        self.pitch_target_cd = self.arot.update_forward_speed_controller(nav);
        self.bad_rpm = self.arot.update_hs_glide_controller(&mut self.vehicle);
    }

    pub(super) fn run_flare(&mut self, now_ms: u32, nav: &NavState) {
        if self.take_initial(AutorotationPhase::Flare) {
            crate::log_info!(
                "Autorotation: flare at {} cm, {} cm/s",
                nav.altitude_cm,
                nav.velocity_z_cms
            );
            self.flare_time_start_ms = now_ms;
            self.arot.set_flare_initial_cond(nav);
            self.arot.set_col_cutoff_freq(self.arot.col_flare_freq());
            self.arot.init_flare_controller(nav);
        }

        self.arot
            .set_flare_time(elapsed_ms(now_ms, self.flare_time_start_ms));
        self.target_head_speed = HEAD_SPEED_TARGET_RATIO;
        self.arot.set_target_head_speed(self.target_head_speed);

        self.pitch_target_cd = self.arot.update_flare_controller(nav, &mut self.vehicle);
        self.arot.set_collective(&mut self.vehicle);
    }

    pub(super) fn run_touchdown(&mut self, nav: &NavState) {
        if self.take_initial(AutorotationPhase::TouchDown) {
            crate::log_info!("Autorotation: touchdown at {} cm", nav.altitude_cm);
            if !self.vehicle.is_active_z() {
                self.vehicle
                    .relax_alt_hold_controllers(self.arot.last_collective());
            }

            // Decelerate to the end velocity over the remaining height
            let vz = nav.velocity_z_cms;
            let height = nav.altitude_cm.max(1.0);
            let accel = (TOUCHDOWN_END_VEL_CMS * TOUCHDOWN_END_VEL_CMS - vz * vz) / (2.0 * height);
            self.vehicle.set_max_accel_z(fabsf(accel));
            self.vehicle.set_max_speed_z(vz, 0.0);
        }

        self.vehicle.set_alt_target_from_climb_rate(
            -fabsf(self.arot.td_vel_target_cms()),
            self.dt,
            true,
        );
        self.vehicle.update_z_controller();
        self.pitch_target_cd = 0.0;
    }
}
