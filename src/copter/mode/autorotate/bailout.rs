//! Bailout: power restored in flight
//!
//! The motors spool back up to full authority while the descent rate and
//! pitch are walked to the pilot's climb rate and level. Control then goes
//! back to the mode flown before the autorotation, except that a mission
//! is never resumed: Auto hands over to AltHold instead.

use libm::fabsf;

use heli_arot_core::mode::{AutorotationPhase, BailoutState, ModeNumber};
use heli_arot_core::traits::{HeliVehicle, NavState, SpoolState};

use super::ModeAutorotate;

impl<V: HeliVehicle> ModeAutorotate<V> {
    fn init_bailout(&mut self, now_ms: u32, nav: &NavState) -> BailoutState {
        crate::log_warn!("Autorotation: bailing out at {} cm", nav.altitude_cm);

        if !self.vehicle.is_active_z() {
            self.vehicle
                .relax_alt_hold_controllers(self.arot.last_collective());
        }

        let pilot_spd_dn = -self.vehicle.pilot_speed_dn_cms();
        let pilot_spd_up = self.vehicle.pilot_speed_up_cms();
        self.vehicle.set_max_speed_z(nav.velocity_z_cms, pilot_spd_up);

        let pilot_des_vz = self
            .vehicle
            .desired_climb_rate_cms()
            .max(pilot_spd_dn)
            .min(pilot_spd_up);

        let bailout = BailoutState::begin(
            now_ms,
            self.arot.bail_time_s(),
            nav.velocity_z_cms,
            pilot_des_vz,
            self.pitch_target_cd,
        );

        self.vehicle.set_max_accel_z(fabsf(bailout.climb_rate_adjust()));
        self.vehicle
            .set_desired_spool_state(SpoolState::ThrottleUnlimited);
        bailout
    }

    /// Returns the mode to switch to once the bail time has run out
    pub(super) fn run_bailout(&mut self, now_ms: u32, nav: &NavState) -> Option<ModeNumber> {
        if self.take_initial(AutorotationPhase::BailOut) {
            self.bailout = Some(self.init_bailout(now_ms, nav));
        }

        let bailout = self.bailout.as_mut()?;
        bailout.update(now_ms, self.dt);
        let desired_vz = bailout.desired_vz_cms();
        let complete = bailout.is_complete(now_ms);
        self.pitch_target_cd = bailout.pitch_target_cd();

        self.vehicle
            .set_alt_target_from_climb_rate(desired_vz, self.dt, false);
        self.vehicle.update_z_controller();

        if !complete {
            return None;
        }
        if self.previous_mode.runs_mission() {
            Some(ModeNumber::AltHold)
        } else {
            Some(self.previous_mode)
        }
    }
}
