//! One-shot advisory messages

use heli_arot_core::mode::MessageFlags;
use heli_arot_core::traits::{HeliVehicle, Severity};

use super::ModeAutorotate;

/// Advisories sent at most once per autorotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// RPM sensor failed, minimum collective commanded
    PoorRpmSensor,
    /// Touchdown started on the altitude threshold
    TouchdownAltitude,
    /// Touchdown started because the flare ran its full period
    TouchdownTimer,
}

impl Advisory {
    fn flag(&self) -> MessageFlags {
        match self {
            Advisory::PoorRpmSensor => MessageFlags::BAD_RPM,
            Advisory::TouchdownAltitude => MessageFlags::TD_REASON_ALT,
            Advisory::TouchdownTimer => MessageFlags::TD_REASON_TIMER,
        }
    }
}

impl<V: HeliVehicle> ModeAutorotate<V> {
    pub(super) fn message_handler(&mut self, advisory: Advisory) {
        let flag = advisory.flag();
        if self.msg_flags.contains(flag) {
            return;
        }
        self.msg_flags.insert(flag);

        match advisory {
            Advisory::PoorRpmSensor => {
                crate::log_warn!("Autorotation: RPM sensor failed, minimum collective");
                self.vehicle
                    .send_text(Severity::Info, "Warning: Poor RPM Sensor Health");
                self.vehicle
                    .send_text(Severity::Info, "Action: Minimum Collective Applied");
            }
            Advisory::TouchdownAltitude => {
                self.vehicle.send_text(Severity::Info, "TD Reason Alt");
            }
            Advisory::TouchdownTimer => {
                self.vehicle.send_text(Severity::Info, "TD Reason Timer");
            }
        }
    }
}
