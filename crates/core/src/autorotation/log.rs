//! Autorotation telemetry records
//!
//! Plain `Copy` snapshots handed to a [`TelemetrySink`](crate::traits::TelemetrySink).
//! Field names follow the onboard log message columns so tuning logs line up
//! with existing analysis tooling.

use bitflags::bitflags;

bitflags! {
    /// `AROT_LOG` bitmask selecting the optional tuning records
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LogBitmask: u8 {
        /// Head speed and forward speed controller internals (AR1G)
        const GLIDE = 1 << 0;
        /// Flare controller targets (AR2F)
        const FLARE = 1 << 1;
    }
}

/// Glide tuning record (AR1G)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlideTuning {
    /// Head speed P term
    pub p_term_hs: f32,
    /// Normalised head speed error
    pub head_speed_error: f32,
    /// Collective output
    pub collective: f32,
    /// Collective feed-forward term
    pub ff_term_hs: f32,
    /// Rotor speed (rpm)
    pub rpm: f32,
    /// Forward ground speed (cm/s)
    pub speed_forward_cms: f32,
    /// Ramped velocity command (cm/s)
    pub cmd_vel_cms: f32,
    /// Velocity P term (cm/s/s)
    pub vel_p: f32,
    /// Velocity feed-forward term (cm/s/s)
    pub vel_ff: f32,
    /// Limited acceleration output (cm/s/s)
    pub accel_out: f32,
    /// Acceleration target before limiting (cm/s/s)
    pub accel_target: f32,
    /// Pitch target (cdeg)
    pub pitch_target_cd: f32,
}

/// Flare tuning record (AR2F)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareTuning {
    pub z_accel_target: f32,
    pub adjusted_z_accel_target: f32,
    pub z_vel_target: f32,
    pub alt_target: f32,
    pub fwd_accel_target: f32,
    pub adjusted_fwd_accel_target: f32,
    pub p_term_pitch: f32,
    pub pitch_out_cd: f32,
    pub resultant_accel_peak: f32,
    pub pitch_angle_max_cd: f32,
}

/// Always-on tracking record (ARTR)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tracking {
    /// Forward ground speed (cm/s)
    pub speed_forward_cms: f32,
    /// Measured vertical acceleration, positive up (cm/s/s)
    pub accel_z_cms2: f32,
    /// Measured forward acceleration (cm/s/s)
    pub accel_fwd_cms2: f32,
}

/// Flare feasibility record (AFLR), written every time the test runs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareAssessmentRecord {
    pub velocity_z_cms: f32,
    pub td_vel_z_cms: f32,
    pub resultant_accel_peak: f32,
    pub accel_min: f32,
    pub accel_max: f32,
    pub td_alt_predicted_cm: f32,
    /// True when the flare would be initiated
    pub feasible: bool,
}

/// Flare controller detail record (AFLA/AFLB/AFLC/ACOL)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareDetail {
    pub pitch_angle_target_deg: f32,
    pub pitch_angle_measured_deg: f32,
    pub accel_mag_target: f32,
    pub accel_mag_measured: f32,
    pub drag_initial: f32,
    pub drag: f32,
    pub total_fwd_accel_target: f32,
    pub total_z_accel_target: f32,
    pub alt_measured_cm: f32,
    pub z_pos_correction: f32,
    pub fwd_vel_target: f32,
    pub z_vel_measured: f32,
    pub collective: f32,
    pub p_term_col: f32,
    pub ff_term_col: f32,
}

/// One telemetry record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogRecord {
    GlideTuning(GlideTuning),
    FlareTuning(FlareTuning),
    Tracking(Tracking),
    FlareAssessment(FlareAssessmentRecord),
    FlareDetail(FlareDetail),
}

impl LogRecord {
    /// Four-character log message name
    pub fn name(&self) -> &'static str {
        match self {
            LogRecord::GlideTuning(_) => "AR1G",
            LogRecord::FlareTuning(_) => "AR2F",
            LogRecord::Tracking(_) => "ARTR",
            LogRecord::FlareAssessment(_) => "AFLR",
            LogRecord::FlareDetail(_) => "AFLD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmask_from_param() {
        assert_eq!(LogBitmask::from_bits_truncate(0), LogBitmask::empty());
        assert_eq!(LogBitmask::from_bits_truncate(1), LogBitmask::GLIDE);
        assert_eq!(
            LogBitmask::from_bits_truncate(3),
            LogBitmask::GLIDE | LogBitmask::FLARE
        );
        // Unknown bits ignored
        assert_eq!(LogBitmask::from_bits_truncate(0xF2), LogBitmask::FLARE);
    }

    #[test]
    fn test_record_names() {
        assert_eq!(LogRecord::Tracking(Tracking::default()).name(), "ARTR");
        assert_eq!(
            LogRecord::GlideTuning(GlideTuning::default()).name(),
            "AR1G"
        );
    }
}
