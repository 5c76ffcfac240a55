//! Flare feasibility and trajectory tracking
//!
//! The flare is shaped as a half-cosine acceleration pulse over the flare
//! period `T`:
//!
//! ```text
//! a(t) = a_peak * (1 - cos(2πt/T)) / 2
//! v(t) = a_peak / 2 * (t - T sin(2πt/T) / 2π) + v0
//! p(t) = a_peak / 4 * (t² + T²/(2π²) (cos(2πt/T) - 1)) + v0 t + p0
//! ```
//!
//! so the demand starts at zero and ends at zero once `t = T`.
//! [`assess_flare`] decides whether such a pulse can stop the aircraft at
//! the touchdown altitude; [`FlareController`] tracks it.
//!
//! Vertical quantities are positive up, all in cm, cm/s and cm/s/s.

use core::f32::consts::PI;

use libm::{acosf, cosf, fabsf, sinf, sqrtf, tanf};

use crate::filter::LowPassFilter;
use crate::traits::{NavState, GRAVITY_MSS};

use super::head_speed::Collective;

/// Minimum flare period (s)
pub const FLARE_PERIOD_MIN: f32 = 0.5;

/// Lowest acceptable peak acceleration as a multiple of g
pub const FLARE_MIN_ACCEL_PEAK: f32 = 1.05;

/// Smallest speed used as a divisor (cm/s)
pub const MIN_SPEED_DIVISOR: f32 = 1.0;

/// Smallest acceleration magnitude used as a divisor (cm/s/s)
pub const MIN_ACCEL_DIVISOR: f32 = 1.0;

/// Forward speed targeted at the end of the flare (cm/s)
pub const TOUCHDOWN_FORWARD_SPEED: f32 = 0.0;

const GRAVITY_CMSS: f32 = GRAVITY_MSS * 100.0;
const TWO_PI: f32 = 2.0 * PI;

/// Fraction of `delta_z_peak * T²` travelled during the flare
const ALTITUDE_PREDICTION_GAIN: f32 = 0.25 - 1.0 / (8.0 * PI * PI);

/// Push a divisor away from zero, keeping its sign
fn guard_divisor(value: f32, min: f32) -> f32 {
    if !value.is_finite() {
        min
    } else if fabsf(value) < min {
        if value < 0.0 {
            -min
        } else {
            min
        }
    } else {
        value
    }
}

fn acos_deg(ratio: f32) -> f32 {
    acosf(ratio.clamp(-1.0, 1.0)).to_degrees()
}

/// Half-cosine position target
pub fn position_target(accel_peak: f32, vel_initial: f32, pos_initial: f32, t: f32, period: f32) -> f32 {
    (accel_peak / 4.0) * (t * t + (period * period) / (PI * TWO_PI) * (cosf(TWO_PI * t / period) - 1.0))
        + vel_initial * t
        + pos_initial
}

/// Half-cosine velocity target
pub fn velocity_target(accel_peak: f32, vel_initial: f32, t: f32, period: f32) -> f32 {
    accel_peak / 2.0 * (t - period * sinf(t * TWO_PI / period) / TWO_PI) + vel_initial
}

/// Half-cosine acceleration target
pub fn acceleration_target(accel_peak: f32, t: f32, period: f32) -> f32 {
    accel_peak * (1.0 - cosf(TWO_PI * t / period)) / 2.0
}

/// Mass-normalised forward drag from the measured acceleration and pitch
pub fn drag_estimate(accel_z_cms2: f32, accel_fwd_cms2: f32, pitch_rad: f32) -> f32 {
    accel_z_cms2 * tanf(pitch_rad) + accel_fwd_cms2
}

/// Measured state used by the flare
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareInputs {
    pub velocity_z_cms: f32,
    pub speed_forward_cms: f32,
    pub altitude_cm: f32,
    pub accel_z_cms2: f32,
    pub accel_fwd_cms2: f32,
    pub pitch_rad: f32,
}

impl FlareInputs {
    pub fn from_nav(nav: &NavState) -> Self {
        let (accel_z_cms2, accel_fwd_cms2) = nav.accel_z_fwd_cms2();
        Self {
            velocity_z_cms: nav.velocity_z_cms,
            speed_forward_cms: nav.speed_forward_cms(),
            altitude_cm: nav.altitude_cm,
            accel_z_cms2,
            accel_fwd_cms2,
            pitch_rad: nav.pitch_rad,
        }
    }
}

/// Configured flare limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareLimits {
    /// Touchdown descent rate target, positive magnitude (cm/s)
    pub td_vel_z_cms: f32,
    /// Flare period, at least [`FLARE_PERIOD_MIN`] (s)
    pub period_s: f32,
    /// Peak acceleration limit as a multiple of g
    pub accel_max_g: f32,
    /// Maximum pitch angle (cdeg)
    pub angle_max_cd: f32,
    /// Touchdown altitude target (cm)
    pub td_alt_target_cm: f32,
}

/// Why a flare was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlareRejection {
    /// Peak acceleration outside the allowed band
    Magnitude,
    /// Required pitch beyond the angle limit
    Angle,
    /// Predicted completion altitude too far from the touchdown target
    Altitude,
}

/// Outcome of the flare feasibility test, with every intermediate value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareAssessment {
    /// Vertical delta acceleration peak (cm/s/s)
    pub delta_accel_z_peak: f32,
    /// Forward delta acceleration peak (cm/s/s)
    pub delta_accel_fwd_peak: f32,
    /// Vertical peak including gravity (cm/s/s)
    pub accel_z_peak: f32,
    /// Drag-compensated forward peak (cm/s/s)
    pub fwd_accel_delta: f32,
    /// Peak resultant acceleration (cm/s/s)
    pub resultant_accel_peak: f32,
    /// Resultant acceleration band (cm/s/s)
    pub accel_min: f32,
    pub accel_max: f32,
    /// Pitch needed at the peak (cdeg)
    pub pitch_angle_max_cd: f32,
    /// Altitude at the end of the flare (cm)
    pub td_alt_predicted_cm: f32,
    /// `None` when the flare should start
    pub rejection: Option<FlareRejection>,
}

impl FlareAssessment {
    pub fn is_feasible(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Flare feasibility test.
///
/// Pure function of its inputs. Checks run in order (magnitude, angle,
/// altitude) and the first failure is reported, but every value is always
/// computed.
pub fn assess_flare(inputs: &FlareInputs, limits: &FlareLimits) -> FlareAssessment {
    let period = limits.period_s.max(FLARE_PERIOD_MIN);
    let z_vel = inputs.velocity_z_cms;
    let fwd_vel = inputs.speed_forward_cms;

    let delta_accel_z_peak = 2.0 * (-limits.td_vel_z_cms - z_vel) / period;
    let delta_accel_fwd_peak = 2.0 * (TOUCHDOWN_FORWARD_SPEED - fwd_vel) / period;

    let accel_z_peak = delta_accel_z_peak + GRAVITY_CMSS;

    // Drag scales with the square of the speed expected at the peak
    let current_drag = drag_estimate(inputs.accel_z_cms2, inputs.accel_fwd_cms2, inputs.pitch_rad);
    let fwd_vel_prediction = delta_accel_fwd_peak * period / 4.0 + fwd_vel;
    let fwd_vel_divisor = guard_divisor(fwd_vel, MIN_SPEED_DIVISOR);
    let fwd_accel_delta = -(fabsf(delta_accel_fwd_peak)
        - current_drag * fwd_vel_prediction * fwd_vel_prediction / (fwd_vel_divisor * fwd_vel_divisor));

    let resultant_accel_peak =
        sqrtf(accel_z_peak * accel_z_peak + fwd_accel_delta * fwd_accel_delta);
    let accel_min = FLARE_MIN_ACCEL_PEAK * GRAVITY_CMSS;
    let accel_max = limits.accel_max_g * GRAVITY_CMSS;

    let pitch_angle_max_cd = acos_deg(
        fwd_accel_delta / guard_divisor(resultant_accel_peak, MIN_ACCEL_DIVISOR),
    ) * 100.0
        - 9000.0;

    let td_alt_predicted_cm =
        ALTITUDE_PREDICTION_GAIN * delta_accel_z_peak * period * period + z_vel * period + inputs.altitude_cm;

    let rejection = if !(accel_min..=accel_max).contains(&resultant_accel_peak) {
        Some(FlareRejection::Magnitude)
    } else if fabsf(pitch_angle_max_cd) > fabsf(limits.angle_max_cd) {
        Some(FlareRejection::Angle)
    } else if td_alt_predicted_cm < limits.td_alt_target_cm * 0.5
        || td_alt_predicted_cm > limits.td_alt_target_cm * 1.5
    {
        Some(FlareRejection::Altitude)
    } else {
        None
    };

    FlareAssessment {
        delta_accel_z_peak,
        delta_accel_fwd_peak,
        accel_z_peak,
        fwd_accel_delta,
        resultant_accel_peak,
        accel_min,
        accel_max,
        pitch_angle_max_cd,
        td_alt_predicted_cm,
        rejection,
    }
}

/// State captured the moment the flare starts
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareInitialConditions {
    pub vel_z: f32,
    pub vel_fwd: f32,
    pub alt_z: f32,
    pub drag: f32,
}

/// Flare controller gains and filter cutoffs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareGains {
    /// Vertical velocity error to acceleration
    pub z_vel_kp: f32,
    /// Forward velocity error to acceleration
    pub fwd_vel_kp: f32,
    /// Altitude error to vertical velocity
    pub pos_kp: f32,
    /// Pitch output (cdeg) per degree of pitch error
    pub pitch_kp: f32,
    /// Collective per g of acceleration magnitude error
    pub col_kp: f32,
    /// Pitch trim filter cutoff (Hz)
    pub pitch_cutoff_hz: f32,
    /// Position feed-forward filter cutoff (Hz)
    pub pos_cutoff_hz: f32,
}

/// Flare trajectory tracking controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareController {
    gains: FlareGains,
    period: f32,
    angle_max_cd: f32,
    initial: FlareInitialConditions,
    delta_accel_z_peak: f32,
    delta_accel_fwd_peak: f32,
    flare_time: f32,
    pitch_trim_lpf: LowPassFilter,
    pos_ff_lpf: LowPassFilter,
    // Targets
    alt_target: f32,
    z_vel_target: f32,
    fwd_vel_target: f32,
    z_accel_target: f32,
    fwd_accel_target: f32,
    adjusted_z_accel_target: f32,
    adjusted_fwd_accel_target: f32,
    total_z_accel_target: f32,
    total_fwd_accel_target: f32,
    z_pos_correction: f32,
    // Outputs
    p_term_pitch: f32,
    p_term_col: f32,
    ff_term_col: f32,
    ff_term_pitch: f32,
    pitch_out_cd: f32,
    detail: FlareDetailValues,
}

/// Intermediate values from the last update, for telemetry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlareDetailValues {
    pub pitch_angle_target_deg: f32,
    pub pitch_angle_measured_deg: f32,
    pub accel_mag_target: f32,
    pub accel_mag_measured: f32,
    pub drag: f32,
    pub alt_measured_cm: f32,
    pub z_vel_measured: f32,
}

impl FlareController {
    pub fn new(gains: FlareGains, period: f32, angle_max_cd: f32) -> Self {
        Self {
            gains,
            period: period.max(FLARE_PERIOD_MIN),
            angle_max_cd,
            initial: FlareInitialConditions::default(),
            delta_accel_z_peak: 0.0,
            delta_accel_fwd_peak: 0.0,
            flare_time: 0.0,
            pitch_trim_lpf: LowPassFilter::new(gains.pitch_cutoff_hz),
            pos_ff_lpf: LowPassFilter::new(gains.pos_cutoff_hz),
            alt_target: 0.0,
            z_vel_target: 0.0,
            fwd_vel_target: 0.0,
            z_accel_target: 0.0,
            fwd_accel_target: 0.0,
            adjusted_z_accel_target: 0.0,
            adjusted_fwd_accel_target: 0.0,
            total_z_accel_target: 0.0,
            total_fwd_accel_target: 0.0,
            z_pos_correction: 0.0,
            p_term_pitch: 0.0,
            p_term_col: 0.0,
            ff_term_col: 0.0,
            ff_term_pitch: 0.0,
            pitch_out_cd: 0.0,
            detail: FlareDetailValues::default(),
        }
    }

    /// Snapshot the initial conditions and the peaks found by the
    /// feasibility test that triggered the flare
    pub fn set_initial_conditions(
        &mut self,
        inputs: &FlareInputs,
        assessment: &FlareAssessment,
        pitch_target_cd: f32,
    ) {
        self.initial = FlareInitialConditions {
            vel_z: inputs.velocity_z_cms,
            vel_fwd: inputs.speed_forward_cms,
            alt_z: inputs.altitude_cm,
            drag: drag_estimate(inputs.accel_z_cms2, inputs.accel_fwd_cms2, inputs.pitch_rad),
        };
        self.delta_accel_z_peak = assessment.delta_accel_z_peak;
        self.delta_accel_fwd_peak = assessment.delta_accel_fwd_peak;
        self.pitch_out_cd = pitch_target_cd;
        self.flare_time = 0.0;
    }

    /// Configure cutoffs and reset the trim filters.
    ///
    /// Collective trim restarts from the current collective, pitch trim from
    /// `pitch_target_cd`, the position feed-forward from zero.
    pub fn init(&mut self, collective: &mut Collective, col_cutoff_hz: f32, pitch_target_cd: f32) {
        collective.set_cutoff_frequency(col_cutoff_hz);
        self.pitch_trim_lpf.set_cutoff_frequency(self.gains.pitch_cutoff_hz);
        self.pos_ff_lpf.set_cutoff_frequency(self.gains.pos_cutoff_hz);

        collective.reset_trim();
        self.pitch_out_cd = pitch_target_cd;
        self.pitch_trim_lpf.reset(pitch_target_cd);
        self.pos_ff_lpf.reset(0.0);
    }

    /// Elapsed flare time (s)
    pub fn set_flare_time(&mut self, seconds: f32) {
        self.flare_time = seconds.max(0.0);
    }

    /// One tracking step. Writes the collective and returns the pitch
    /// target (cdeg), limited to the angle limit.
    pub fn update(&mut self, collective: &mut Collective, inputs: &FlareInputs, dt: f32) -> f32 {
        let t = self.flare_time;
        let period = self.period;
        let z_vel_measured = inputs.velocity_z_cms;
        let fwd_vel_measured = inputs.speed_forward_cms;

        // Targets
        self.alt_target = position_target(
            self.delta_accel_z_peak,
            self.initial.vel_z,
            self.initial.alt_z,
            t,
            period,
        );
        self.z_vel_target = velocity_target(self.delta_accel_z_peak, self.initial.vel_z, t, period);
        self.fwd_vel_target =
            velocity_target(self.delta_accel_fwd_peak, self.initial.vel_fwd, t, period);

        // Altitude error feeds the vertical velocity target, with a slow
        // feed-forward bounded by the entry descent rate
        self.z_pos_correction = (self.alt_target - inputs.altitude_cm) / period * self.gains.pos_kp;
        let ff_bound = fabsf(self.initial.vel_z);
        let ff_pos_correction = self
            .pos_ff_lpf
            .apply(self.z_pos_correction, dt)
            .clamp(-ff_bound, ff_bound);
        self.z_vel_target += self.z_pos_correction + ff_pos_correction;

        self.z_accel_target = acceleration_target(self.delta_accel_z_peak, t, period);
        self.fwd_accel_target = acceleration_target(self.delta_accel_fwd_peak, t, period);
        self.adjusted_z_accel_target = self.z_accel_target
            + (self.z_vel_target - z_vel_measured) / period * self.gains.z_vel_kp;
        self.adjusted_fwd_accel_target = self.fwd_accel_target
            + (self.fwd_vel_target - fwd_vel_measured) / period * self.gains.fwd_vel_kp;

        self.total_z_accel_target = self.adjusted_z_accel_target + GRAVITY_CMSS;

        let vel_fwd_initial = guard_divisor(self.initial.vel_fwd, MIN_SPEED_DIVISOR);
        let drag = self.initial.drag * fwd_vel_measured * fwd_vel_measured
            / (vel_fwd_initial * vel_fwd_initial);
        self.total_fwd_accel_target = self.adjusted_fwd_accel_target - drag;

        let accel_mag_target = sqrtf(
            self.total_z_accel_target * self.total_z_accel_target
                + self.total_fwd_accel_target * self.total_fwd_accel_target,
        );
        let pitch_angle_target_deg = acos_deg(
            self.total_fwd_accel_target / guard_divisor(accel_mag_target, MIN_ACCEL_DIVISOR),
        ) - 90.0;

        // Measured
        let accel_mag_measured = sqrtf(
            inputs.accel_z_cms2 * inputs.accel_z_cms2 + inputs.accel_fwd_cms2 * inputs.accel_fwd_cms2,
        );
        let pitch_angle_measured_deg = inputs.pitch_rad.to_degrees();

        // Errors
        let mag_error = (accel_mag_target - accel_mag_measured) / GRAVITY_CMSS;
        let pitch_error = pitch_angle_target_deg - pitch_angle_measured_deg;

        self.p_term_pitch = pitch_error * self.gains.pitch_kp;
        self.p_term_col = mag_error * self.gains.col_kp;

        self.ff_term_col = collective.feed_forward(dt);
        self.ff_term_pitch = self.pitch_trim_lpf.apply(self.pitch_out_cd, dt);

        let pitch = self.p_term_pitch + self.ff_term_pitch;
        self.pitch_out_cd = if pitch.is_finite() {
            pitch.clamp(-self.angle_max_cd, self.angle_max_cd)
        } else {
            self.pitch_out_cd.clamp(-self.angle_max_cd, self.angle_max_cd)
        };

        collective.set(self.p_term_col + self.ff_term_col);

        self.detail = FlareDetailValues {
            pitch_angle_target_deg,
            pitch_angle_measured_deg,
            accel_mag_target,
            accel_mag_measured,
            drag,
            alt_measured_cm: inputs.altitude_cm,
            z_vel_measured,
        };

        self.pitch_out_cd
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn flare_time(&self) -> f32 {
        self.flare_time
    }

    pub fn initial_conditions(&self) -> &FlareInitialConditions {
        &self.initial
    }

    pub fn pitch_out_cd(&self) -> f32 {
        self.pitch_out_cd
    }

    pub fn pitch_trim(&self) -> f32 {
        self.pitch_trim_lpf.output()
    }

    pub fn pos_feed_forward(&self) -> f32 {
        self.pos_ff_lpf.output()
    }

    pub fn alt_target(&self) -> f32 {
        self.alt_target
    }

    pub fn z_vel_target(&self) -> f32 {
        self.z_vel_target
    }

    pub fn fwd_vel_target(&self) -> f32 {
        self.fwd_vel_target
    }

    pub fn z_accel_target(&self) -> f32 {
        self.z_accel_target
    }

    pub fn fwd_accel_target(&self) -> f32 {
        self.fwd_accel_target
    }

    pub fn adjusted_z_accel_target(&self) -> f32 {
        self.adjusted_z_accel_target
    }

    pub fn adjusted_fwd_accel_target(&self) -> f32 {
        self.adjusted_fwd_accel_target
    }

    pub fn total_z_accel_target(&self) -> f32 {
        self.total_z_accel_target
    }

    pub fn total_fwd_accel_target(&self) -> f32 {
        self.total_fwd_accel_target
    }

    pub fn z_pos_correction(&self) -> f32 {
        self.z_pos_correction
    }

    pub fn p_term_pitch(&self) -> f32 {
        self.p_term_pitch
    }

    pub fn p_term_col(&self) -> f32 {
        self.p_term_col
    }

    pub fn ff_term_col(&self) -> f32 {
        self.ff_term_col
    }

    pub fn detail(&self) -> &FlareDetailValues {
        &self.detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: f32 = 4.5;

    fn limits() -> FlareLimits {
        FlareLimits {
            td_vel_z_cms: 50.0,
            period_s: PERIOD,
            accel_max_g: 2.0,
            angle_max_cd: 3000.0,
            td_alt_target_cm: 50.0,
        }
    }

    fn gains() -> FlareGains {
        FlareGains {
            z_vel_kp: 0.2,
            fwd_vel_kp: 0.2,
            pos_kp: 0.5,
            pitch_kp: 3.0,
            col_kp: 0.2,
            pitch_cutoff_hz: 500.0,
            pos_cutoff_hz: 0.001,
        }
    }

    /// Glide state whose flare ends exactly at `td_alt` for the default limits
    fn inputs_for_td_alt(td_alt: f32, vz: f32, fwd: f32) -> FlareInputs {
        let delta_z = 2.0 * (-50.0 - vz) / PERIOD;
        let altitude = td_alt - ALTITUDE_PREDICTION_GAIN * delta_z * PERIOD * PERIOD - vz * PERIOD;
        FlareInputs {
            velocity_z_cms: vz,
            speed_forward_cms: fwd,
            altitude_cm: altitude,
            accel_z_cms2: GRAVITY_CMSS,
            accel_fwd_cms2: 0.0,
            pitch_rad: 0.0,
        }
    }

    #[test]
    fn test_trajectory_boundaries() {
        let peak = -300.0;
        assert!(acceleration_target(peak, 0.0, PERIOD).abs() < 1e-3);
        assert!((acceleration_target(peak, PERIOD / 2.0, PERIOD) - peak).abs() < 1e-2);
        assert!(acceleration_target(peak, PERIOD, PERIOD).abs() < 1e-2);

        assert!((velocity_target(peak, 800.0, 0.0, PERIOD) - 800.0).abs() < 1e-3);
        // Area under the pulse is peak * T / 2
        let v_end = velocity_target(peak, 800.0, PERIOD, PERIOD);
        assert!((v_end - (800.0 + peak * PERIOD / 2.0)).abs() < 0.1);

        assert!((position_target(peak, 0.0, 1200.0, 0.0, PERIOD) - 1200.0).abs() < 1e-3);
    }

    #[test]
    fn test_position_is_integral_of_velocity() {
        let peak = 100.0;
        let p_end = position_target(peak, -600.0, 900.0, PERIOD, PERIOD);
        let expected = peak * PERIOD * PERIOD / 4.0 - 600.0 * PERIOD + 900.0;
        assert!((p_end - expected).abs() < 0.5);

        // Numerical integration of the velocity target
        let steps = 4500;
        let dt = PERIOD / steps as f32;
        let mut p = 900.0;
        for i in 0..steps {
            let t = (i as f32 + 0.5) * dt;
            p += velocity_target(peak, -600.0, t, PERIOD) * dt;
        }
        let mid = position_target(peak, -600.0, 900.0, PERIOD, PERIOD);
        assert!((p - mid).abs() < 1.0);
    }

    #[test]
    fn test_assessment_accepts_matching_altitude() {
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let result = assess_flare(&inputs, &limits());
        assert_eq!(result.rejection, None, "{:?}", result);
        assert!((result.td_alt_predicted_cm - 50.0).abs() < 0.5);
        assert!(result.is_feasible());
    }

    #[test]
    fn test_assessment_rejects_high_altitude() {
        let mut inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        inputs.altitude_cm += 2000.0;
        let result = assess_flare(&inputs, &limits());
        assert_eq!(result.rejection, Some(FlareRejection::Altitude));
    }

    #[test]
    fn test_assessment_altitude_band_edges() {
        let inside = inputs_for_td_alt(74.0, -800.0, 800.0);
        assert!(assess_flare(&inside, &limits()).is_feasible());
        let outside = inputs_for_td_alt(80.0, -800.0, 800.0);
        assert_eq!(
            assess_flare(&outside, &limits()).rejection,
            Some(FlareRejection::Altitude)
        );
        let low = inputs_for_td_alt(20.0, -800.0, 800.0);
        assert_eq!(
            assess_flare(&low, &limits()).rejection,
            Some(FlareRejection::Altitude)
        );
    }

    #[test]
    fn test_assessment_rejects_weak_flare() {
        // Already at the touchdown sink rate with no forward speed:
        // the pulse needs less than 1.05 g
        let inputs = inputs_for_td_alt(50.0, -50.0, 0.0);
        let result = assess_flare(&inputs, &limits());
        assert_eq!(result.rejection, Some(FlareRejection::Magnitude));
    }

    #[test]
    fn test_assessment_rejects_violent_flare() {
        let inputs = inputs_for_td_alt(50.0, -3000.0, 800.0);
        let result = assess_flare(&inputs, &limits());
        assert_eq!(result.rejection, Some(FlareRejection::Magnitude));
    }

    #[test]
    fn test_assessment_rejects_steep_pitch() {
        let mut lim = limits();
        lim.angle_max_cd = 1500.0;
        lim.accel_max_g = 5.0;
        let inputs = inputs_for_td_alt(50.0, -800.0, 4000.0);
        let result = assess_flare(&inputs, &lim);
        assert_eq!(result.rejection, Some(FlareRejection::Angle));
        assert!(result.pitch_angle_max_cd > 1500.0);
    }

    #[test]
    fn test_assessment_is_pure() {
        let inputs = inputs_for_td_alt(50.0, -750.0, 650.0);
        let a = assess_flare(&inputs, &limits());
        let b = assess_flare(&inputs, &limits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_assessment_zero_forward_speed_is_finite() {
        let inputs = FlareInputs {
            velocity_z_cms: -800.0,
            speed_forward_cms: 0.0,
            altitude_cm: 1000.0,
            accel_z_cms2: GRAVITY_CMSS,
            accel_fwd_cms2: -40.0,
            pitch_rad: 0.1,
        };
        let result = assess_flare(&inputs, &limits());
        assert!(result.resultant_accel_peak.is_finite());
        assert!(result.pitch_angle_max_cd.is_finite());
        assert!(result.td_alt_predicted_cm.is_finite());
    }

    #[test]
    fn test_assessment_clamps_short_period() {
        let mut lim = limits();
        lim.period_s = 0.0;
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let result = assess_flare(&inputs, &lim);
        assert!(result.delta_accel_z_peak.is_finite());
        assert!((result.delta_accel_z_peak - 2.0 * 750.0 / FLARE_PERIOD_MIN).abs() < 1e-2);
    }

    #[test]
    fn test_drag_estimate() {
        assert_eq!(drag_estimate(GRAVITY_CMSS, -30.0, 0.0), -30.0);
        let d = drag_estimate(1000.0, 0.0, 0.1);
        assert!((d - 1000.0 * tanf(0.1)).abs() < 1e-3);
    }

    fn started_controller(inputs: &FlareInputs) -> (FlareController, Collective) {
        let mut ctrl = FlareController::new(gains(), PERIOD, 3000.0);
        let assessment = assess_flare(inputs, &limits());
        let mut collective = Collective::new();
        collective.reset(0.35);
        ctrl.set_initial_conditions(inputs, &assessment, -200.0);
        ctrl.init(&mut collective, 0.5, -200.0);
        (ctrl, collective)
    }

    #[test]
    fn test_init_resets_filters() {
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let (ctrl, collective) = started_controller(&inputs);
        assert_eq!(collective.trim(), 0.35);
        assert_eq!(collective.cutoff_frequency(), 0.5);
        assert_eq!(ctrl.pitch_trim(), -200.0);
        assert_eq!(ctrl.pos_feed_forward(), 0.0);
        assert_eq!(ctrl.initial_conditions().vel_z, -800.0);
        assert_eq!(ctrl.initial_conditions().vel_fwd, 800.0);
    }

    #[test]
    fn test_on_trajectory_first_step() {
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let (mut ctrl, mut collective) = started_controller(&inputs);
        ctrl.set_flare_time(0.0);
        let pitch = ctrl.update(&mut collective, &inputs, 0.0025);
        // At t = 0 the pulse is zero and the aircraft is on the trajectory
        assert!(ctrl.z_pos_correction().abs() < 1e-3);
        assert!((ctrl.total_z_accel_target() - GRAVITY_CMSS).abs() < 1e-2);
        assert!(pitch.abs() <= 3000.0);
        assert!((0.0..=1.0).contains(&collective.output()));
    }

    #[test]
    fn test_outputs_bounded_over_flare() {
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let (mut ctrl, mut collective) = started_controller(&inputs);
        let mut measured = inputs;
        let mut t = 0.0;
        while t < PERIOD {
            ctrl.set_flare_time(t);
            // Aircraft not responding at all: worst case for the P terms
            measured.altitude_cm -= 800.0 * 0.0025;
            let pitch = ctrl.update(&mut collective, &measured, 0.0025);
            assert!(pitch.abs() <= 3000.0);
            assert!((0.0..=1.0).contains(&collective.output()));
            t += 0.0025;
        }
        // Sinking faster than the trajectory asks for more collective
        assert!(collective.output() > 0.35);
    }

    #[test]
    fn test_zero_forward_speed_guarded() {
        let mut inputs = inputs_for_td_alt(50.0, -800.0, 0.0);
        inputs.accel_fwd_cms2 = -20.0;
        let (mut ctrl, mut collective) = started_controller(&inputs);
        ctrl.set_flare_time(1.0);
        let pitch = ctrl.update(&mut collective, &inputs, 0.0025);
        assert!(pitch.is_finite());
        assert!(collective.output().is_finite());
    }

    #[test]
    fn test_zero_magnitude_guarded() {
        let inputs = inputs_for_td_alt(50.0, -800.0, 800.0);
        let (mut ctrl, mut collective) = started_controller(&inputs);
        let mut freefall = inputs;
        freefall.accel_z_cms2 = 0.0;
        freefall.accel_fwd_cms2 = 0.0;
        ctrl.set_flare_time(2.0);
        let pitch = ctrl.update(&mut collective, &freefall, 0.0025);
        assert!(pitch.is_finite());
        assert!(collective.output() >= 0.0);
    }
}
