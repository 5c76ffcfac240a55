//! Vehicle collaborator bundle
//!
//! The autorotation mode owns one value implementing every collaborator
//! trait. Firmware provides a struct wrapping the real drivers;
//! [`MockVehicle`] composes the mocks for host tests.

use super::actuators::{
    AttitudeControl, MockAttitudeControl, MockMotors, MockPositionControl, MotorOutput,
    PositionControl, SpoolState,
};
use super::pilot::{MockPilot, PilotInput};
use super::reporting::{GcsNotifier, MockGcs, MockTelemetry, Severity, TelemetrySink};
use super::sensors::{MockNavigation, MockRpmSensor, NavState, NavigationSource, RpmSensor};
use crate::autorotation::LogRecord;

/// Everything the autorotation mode talks to
pub trait HeliVehicle:
    RpmSensor
    + NavigationSource
    + MotorOutput
    + AttitudeControl
    + PositionControl
    + PilotInput
    + GcsNotifier
    + TelemetrySink
{
}

impl<T> HeliVehicle for T where
    T: RpmSensor
        + NavigationSource
        + MotorOutput
        + AttitudeControl
        + PositionControl
        + PilotInput
        + GcsNotifier
        + TelemetrySink
{
}

/// Vehicle assembled from the mock collaborators
#[derive(Debug, Default)]
pub struct MockVehicle {
    pub rpm: MockRpmSensor,
    pub nav: MockNavigation,
    pub motors: MockMotors,
    pub attitude: MockAttitudeControl,
    pub pos_control: MockPositionControl,
    pub pilot: MockPilot,
    pub gcs: MockGcs,
    pub telemetry: MockTelemetry,
}

impl MockVehicle {
    /// Vehicle in a steady glide: rotor at `rpm`, navigation at `nav`
    pub fn new(rpm: f32, nav: NavState) -> Self {
        Self {
            rpm: MockRpmSensor::new(rpm),
            nav: MockNavigation::new(nav),
            ..Self::default()
        }
    }
}

impl RpmSensor for MockVehicle {
    fn rpm(&self, instance: u8) -> Option<f32> {
        self.rpm.rpm(instance)
    }
}

impl NavigationSource for MockVehicle {
    fn nav_state(&self) -> NavState {
        self.nav.nav_state()
    }
}

impl MotorOutput for MockVehicle {
    fn set_throttle_filter_cutoff(&mut self, cutoff_hz: f32) {
        self.motors.set_throttle_filter_cutoff(cutoff_hz);
    }

    fn set_throttle(&mut self, collective: f32) {
        self.motors.set_throttle(collective);
    }

    fn set_desired_spool_state(&mut self, state: SpoolState) {
        self.motors.set_desired_spool_state(state);
    }

    fn interlock_engaged(&self) -> bool {
        self.motors.interlock_engaged()
    }
}

impl AttitudeControl for MockVehicle {
    fn lean_angle_max_cd(&self) -> f32 {
        self.attitude.lean_angle_max_cd()
    }

    fn input_euler_angle_roll_pitch_euler_rate_yaw(
        &mut self,
        roll_cd: f32,
        pitch_cd: f32,
        yaw_rate_cds: f32,
    ) {
        self.attitude
            .input_euler_angle_roll_pitch_euler_rate_yaw(roll_cd, pitch_cd, yaw_rate_cds);
    }
}

impl PositionControl for MockVehicle {
    fn is_active_z(&self) -> bool {
        self.pos_control.is_active_z()
    }

    fn relax_alt_hold_controllers(&mut self, throttle_setting: f32) {
        self.pos_control.relax_alt_hold_controllers(throttle_setting);
    }

    fn set_max_speed_z(&mut self, speed_down_cms: f32, speed_up_cms: f32) {
        self.pos_control.set_max_speed_z(speed_down_cms, speed_up_cms);
    }

    fn set_max_accel_z(&mut self, accel_cmss: f32) {
        self.pos_control.set_max_accel_z(accel_cmss);
    }

    fn set_alt_target_from_climb_rate(&mut self, climb_rate_cms: f32, dt: f32, force_descend: bool) {
        self.pos_control
            .set_alt_target_from_climb_rate(climb_rate_cms, dt, force_descend);
    }

    fn update_z_controller(&mut self) {
        self.pos_control.update_z_controller();
    }
}

impl PilotInput for MockVehicle {
    fn desired_lean_angles_cd(&self, angle_max_cd: f32) -> (f32, f32) {
        self.pilot.desired_lean_angles_cd(angle_max_cd)
    }

    fn desired_yaw_rate_cds(&self) -> f32 {
        self.pilot.desired_yaw_rate_cds()
    }

    fn desired_climb_rate_cms(&self) -> f32 {
        self.pilot.desired_climb_rate_cms()
    }

    fn pilot_speed_up_cms(&self) -> f32 {
        self.pilot.pilot_speed_up_cms()
    }

    fn pilot_speed_dn_cms(&self) -> f32 {
        self.pilot.pilot_speed_dn_cms()
    }
}

impl GcsNotifier for MockVehicle {
    fn send_text(&mut self, severity: Severity, text: &str) {
        self.gcs.send_text(severity, text);
    }
}

impl TelemetrySink for MockVehicle {
    fn write_record(&mut self, record: &LogRecord) {
        self.telemetry.write_record(record);
    }
}
