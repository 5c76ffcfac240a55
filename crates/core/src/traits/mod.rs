//! Collaborator traits for platform-agnostic autorotation control.
//!
//! The autorotation mode never reaches for global singletons. Every sensor,
//! actuator and reporting channel it touches is one of these traits,
//! injected by the vehicle when the mode is built.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Firmware implementations live in the vehicle crate

pub mod actuators;
pub mod pilot;
pub mod reporting;
pub mod sensors;
pub mod time;
pub mod vehicle;

pub use actuators::{
    AttitudeControl, MockAttitudeControl, MockMotors, MockPositionControl, MotorOutput,
    PositionControl, SpoolState,
};
pub use pilot::{MockPilot, PilotInput};
pub use reporting::{GcsNotifier, MockGcs, MockTelemetry, Severity, TelemetrySink, MAX_TEXT_LEN};
pub use sensors::{
    MockNavigation, MockRpmSensor, NavState, NavigationSource, RpmSensor, GRAVITY_MSS,
    RPM_INSTANCES,
};
pub use time::{elapsed_ms, elapsed_s, MockTime, TimeSource};
pub use vehicle::{HeliVehicle, MockVehicle};
