//! Software-in-the-loop harness for the autorotation mode.
//!
//! A point-mass helicopter ([`SimHeli`]) implements every collaborator the
//! mode needs, and [`ScenarioRunner`] flies complete engine-out descents
//! against it on the host.

pub mod config;
pub mod error;
pub mod heli;
pub mod scenario;

pub use config::HeliSimConfig;
pub use error::SimulatorError;
pub use heli::SimHeli;
pub use scenario::{ScenarioReport, ScenarioRunner};
