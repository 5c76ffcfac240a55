//! Mode State Machine Types
//!
//! Pure types for flight mode state machines. The vehicle-level mode
//! implementations live in the `heli_arot` crate and drive their
//! collaborators through the traits in [`crate::traits`].
//!
//! # Contents
//!
//! - `Mode` trait and the `ModeNumber` identifiers
//! - `ModeError` returned when a mode refuses to start
//! - Autorotation phase, one-shot flags and bailout ramp state

mod error;
mod state;
mod traits;

pub use error::ModeError;
pub use state::{
    AutorotationPhase, BailoutState, MessageFlags, PhaseFlags, BAILOUT_MARGIN_S,
    BAILOUT_MOTOR_RAMP_S, ENTRY_DURATION_S,
};
pub use traits::{Mode, ModeNumber};
