//! Helicopter flight modes
//!
//! Following ArduPilot's architecture, each mode implements the `Mode`
//! trait with enter/update/exit lifecycle hooks. Only the autorotation
//! mode lives here; the modes it hands control back to belong to the
//! host flight stack.

pub mod autorotate;

pub use autorotate::{AutorotateOutput, ModeAutorotate};
pub use heli_arot_core::mode::{Mode, ModeError, ModeNumber};
