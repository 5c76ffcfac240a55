#![cfg_attr(not(test), no_std)]

//! heli_arot - Autonomous autorotation flight mode for traditional helicopters
//!
//! Vehicle-level half of the autorotation system: the flight mode that
//! sequences entry, glide, flare, touchdown and bailout on top of the
//! controllers in `heli_arot_core`.

// Logging macros
pub mod core;

// Helicopter flight modes
pub mod copter;
