//! Core infrastructure
//!
//! Target-independent plumbing shared by the flight modes.

pub mod logging;
