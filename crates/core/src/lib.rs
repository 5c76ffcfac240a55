//! heli_arot_core - Pure no_std autorotation control logic
//!
//! This crate contains the platform-agnostic controllers and types behind
//! the helicopter autorotation mode. Everything here can be tested on host
//! without any feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Sensors, actuators and reporting injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Collaborator traits (time, RPM, navigation, motors, GCS) and mocks
//! - [`autorotation`]: Controller engine (head speed, forward speed, flare, RPM health)
//! - [`filter`]: First-order low-pass filter
//! - [`parameters`]: `AROT_*` parameter definitions and the parameter store
//! - [`mode`]: Mode trait, mode numbers, autorotation phase and bailout state

#![no_std]

pub mod autorotation;
pub mod filter;
pub mod mode;
pub mod parameters;
pub mod traits;
