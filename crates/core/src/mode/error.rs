//! Mode entry error types

use core::fmt;

/// Reasons a flight mode refuses to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    /// Feature switched off by parameter
    NotEnabled,
    /// Motor interlock engaged (engine still driving the rotor)
    InterlockEngaged,
}

impl ModeError {
    /// Text reported to the ground station
    pub fn gcs_text(&self) -> &'static str {
        match self {
            ModeError::NotEnabled => "Autorot Mode Not Enabled",
            ModeError::InterlockEngaged => "Autorot Mode Change Fail: Interlock Engaged",
        }
    }
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gcs_text())
    }
}
