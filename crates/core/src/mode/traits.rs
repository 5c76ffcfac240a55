//! Mode trait definition
//!
//! Platform-agnostic interface for flight mode state machines.

use super::ModeError;

/// Flight mode identifiers, numbered as the ground station expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ModeNumber {
    #[default]
    Stabilize = 0,
    Acro = 1,
    AltHold = 2,
    Auto = 3,
    Guided = 4,
    Loiter = 5,
    Autorotate = 26,
}

impl ModeNumber {
    /// Mission modes that must not resume unsupervised after a bailout
    pub fn runs_mission(&self) -> bool {
        matches!(self, ModeNumber::Auto)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModeNumber::Stabilize => "STABILIZE",
            ModeNumber::Acro => "ACRO",
            ModeNumber::AltHold => "ALT_HOLD",
            ModeNumber::Auto => "AUTO",
            ModeNumber::Guided => "GUIDED",
            ModeNumber::Loiter => "LOITER",
            ModeNumber::Autorotate => "AUTOROTATE",
        }
    }
}

impl TryFrom<u8> for ModeNumber {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModeNumber::Stabilize),
            1 => Ok(ModeNumber::Acro),
            2 => Ok(ModeNumber::AltHold),
            3 => Ok(ModeNumber::Auto),
            4 => Ok(ModeNumber::Guided),
            5 => Ok(ModeNumber::Loiter),
            26 => Ok(ModeNumber::Autorotate),
            _ => Err(()),
        }
    }
}

/// Flight mode trait
///
/// # Lifecycle
///
/// 1. `enter()` - Called once when switching into the mode
/// 2. `update()` - Called every control loop tick while the mode is active
/// 3. `exit()` - Called once when leaving the mode
///
/// Control ticks never fail: `update` resolves every problem to a safe
/// output and can only ask the vehicle to switch to another mode.
pub trait Mode {
    /// Initialize mode (called once on mode entry)
    ///
    /// `previous` is the mode being left, used when handing control back.
    fn enter(&mut self, now_ms: u32, previous: ModeNumber) -> Result<(), ModeError>;

    /// Run one control tick.
    ///
    /// Returns the mode the vehicle should switch to, if any.
    fn update(&mut self, now_ms: u32, landed: bool) -> Option<ModeNumber>;

    /// Cleanup mode (called once on mode exit)
    fn exit(&mut self);

    /// Get mode name for logging and telemetry
    fn name(&self) -> &'static str;

    /// Ground station mode number
    fn number(&self) -> ModeNumber;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_number_round_trip_values() {
        assert_eq!(ModeNumber::Autorotate as u8, 26);
        assert_eq!(ModeNumber::try_from(2), Ok(ModeNumber::AltHold));
        assert_eq!(ModeNumber::try_from(99), Err(()));
    }

    #[test]
    fn test_mission_modes() {
        assert!(ModeNumber::Auto.runs_mission());
        assert!(!ModeNumber::Guided.runs_mission());
        assert!(!ModeNumber::Loiter.runs_mission());
    }
}
