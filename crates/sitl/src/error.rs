use heli_arot_core::mode::ModeError;

/// Errors that can occur while running a simulated autorotation.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Mode entry refused: {0}")]
    ModeRefused(ModeError),

    #[error("Timeout waiting for {what} after {elapsed_s} s")]
    Timeout { what: &'static str, elapsed_s: f32 },
}

impl From<ModeError> for SimulatorError {
    fn from(err: ModeError) -> Self {
        SimulatorError::ModeRefused(err)
    }
}
