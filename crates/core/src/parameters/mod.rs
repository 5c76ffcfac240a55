//! Parameter management types
//!
//! Name/value parameter store plus the typed `AROT_*` parameter group.
//! Persistence (flash, SD card) belongs to the vehicle and is not part of
//! this crate.

pub mod autorotation;
pub mod error;
pub mod storage;

pub use autorotation::{AutorotationParams, ParamDef, ParamKind};
pub use error::ParameterError;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
