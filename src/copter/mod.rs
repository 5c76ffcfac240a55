//! Traditional helicopter vehicle logic

pub mod mode;
