//! Signal filters used by the autorotation controllers

mod low_pass;

pub use low_pass::LowPassFilter;
