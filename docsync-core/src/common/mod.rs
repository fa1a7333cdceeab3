//! Common, format-agnostic conversion code shared by every format.

pub mod flat_to_model;
pub mod model_to_flat;
