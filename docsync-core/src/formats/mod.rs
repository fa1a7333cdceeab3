//! Format implementations
//!
//! This module contains the format implementations that convert between the
//! document model and its external representations.

pub mod html;
pub mod json;
pub mod text;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use text::{TextFormat, TextOptions};
