//! SceneFBX Core Library
//!
//! Math and color types plus the error type shared by the scene model and
//! the exporter.

pub mod error;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
