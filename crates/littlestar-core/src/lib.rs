//! # littlestar-core
//!
//! Core types, traits, and error handling for the Little Star English tutor.

pub mod error;
pub mod types;

pub use error::{Error, HttpError, Result};
pub use types::*;
