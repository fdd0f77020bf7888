//! Common utilities shared across the workflow crates.
//!
//! This crate provides:
//! - Unified error handling on top of the domain taxonomy
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, FailureClass, OptionExt};
