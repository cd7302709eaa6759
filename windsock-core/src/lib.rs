//! # Windsock Core
//!
//! Core types, errors and configuration shared by the windsock crates.
//!
//! This crate provides:
//! - `NewType` wrappers for channel identity (`ChannelName`, `TargetAddress`)
//! - The retry policy attached to every channel
//! - Error types and severity classification
//! - Configuration loading with YAML/TOML/JSON support

#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

/// Core type definitions and 'NewType' wrappers
pub mod types;

/// Error types and handling
pub mod error;

/// Configuration management
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{ChannelError, ConfigError, NetworkError, WindsockError};
    pub use crate::types::*;
}
