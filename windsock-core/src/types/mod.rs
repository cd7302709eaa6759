//! Core type definitions.
//!
//! This module provides the identity and policy types every channel carries:
//! - [`ChannelName`] - logical stream key
//! - [`TargetAddress`] - resolved `ws://`/`wss://` endpoint
//! - [`RetryPolicy`] - reconnect budget and backoff base

mod address;
mod name;
mod retry;

pub use address::TargetAddress;
pub use name::ChannelName;
pub use retry::RetryPolicy;
