//! Configuration management.
//!
//! Configuration files are YAML, TOML or JSON; the format is picked from the
//! file extension by [`ConfigLoader`].

mod loader;
mod settings;

pub use loader::{ConfigFormat, ConfigLoader};
pub use settings::{ChannelDefaults, TransportConfig, TransportConfigBuilder, WindsockConfig};
