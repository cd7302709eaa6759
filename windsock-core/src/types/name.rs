//! Channel name type.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::ChannelError;

/// Channel name - the key a logical stream is registered under.
///
/// Names are free-form (`"market-depth:BTCUSDT:20"`, `"node-metrics:7"`) but
/// must be non-empty and free of whitespace and control characters.
///
/// # Examples
///
/// ```
/// use windsock_core::types::ChannelName;
///
/// let name = ChannelName::new("market-depth:BTCUSDT:20").unwrap();
/// assert_eq!(name.as_str(), "market-depth:BTCUSDT:20");
/// assert!(ChannelName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelName(String);

impl ChannelName {
    /// Creates a new `ChannelName`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidName` if the name is empty or contains
    /// whitespace or control characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ChannelError> {
        let name = value.into();
        if name.is_empty() {
            return Err(ChannelError::InvalidName {
                name,
                reason: "name is empty".to_string(),
            });
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ChannelError::InvalidName {
                name,
                reason: "name contains whitespace or control characters".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the feed kind, the part before the first `:` separator.
    ///
    /// `"market-depth:BTCUSDT:20"` yields `"market-depth"`; names without a
    /// separator are their own kind. Used as a low-cardinality metrics label.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelName {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelName> for String {
    fn from(name: ChannelName) -> Self {
        name.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ChannelName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
