//! Streaming target address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ChannelError;

/// A resolved streaming endpoint.
///
/// Always carries a `ws` or `wss` scheme. Two addresses are equal when their
/// normalized URLs are equal, which is what the registry compares when a
/// channel name is requested twice.
///
/// # Examples
///
/// ```
/// use windsock_core::types::TargetAddress;
///
/// let addr = TargetAddress::parse("wss://host/feed").unwrap();
/// assert!(addr.is_secure());
/// assert!(TargetAddress::parse("https://host/feed").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetAddress(Url);

impl TargetAddress {
    /// Parses an address that is already expressed in a streaming scheme.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidAddress` if the value is not a URL or its
    /// scheme is not `ws`/`wss`.
    pub fn parse(value: &str) -> Result<Self, ChannelError> {
        let url = Url::parse(value).map_err(|e| ChannelError::InvalidAddress {
            target: value.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Wraps a URL, checking that it uses a streaming scheme.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidAddress` for any scheme other than `ws`/`wss`
    /// or a URL without a host.
    pub fn from_url(url: Url) -> Result<Self, ChannelError> {
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ChannelError::InvalidAddress {
                target: url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ChannelError::InvalidAddress {
                target: url.to_string(),
                reason: "missing host".to_string(),
            });
        }
        Ok(Self(url))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying URL.
    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns true for `wss` addresses.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.0.scheme() == "wss"
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for TargetAddress {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TargetAddress {
    type Error = ChannelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetAddress> for String {
    fn from(addr: TargetAddress) -> Self {
        addr.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_streaming_schemes() {
        let plain = TargetAddress::parse("ws://localhost:8080/feed").unwrap();
        assert!(!plain.is_secure());
        assert_eq!(plain.as_str(), "ws://localhost:8080/feed");

        let secure = TargetAddress::parse("wss://host/feed").unwrap();
        assert!(secure.is_secure());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            TargetAddress::parse("http://host/feed"),
            Err(ChannelError::InvalidAddress { .. })
        ));
        assert!(TargetAddress::parse("not a url").is_err());
    }

    #[test]
    fn test_equality_is_normalized() {
        let a = TargetAddress::parse("WSS://Host/feed").unwrap();
        let b = TargetAddress::parse("wss://host/feed").unwrap();
        assert_eq!(a, b);

        let c = TargetAddress::parse("wss://host/other").unwrap();
        assert_ne!(a, c);
    }
}
