//! Resolution of channel targets into streaming addresses.

use url::{ParseError, Url};
use windsock_core::error::ChannelError;
use windsock_core::types::TargetAddress;

/// Turns the target of a channel request into a `ws`/`wss` address.
///
/// - `ws://` and `wss://` targets are used as given.
/// - `http://` and `https://` targets switch to `ws://` and `wss://`.
/// - Anything without a scheme is joined onto the base URL with standard URL
///   reference rules (`"feed"` is relative to the base path, `"/feed"` to
///   its root), then the scheme is switched the same way.
///
/// # Example
///
/// ```
/// use windsock_channel::AddressResolver;
///
/// let resolver = AddressResolver::new("https://api.example.com/stream/").unwrap();
/// let address = resolver.resolve("depth/BTCUSDT").unwrap();
/// assert_eq!(address.as_str(), "wss://api.example.com/stream/depth/BTCUSDT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResolver {
    base: Url,
}

impl AddressResolver {
    /// Creates a resolver for targets relative to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidAddress` if `base_url` is not an absolute
    /// `http`, `https`, `ws` or `wss` URL.
    pub fn new(base_url: &str) -> Result<Self, ChannelError> {
        let base = Url::parse(base_url).map_err(|e| ChannelError::InvalidAddress {
            target: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(ChannelError::InvalidAddress {
                target: base_url.to_string(),
                reason: format!("unsupported base scheme '{}'", base.scheme()),
            });
        }
        Ok(Self { base })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves `target` into a streaming address.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidAddress` if the target is malformed or
    /// uses a scheme that has no streaming counterpart.
    pub fn resolve(&self, target: &str) -> Result<TargetAddress, ChannelError> {
        let invalid = |reason: String| ChannelError::InvalidAddress {
            target: target.to_string(),
            reason,
        };

        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) => {
                self.base.join(target).map_err(|e| invalid(e.to_string()))?
            }
            Err(e) => return Err(invalid(e.to_string())),
        };

        TargetAddress::from_url(to_streaming_scheme(url).map_err(invalid)?)
    }
}

fn to_streaming_scheme(mut url: Url) -> Result<Url, String> {
    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(url),
        "http" => "ws",
        "https" => "wss",
        other => return Err(format!("unsupported scheme '{other}'")),
    };
    url.set_scheme(scheme)
        .map_err(|()| format!("cannot switch '{}' to {scheme}", url.scheme()))?;
    Ok(url)
}
