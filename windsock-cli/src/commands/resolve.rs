//! Target resolution command.

use anyhow::{Context, Result};
use clap::Parser;
use windsock_channel::AddressResolver;
use windsock_core::config::WindsockConfig;

/// Arguments for the resolve command
#[derive(Parser)]
pub struct ResolveArgs {
    /// Target to resolve (absolute URL or path relative to the base URL)
    pub target: String,

    /// Base URL, overriding the configuration file
    #[arg(short, long)]
    pub base_url: Option<String>,
}

/// Print the streaming address `args.target` resolves to.
///
/// # Errors
///
/// Returns error if the base URL or the target is invalid.
pub fn run(args: &ResolveArgs, config: WindsockConfig) -> Result<()> {
    println!("{}", resolve(args, config)?);
    Ok(())
}

fn resolve(args: &ResolveArgs, mut config: WindsockConfig) -> Result<String> {
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }

    let resolver = AddressResolver::new(&config.base_url).context("Invalid base URL")?;
    let address = resolver
        .resolve(&args.target)
        .with_context(|| format!("Cannot resolve '{}'", args.target))?;
    Ok(address.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(target: &str, base_url: Option<&str>) -> ResolveArgs {
        ResolveArgs {
            target: target.to_string(),
            base_url: base_url.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_against_configured_base() {
        let resolved = resolve(&args("/depth", None), WindsockConfig::default()).unwrap();
        assert_eq!(resolved, "ws://127.0.0.1:8080/depth");
    }

    #[test]
    fn test_base_url_flag_overrides_config() {
        let resolved = resolve(
            &args("depth", Some("https://api.example.com/v1/")),
            WindsockConfig::default(),
        )
        .unwrap();
        assert_eq!(resolved, "wss://api.example.com/v1/depth");
    }

    #[test]
    fn test_unresolvable_target() {
        assert!(resolve(&args("mailto:ops@example.com", None), WindsockConfig::default()).is_err());
    }
}
