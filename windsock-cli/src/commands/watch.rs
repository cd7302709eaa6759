//! Channel watch command.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use windsock_channel::{ChannelRegistry, ChannelRequest};
use windsock_core::config::WindsockConfig;

/// Arguments for the watch command
#[derive(Parser)]
pub struct WatchArgs {
    /// Channel name (e.g., market-depth:BTCUSDT:20)
    pub name: String,

    /// Target to connect to (absolute URL or path relative to the base URL)
    pub target: String,

    /// Give up after this many failed reconnects (default: retry forever)
    #[arg(short, long)]
    pub attempts: Option<u32>,

    /// Delay before the first reconnect, in milliseconds
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Base URL, overriding the configuration file
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Exit after printing this many messages
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Print connection state changes to stderr
    #[arg(short, long)]
    pub states: bool,

    /// Pretty-print JSON messages
    #[arg(short, long)]
    pub pretty: bool,
}

impl WatchArgs {
    fn request(&self) -> ChannelRequest {
        let mut request = ChannelRequest::new(&self.name, &self.target);
        if let Some(attempts) = self.attempts {
            request = request.retry_attempts(attempts);
        }
        if let Some(delay_ms) = self.delay_ms {
            request = request.retry_base_delay(Duration::from_millis(delay_ms));
        }
        request
    }
}

/// Watch a channel until Ctrl-C, the message count is reached, or the
/// channel gives up.
///
/// # Errors
///
/// Returns error if the channel cannot be acquired or exhausts its retries.
pub async fn run(args: WatchArgs, mut config: WindsockConfig) -> Result<()> {
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }

    let registry = ChannelRegistry::new(&config).context("Failed to create channel registry")?;
    let handle = registry
        .acquire::<serde_json::Value>(&args.request())
        .context("Failed to acquire channel")?;

    info!(channel = %handle.name(), target = %handle.target(), "Watching channel");

    let mut messages = handle.messages();
    let mut states = handle.state();
    let mut printed = 0usize;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, closing channel");
                break;
            }
            Some(state) = states.recv() => {
                if args.states {
                    eprintln!("[{}] {state}", handle.name());
                }
            }
            message = messages.recv() => match message {
                Some(Ok(value)) => {
                    let line = if args.pretty {
                        serde_json::to_string_pretty(&value)?
                    } else {
                        serde_json::to_string(&value)?
                    };
                    println!("{line}");

                    printed += 1;
                    if args.count.is_some_and(|count| printed >= count) {
                        break;
                    }
                }
                Some(Err(e)) => return Err(e).context("Channel closed"),
                None => break,
            },
        }
    }

    messages.detach();
    states.detach();
    Ok(())
}
