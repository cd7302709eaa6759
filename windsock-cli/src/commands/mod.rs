//! CLI subcommands.

pub mod resolve;
pub mod watch;
