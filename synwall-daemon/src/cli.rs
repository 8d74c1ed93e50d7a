//! CLI argument definitions for synwall-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Synwall SYN-flood admission control daemon.
///
/// Runs the filter pipeline and the metrics sampler, optionally replaying
/// frames from a capture file, and prints a summary report on shutdown.
#[derive(Parser, Debug)]
#[command(name = "synwall-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to synwall.toml configuration file.
    #[arg(short, long, default_value = "/etc/synwall/synwall.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Replay frames from a length-prefixed raw frame file, then exit
    /// after the file is exhausted and the summary is printed.
    #[arg(long)]
    pub replay: Option<PathBuf>,
}
