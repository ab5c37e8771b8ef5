//! Command line interface for the `mgmtwire` demo binary.
//!
//! Kept free of library types so `build.rs` can render the man page from the
//! same definition.

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `mgmtwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "mgmtwire",
    version,
    about = "Exercise the mgmtwire protocol against a simulated device"
)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity,
    #[command(subcommand)]
    pub command: Command,
}

/// Logging verbosity flags.
#[derive(Debug, Default, Args)]
pub struct Verbosity {
    /// Suppress all log output.
    #[arg(long, global = true, conflicts_with_all = ["quiet", "verbose"])]
    pub silent: bool,
    /// Log warnings and errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Log every message and frame.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Log level selected by [`Verbosity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Warn,
    Info,
    Trace,
}

impl Verbosity {
    /// Resolve the flags to a single level.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        if self.silent {
            LogLevel::Off
        } else if self.quiet {
            LogLevel::Warn
        } else if self.verbose {
            LogLevel::Trace
        } else {
            LogLevel::Info
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send text to a simulated device and print its reply.
    Echo(EchoArgs),
}

/// Arguments for the `echo` subcommand.
#[derive(Debug, Args)]
pub struct EchoArgs {
    /// Text to echo.
    pub text: String,
    /// Largest frame the simulated link carries, in bytes.
    #[arg(long, default_value_t = 64)]
    pub mtu: usize,
    /// Milliseconds to wait for the reply.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,
}
