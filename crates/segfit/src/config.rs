//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use segfit_memory::constants::{DEFAULT_ARENA_CAPACITY, LARGE_PAYLOAD, SMALL_PAYLOAD};
use segfit_memory::{ArenaConfig, ConfigError};

/// Fixed-capacity segregated-fit arena allocator.
#[derive(Parser, Debug)]
#[command(name = "segfit", version, about)]
pub struct AppConfig {
    /// Arena capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_ARENA_CAPACITY, env = "SEGFIT_CAPACITY")]
    pub capacity: usize,

    /// Size-class payload sizes, comma separated.
    #[arg(
        long = "size-class",
        value_delimiter = ',',
        default_values_t = [LARGE_PAYLOAD, SMALL_PAYLOAD],
        env = "SEGFIT_SIZE_CLASSES"
    )]
    pub size_classes: Vec<u8>,

    /// JSON configuration file; overrides --capacity and --size-class.
    #[arg(long, env = "SEGFIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print reports as JSON.
    #[arg(long)]
    pub json: bool,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output (debug-level logging).
    #[arg(short, long)]
    pub verbose: bool,

    /// What to run. Defaults to `demo`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Allocate one block of each reference class, release both, and show
    /// that the next small allocation reuses the first block.
    Demo,
    /// Print the partition: blocks per class, offsets and tail padding.
    Layout,
    /// Allocate one class until it runs out, then probe the other classes.
    Exhaust {
        /// Payload size to exhaust.
        #[arg(long, default_value_t = usize::from(LARGE_PAYLOAD))]
        size: usize,
    },
}

impl AppConfig {
    /// Parse CLI arguments.
    ///
    /// Usage errors are returned instead of exiting with clap's code 2, which
    /// is already taken by out of memory.
    pub fn try_parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    /// The selected subcommand.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Demo)
    }

    /// Build the arena configuration from the config file or the flags.
    pub fn arena_config(&self) -> Result<ArenaConfig, ConfigError> {
        match &self.config {
            Some(path) => ArenaConfig::load(path),
            None => ArenaConfig::new(self.capacity, self.size_classes.clone()),
        }
    }
}
