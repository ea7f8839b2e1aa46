//! CLI command definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Subcommand};

/// Track command arguments.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["name", "line1"])))]
pub struct TrackCommand {
    /// Use a stored TLE by name
    #[arg(short, long)]
    pub name: Option<String>,

    /// First TLE line
    #[arg(long, requires = "line2")]
    pub line1: Option<String>,

    /// Second TLE line
    #[arg(long, requires = "line1")]
    pub line2: Option<String>,

    /// Reference instant in RFC 3339 (defaults to now)
    #[arg(long, value_name = "TIME")]
    pub at: Option<DateTime<Utc>>,

    /// Sample the track concurrently (overrides configuration)
    #[arg(long)]
    pub concurrent: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// TLE record commands.
#[derive(Debug, Subcommand)]
pub enum TleCommand {
    /// Store or replace a named TLE
    Add {
        /// Name to store the TLE under
        name: String,
        /// First TLE line
        line1: String,
        /// Second TLE line
        line2: String,
    },

    /// List stored TLEs
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a stored TLE
    Show {
        /// Name of the TLE
        name: String,
    },

    /// Remove a stored TLE
    Remove {
        /// Name of the TLE
        name: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
