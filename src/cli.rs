//! Command-line interface definitions and parsing
//!
//! This module defines the CLI surface of listedit using the `clap` crate.
//! Combination rules (a source is required, at least one action, public and
//! private are exclusive) are checked by [`crate::request::MutationRequest`]
//! rather than by clap, so the user gets a targeted message followed by the
//! full help text.
//!
//! # Examples
//!
//! ```bash
//! # Move every email of a list to a new list ID
//! listedit --source dev@foo.example.org --rename dev@bar.example.org
//!
//! # Hide a list
//! listedit --source dev@foo.example.org --private
//!
//! # Count what a wildcard delete would remove, without touching anything
//! listedit --source '*.incubator.example.org' --wildcard --delete --test
//!
//! # Redact an address from a single email
//! listedit --mid '<abc@mail.example.org>' --obfuscate jane@example.org
//! ```

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "listedit")]
#[command(about = "Edit, hide, redact or delete mailing list archives", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source list to edit (list ID or posting address)
    #[arg(long = "source", value_name = "LIST")]
    pub source: Option<String>,

    /// Edit a single email by its message ID (takes precedence over --source when matching)
    #[arg(long = "mid", value_name = "MID")]
    pub mid: Option<String>,

    /// New list ID for the matched emails
    #[arg(long = "rename", value_name = "LIST")]
    pub rename: Option<String>,

    /// Set the description of the (renamed) list
    #[arg(long = "desc", value_name = "TEXT")]
    pub desc: Option<String>,

    /// Replace this text with "..." in body, subject and sender of matched emails
    #[arg(long = "obfuscate", value_name = "TEXT")]
    pub obfuscate: Option<String>,

    /// Make all matched emails private
    #[arg(long = "private")]
    pub private: bool,

    /// Make all matched emails public
    #[arg(long = "public")]
    pub public: bool,

    /// Delete all matched emails
    #[arg(long = "delete")]
    pub delete: bool,

    /// Treat the source list ID as a wildcard pattern (`*` and `?`)
    #[arg(long = "wildcard")]
    pub wildcard: bool,

    /// List IDs are used as given, without wrapping them in <>
    #[arg(long = "notag")]
    pub notag: bool,

    /// Log the query and every planned document change
    #[arg(long = "debug")]
    pub debug: bool,

    /// Test mode: count matches, change nothing
    #[arg(long = "test")]
    pub test: bool,

    /// Configuration file with the [elasticsearch] section
    #[arg(long = "config", value_name = "FILE", default_value = "ponymail.cfg")]
    pub config: PathBuf,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Print the full help text to stdout
    ///
    /// # Errors
    /// Returns an `io::Error` if stdout cannot be written.
    pub fn print_help() -> std::io::Result<()> {
        Self::command().print_help()
    }
}
