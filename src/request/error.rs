//! Usage error types
//!
//! Every variant describes command-line input that cannot be turned into a
//! runnable edit. They are reported together with the help text, and the
//! process exits non-zero before any store access.

use thiserror::Error;

/// Invalid or contradictory command-line input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Neither `--source` nor `--mid` was given
    #[error("No source list ID specified!")]
    MissingSource,

    /// No rename, visibility, delete, description or redaction requested
    #[error("Nothing to do! No target list ID or action specified")]
    NothingToDo,

    /// `--public` and `--private` together
    #[error("You can either make a list public or private, not both!")]
    ConflictingVisibility,

    /// `--desc` with only a message ID to go on
    #[error("A description requires a list ID (--source)")]
    DescriptionWithoutList,

    /// `--obfuscate ""` would match between every character
    #[error("The text to obfuscate must not be empty")]
    EmptyRedaction,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
