//! listedit - bulk maintenance for mailing list archives
//!
//! This library locates archived emails in an Elasticsearch index by list ID,
//! wildcard or message ID, and rewrites them in scroll-paged bulk batches:
//! renaming the owning list, flipping visibility, redacting text, or deleting
//! them outright. List descriptions are upserted as separate metadata documents.

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod mutate;
pub mod output;
pub mod request;
pub mod store;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum ListEditError {
    /// Invalid or contradictory command-line input
    #[error("{0}")]
    Request(#[from] request::RequestError),
    /// Search store error
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl ListEditError {
    /// Whether the error stems from bad command-line usage
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}
