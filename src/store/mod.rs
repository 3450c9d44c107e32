//! Search store abstraction
//!
//! The edit loop talks to the archive only through [`ArchiveStore`]: open a
//! scroll cursor for a [`Query`], page through it, submit [`BulkOp`] batches,
//! and write single documents. [`ElasticStore`] speaks the Elasticsearch REST
//! API; [`MemoryStore`] keeps documents in process and backs the tests.
//!
//! ```text
//! open_scroll ──► page ──► next_page ──► page ──► ... ──► empty page
//!                   │                      │
//!                   ▼                      ▼
//!                 bulk([update|delete, ...])
//! ```

pub mod elastic;
pub mod error;
pub mod memory;
pub mod query;
pub mod retry;

pub use elastic::ElasticStore;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::Query;
pub use retry::RetryPolicy;

use std::time::Duration;

use serde_json::{Map, Value};

/// Field names of archived email documents
pub mod fields {
    /// Message ID
    pub const MID: &str = "mid";
    /// List ID as received, e.g. `<dev.example.org>`
    pub const LIST_RAW: &str = "list_raw";
    /// List ID shown in the UI
    pub const LIST: &str = "list";
    pub const PRIVATE: &str = "private";
    pub const SUBJECT: &str = "subject";
    /// Sender
    pub const FROM: &str = "from";
    pub const BODY: &str = "body";
}

/// One matched document
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Store-assigned document ID
    pub id: String,
    /// Document fields as stored
    pub source: Map<String, Value>,
}

impl Hit {
    /// String value of a source field, if present and a string
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.source.get(name).and_then(Value::as_str)
    }
}

/// A page of a scroll cursor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollPage {
    /// Cursor handle for the next page; may change between pages
    pub scroll_id: Option<String>,
    pub hits: Vec<Hit>,
}

/// Parameters for opening a scroll cursor
#[derive(Debug, Clone)]
pub struct ScrollRequest<'a> {
    pub index: &'a str,
    pub query: &'a Query,
    /// Documents per page
    pub page_size: usize,
    /// How long the cursor survives between page requests
    pub keep_alive: Duration,
}

/// One action of a bulk request
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOp {
    /// Partial update merging `doc` into the stored document
    Update {
        index: String,
        id: String,
        doc: Map<String, Value>,
    },
    Delete { index: String, id: String },
}

impl BulkOp {
    /// Target document ID
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Update { id, .. } | Self::Delete { id, .. } => id,
        }
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// Result of an accepted bulk request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Actions sent
    pub submitted: usize,
    /// Actions the store reported as failed
    pub failed: usize,
}

/// Operations the edit loop needs from a search store
pub trait ArchiveStore {
    /// Open a scroll cursor and return its first page
    ///
    /// # Errors
    /// Returns `StoreError` if the search request fails.
    fn open_scroll(&self, request: &ScrollRequest<'_>) -> Result<ScrollPage, StoreError>;

    /// Fetch the next page, extending the cursor by `keep_alive`
    ///
    /// # Errors
    /// Returns `StoreError::ScrollNotFound` if the cursor expired, or any
    /// other `StoreError` if the request fails.
    fn next_page(&self, scroll_id: &str, keep_alive: Duration) -> Result<ScrollPage, StoreError>;

    /// Release a scroll cursor
    ///
    /// # Errors
    /// Returns `StoreError` if the request fails.
    fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError>;

    /// Submit a batch of updates and deletes in one round trip
    ///
    /// # Errors
    /// Returns `StoreError` if the batch as a whole is rejected. Failures of
    /// individual actions are counted in the returned [`BulkOutcome`].
    fn bulk(&self, ops: &[BulkOp]) -> Result<BulkOutcome, StoreError>;

    /// Create or replace a single document
    ///
    /// # Errors
    /// Returns `StoreError` if the write fails.
    fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError>;
}
