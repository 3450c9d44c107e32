//! Archive edit operations
//!
//! This module applies a validated [`MutationRequest`] to a store:
//! - the list description upsert (`metadata`), independent of the emails
//! - the scroll/bulk loop over matching emails (`batch`), driven by the
//!   per-document changes in `patch`
//!
//! Both honor test mode: changes are planned and counted, never written.

pub mod batch;
pub mod metadata;
pub mod patch;
pub mod summary;


pub use batch::BatchMutator;
pub use metadata::{ListMetadata, upsert_description};
pub use patch::DocumentMutation;
pub use summary::MutationSummary;

use std::time::Duration;

use crate::config::IndexNames;
use crate::request::MutationRequest;
use crate::store::{ArchiveStore, StoreError};

/// Documents requested per scroll page
pub const PAGE_SIZE: usize = 100;

/// Processed-document interval at which the pending batch is submitted
pub const FLUSH_EVERY: usize = 500;

/// Scroll cursor lifetime, renewed with every page request
pub const SCROLL_KEEP_ALIVE: Duration = Duration::from_secs(30 * 60);

/// Text that replaces redacted substrings
pub const REDACTION_PLACEHOLDER: &str = "...";

/// Apply a request: upsert the description, then edit the matching emails
///
/// # Errors
/// Returns `StoreError` if the description cannot be written or the scroll
/// over matching emails fails. Rejected bulk batches do not abort the run;
/// they are counted in the returned summary.
pub fn run<S: ArchiveStore + ?Sized>(
    store: &S,
    indices: &IndexNames,
    request: &MutationRequest,
) -> Result<MutationSummary, StoreError> {
    let mut metadata = None;
    if let Some(description) = &request.description
        && let Some(list) = request.effective_list()
    {
        upsert_description(store, &indices.lists, list, description, request.dry_run)?;
        metadata = Some(list.clone());
    }

    let mutation = DocumentMutation::from(request);
    let mut summary = match request.query() {
        Some(query) if !mutation.is_empty() => {
            BatchMutator::new(store, &indices.archive, mutation, request.dry_run).run(&query)?
        }
        _ => MutationSummary::new(request.dry_run),
    };
    summary.metadata = metadata;
    Ok(summary)
}
