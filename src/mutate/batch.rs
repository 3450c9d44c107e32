//! Scroll → patch → bulk loop
//!
//! Streams every matching email through a scroll cursor, plans one bulk
//! action per document, and submits the actions in batches of
//! [`FLUSH_EVERY`]. A rejected batch is logged and skipped; the loop goes on.

use std::mem;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::patch::DocumentMutation;
use super::summary::MutationSummary;
use super::{FLUSH_EVERY, PAGE_SIZE, SCROLL_KEEP_ALIVE};
use crate::store::{ArchiveStore, BulkOp, Hit, Query, ScrollRequest, StoreError};

/// Applies one [`DocumentMutation`] to every document a query matches
pub struct BatchMutator<'a, S: ArchiveStore + ?Sized> {
    store: &'a S,
    index: &'a str,
    mutation: DocumentMutation,
    dry_run: bool,
    pending: Vec<BulkOp>,
    summary: MutationSummary,
}

impl<'a, S: ArchiveStore + ?Sized> BatchMutator<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, index: &'a str, mutation: DocumentMutation, dry_run: bool) -> Self {
        Self {
            store,
            index,
            mutation,
            dry_run,
            pending: Vec::with_capacity(FLUSH_EVERY),
            summary: MutationSummary::new(dry_run),
        }
    }

    /// Run the loop until the cursor is exhausted
    ///
    /// # Errors
    /// Returns `StoreError` if the scroll cannot be opened or continued.
    /// Failed bulk submissions are recorded in the summary instead.
    pub fn run(mut self, query: &Query) -> Result<MutationSummary, StoreError> {
        let started = Instant::now();
        debug!(index = self.index, query = %query.to_json(), "Opening scroll");

        let mut page = self.store.open_scroll(&ScrollRequest {
            index: self.index,
            query,
            page_size: PAGE_SIZE,
            keep_alive: SCROLL_KEEP_ALIVE,
        })?;
        let mut scroll_id = page.scroll_id.take();

        while !page.hits.is_empty() {
            for hit in &page.hits {
                self.process(hit);
            }
            let Some(id) = scroll_id.as_deref() else {
                warn!("Store returned no scroll ID, stopping after the first page");
                break;
            };
            page = self.store.next_page(id, SCROLL_KEEP_ALIVE)?;
            if let Some(next) = page.scroll_id.take() {
                scroll_id = Some(next);
            }
        }

        if let Some(id) = scroll_id.as_deref()
            && let Err(e) = self.store.clear_scroll(id)
        {
            debug!("Could not clear scroll: {e}");
        }

        if !self.pending.is_empty() {
            self.flush();
        }

        self.summary.elapsed = started.elapsed();
        info!(
            processed = self.summary.processed,
            batches = self.summary.batches,
            failed_batches = self.summary.failed_batches,
            "Edit finished"
        );
        Ok(self.summary)
    }

    fn process(&mut self, hit: &Hit) {
        self.summary.processed += 1;

        match self.mutation.plan(self.index, hit) {
            Some(op) => {
                debug!(id = %hit.id, ?op, "Planned change");
                if op.is_delete() {
                    self.summary.deleted += 1;
                } else {
                    self.summary.updated += 1;
                }
                if !self.dry_run {
                    self.pending.push(op);
                }
            }
            None => self.summary.unchanged += 1,
        }

        if self.summary.processed % FLUSH_EVERY == 0 {
            println!("Processed {} emails...", self.summary.processed);
            self.flush();
        }
    }

    fn flush(&mut self) {
        self.summary.flushes += 1;
        if self.dry_run || self.pending.is_empty() {
            return;
        }

        let ops = mem::replace(&mut self.pending, Vec::with_capacity(FLUSH_EVERY));
        match self.store.bulk(&ops) {
            Ok(outcome) => {
                self.summary.batches += 1;
                if outcome.failed > 0 {
                    warn!(
                        "Bulk update rejected {} of {} documents",
                        outcome.failed, outcome.submitted
                    );
                    self.summary.failed_items += outcome.failed;
                }
            }
            Err(e) => {
                warn!("Could not bulk update {} documents: {e}", ops.len());
                self.summary.add_batch_error(e.to_string());
            }
        }
    }
}
