use colored::Colorize;
use std::time::Duration;

use crate::request::ListId;

/// Summary of an edit run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MutationSummary {
    /// Nothing was written
    pub dry_run: bool,
    /// Matched documents visited
    pub processed: usize,
    /// Documents updated (or that would be, in a dry run)
    pub updated: usize,
    /// Documents deleted (or that would be, in a dry run)
    pub deleted: usize,
    /// Matched documents the requested changes left as they were
    pub unchanged: usize,
    /// Batch boundaries reached, including the final remainder
    pub flushes: usize,
    /// Bulk requests the store accepted
    pub batches: usize,
    pub failed_batches: usize,
    /// Actions the store rejected inside accepted batches
    pub failed_items: usize,
    /// List whose description was set (or would be, in a dry run)
    pub metadata: Option<ListId>,
    pub elapsed: Duration,
    pub error_messages: Vec<String>,
}

impl MutationSummary {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn add_batch_error(&mut self, msg: String) {
        self.failed_batches += 1;
        self.error_messages.push(msg);
    }

    /// Whether every submitted batch and item went through
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed_batches == 0 && self.failed_items == 0
    }

    /// Closing line with count and wall-clock time
    #[must_use]
    pub fn done_line(&self) -> String {
        format!(
            "All done, processed {} docs in {} seconds",
            self.processed,
            self.elapsed.as_secs()
        )
    }

    pub fn print(&self) {
        let verb = if self.dry_run { "Would " } else { "" };
        let title = if self.dry_run {
            "=== List Edit Summary (test mode) ==="
        } else {
            "=== List Edit Summary ==="
        };
        println!("\n{}", title.bold());
        println!("  {} {}", "Processed:".bold(), self.processed);
        if self.updated > 0 {
            println!("  {} {}", format!("✓ {verb}update:").green(), self.updated);
        }
        if self.deleted > 0 {
            println!("  {} {}", format!("✓ {verb}delete:").green(), self.deleted);
        }
        if self.unchanged > 0 {
            println!("  {} {}", "⊘ Unchanged:".yellow(), self.unchanged);
        }
        if let Some(list) = &self.metadata {
            println!("  {} {list}", format!("✓ {verb}set description of").green());
        }
        if !self.dry_run {
            println!("  {} {}", "Batches:".bold(), self.batches);
        }
        if self.failed_batches > 0 || self.failed_items > 0 {
            println!("  {} {}", "✗ Failed batches:".red(), self.failed_batches);
            println!("  {} {}", "✗ Failed documents:".red(), self.failed_items);
            if !self.error_messages.is_empty() {
                println!("\n{}", "Error details:".red().bold());
                for msg in &self.error_messages {
                    println!("  - {msg}");
                }
            }
        }
        if self.dry_run {
            println!("\n{}", "Run without --test to apply changes.".yellow());
        }
        println!("{}", self.done_line());
    }
}
