//! In-process archive store
//!
//! Holds documents in ordered maps and answers the same query subset as
//! the Elasticsearch client: `term` and `wildcard` on string fields. A scroll
//! takes a snapshot of the matching IDs when opened, like a real cursor.
//! Every bulk call is recorded so tests can check batch sizes.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use glob::Pattern;
use serde_json::{Map, Value};

use super::{ArchiveStore, BulkOp, BulkOutcome, Hit, Query, ScrollPage, ScrollRequest, StoreError};

type Index = BTreeMap<String, Map<String, Value>>;

struct Cursor {
    index: String,
    remaining: VecDeque<String>,
    page_size: usize,
}

/// Archive store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    indices: RefCell<HashMap<String, Index>>,
    cursors: RefCell<HashMap<String, Cursor>>,
    next_cursor: Cell<u64>,
    bulk_calls: RefCell<Vec<usize>>,
    fail_bulk: Cell<bool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document; non-object values are stored as empty documents
    pub fn insert(&self, index: &str, id: &str, doc: Value) {
        let source = match doc {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.indices
            .borrow_mut()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), source);
    }

    /// Fetch a document by ID
    #[must_use]
    pub fn get(&self, index: &str, id: &str) -> Option<Map<String, Value>> {
        self.indices
            .borrow()
            .get(index)
            .and_then(|docs| docs.get(id).cloned())
    }

    /// Number of documents in an index
    #[must_use]
    pub fn len(&self, index: &str) -> usize {
        self.indices.borrow().get(index).map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn is_empty(&self, index: &str) -> bool {
        self.len(index) == 0
    }

    /// Sizes of all bulk requests received so far
    #[must_use]
    pub fn bulk_calls(&self) -> Vec<usize> {
        self.bulk_calls.borrow().clone()
    }

    /// Scroll cursors opened and not yet cleared
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.cursors.borrow().len()
    }

    /// Make every following bulk request fail as a whole
    pub fn fail_bulk_requests(&self, fail: bool) {
        self.fail_bulk.set(fail);
    }

    fn take_page(&self, scroll_id: &str) -> Result<ScrollPage, StoreError> {
        let mut cursors = self.cursors.borrow_mut();
        let cursor = cursors
            .get_mut(scroll_id)
            .ok_or_else(|| StoreError::ScrollNotFound(scroll_id.to_string()))?;
        let indices = self.indices.borrow();
        let docs = indices.get(&cursor.index);

        let mut hits = Vec::new();
        while hits.len() < cursor.page_size {
            let Some(id) = cursor.remaining.pop_front() else {
                break;
            };
            // Documents deleted since the snapshot are skipped
            if let Some(source) = docs.and_then(|d| d.get(&id)) {
                hits.push(Hit {
                    id,
                    source: source.clone(),
                });
            }
        }
        Ok(ScrollPage {
            scroll_id: Some(scroll_id.to_string()),
            hits,
        })
    }
}

/// Whether a stored document satisfies a query
#[must_use]
pub fn matches(query: &Query, source: &Map<String, Value>) -> bool {
    let Some(actual) = source.get(query.field()).and_then(Value::as_str) else {
        return false;
    };
    match query {
        Query::Term { value, .. } => actual == value,
        Query::Wildcard { pattern, .. } => {
            Pattern::new(&escape_brackets(pattern)).is_ok_and(|p| p.matches(actual))
        }
    }
}

// Only `*` and `?` are special in a wildcard query; glob also treats brackets as classes.
fn escape_brackets(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' => escaped.push_str("[[]"),
            ']' => escaped.push_str("[]]"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl ArchiveStore for MemoryStore {
    fn open_scroll(&self, request: &ScrollRequest<'_>) -> Result<ScrollPage, StoreError> {
        let remaining: VecDeque<String> = self
            .indices
            .borrow()
            .get(request.index)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, source)| matches(request.query, source))
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default();

        let n = self.next_cursor.get() + 1;
        self.next_cursor.set(n);
        let scroll_id = format!("cursor-{n}");
        self.cursors.borrow_mut().insert(
            scroll_id.clone(),
            Cursor {
                index: request.index.to_string(),
                remaining,
                page_size: request.page_size.max(1),
            },
        );
        self.take_page(&scroll_id)
    }

    fn next_page(&self, scroll_id: &str, _keep_alive: Duration) -> Result<ScrollPage, StoreError> {
        self.take_page(scroll_id)
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError> {
        self.cursors.borrow_mut().remove(scroll_id);
        Ok(())
    }

    fn bulk(&self, ops: &[BulkOp]) -> Result<BulkOutcome, StoreError> {
        self.bulk_calls.borrow_mut().push(ops.len());
        if self.fail_bulk.get() {
            return Err(StoreError::Status {
                status: 503,
                body: "simulated bulk failure".to_string(),
            });
        }

        let mut indices = self.indices.borrow_mut();
        let mut failed = 0;
        for op in ops {
            match op {
                BulkOp::Update { index, id, doc } => {
                    match indices.get_mut(index).and_then(|docs| docs.get_mut(id)) {
                        Some(stored) => {
                            for (field, value) in doc {
                                stored.insert(field.clone(), value.clone());
                            }
                        }
                        None => failed += 1,
                    }
                }
                BulkOp::Delete { index, id } => {
                    if let Some(docs) = indices.get_mut(index) {
                        docs.remove(id);
                    }
                }
            }
        }
        Ok(BulkOutcome {
            submitted: ops.len(),
            failed,
        })
    }

    fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        self.insert(index, id, doc.clone());
        Ok(())
    }
}
