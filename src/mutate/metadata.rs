//! List description upsert

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::request::ListId;
use crate::store::{ArchiveStore, StoreError};

/// Descriptive document for one mailing list, keyed by list ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMetadata {
    pub list: String,
    pub name: String,
    pub description: String,
}

impl ListMetadata {
    #[must_use]
    pub fn new(list: &ListId, description: &str) -> Self {
        Self {
            list: list.to_string(),
            name: list.to_string(),
            description: description.to_string(),
        }
    }
}

/// Create or replace the description document of `list`
///
/// Nothing is written in a dry run.
///
/// # Errors
/// Returns `StoreError` if the document cannot be serialized or written.
pub fn upsert_description<S: ArchiveStore + ?Sized>(
    store: &S,
    index: &str,
    list: &ListId,
    description: &str,
    dry_run: bool,
) -> Result<(), StoreError> {
    if dry_run {
        println!("Would set description of {list} to {description:?}");
        return Ok(());
    }
    let doc = serde_json::to_value(ListMetadata::new(list, description))?;
    store.put_document(index, list.as_str(), &doc)?;
    info!(%list, "List description updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_upsert_creates_document() {
        let store = MemoryStore::new();
        let list = ListId::normalize("dev@example.org", true);
        upsert_description(&store, "lists", &list, "Developer list", false).unwrap();
        let doc = store.get("lists", "<dev.example.org>").unwrap();
        assert_eq!(
            serde_json::Value::Object(doc),
            json!({
                "list": "<dev.example.org>",
                "name": "<dev.example.org>",
                "description": "Developer list"
            })
        );
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let list = ListId::normalize("dev@example.org", true);
        upsert_description(&store, "lists", &list, "Old", false).unwrap();
        upsert_description(&store, "lists", &list, "New", false).unwrap();
        let first = store.get("lists", list.as_str()).unwrap();
        upsert_description(&store, "lists", &list, "New", false).unwrap();
        assert_eq!(store.get("lists", list.as_str()).unwrap(), first);
        assert_eq!(store.len("lists"), 1);
        assert_eq!(first["description"], json!("New"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let store = MemoryStore::new();
        let list = ListId::normalize("dev@example.org", true);
        upsert_description(&store, "lists", &list, "Developer list", true).unwrap();
        assert!(store.is_empty("lists"));
    }
}
