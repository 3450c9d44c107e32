//! Per-document changes
//!
//! A [`DocumentMutation`] holds the changes requested for every matched
//! email and turns one [`Hit`] into at most one [`BulkOp`].

use serde_json::{Map, Value};

use super::REDACTION_PLACEHOLDER;
use crate::request::{ListId, MutationRequest, Visibility};
use crate::store::{BulkOp, Hit, fields};

/// Fields scanned for redaction
pub const REDACTED_FIELDS: [&str; 3] = [fields::BODY, fields::SUBJECT, fields::FROM];

/// Changes applied to each matched email
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentMutation {
    pub target: Option<ListId>,
    pub visibility: Option<Visibility>,
    pub delete: bool,
    pub redact: Option<String>,
}

impl From<&MutationRequest> for DocumentMutation {
    fn from(request: &MutationRequest) -> Self {
        Self {
            target: request.target.clone(),
            visibility: request.visibility,
            delete: request.delete,
            redact: request.redact.clone(),
        }
    }
}

impl DocumentMutation {
    /// Whether nothing would change in any document
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.target.is_none() && self.visibility.is_none() && !self.delete && self.redact.is_none()
    }

    /// Partial document with only the fields this mutation changes
    ///
    /// Redaction reads the hit's current values: a field is included only if
    /// it is a string containing the redacted text.
    #[must_use]
    pub fn patch(&self, hit: &Hit) -> Map<String, Value> {
        let mut doc = Map::new();

        if let Some(needle) = self.redact.as_deref().filter(|n| !n.is_empty()) {
            for field in REDACTED_FIELDS {
                if let Some(value) = hit.field_str(field)
                    && value.contains(needle)
                {
                    doc.insert(
                        field.to_string(),
                        Value::String(value.replace(needle, REDACTION_PLACEHOLDER)),
                    );
                }
            }
        }

        if let Some(target) = &self.target {
            doc.insert(fields::LIST_RAW.to_string(), Value::String(target.to_string()));
            doc.insert(fields::LIST.to_string(), Value::String(target.to_string()));
        }

        if let Some(visibility) = self.visibility {
            doc.insert(
                fields::PRIVATE.to_string(),
                Value::Bool(visibility.is_private()),
            );
        }

        doc
    }

    /// Bulk action for one hit, or `None` when nothing changes
    ///
    /// Deletion wins over any field change.
    #[must_use]
    pub fn plan(&self, index: &str, hit: &Hit) -> Option<BulkOp> {
        if self.delete {
            return Some(BulkOp::Delete {
                index: index.to_string(),
                id: hit.id.clone(),
            });
        }
        let doc = self.patch(hit);
        if doc.is_empty() {
            return None;
        }
        Some(BulkOp::Update {
            index: index.to_string(),
            id: hit.id.clone(),
            doc,
        })
    }
}
