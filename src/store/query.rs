//! Document selectors and their Elasticsearch query DSL form

use serde_json::{Map, Value, json};

/// Selector for archived documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Exact match on a keyword field
    Term { field: String, value: String },
    /// `*`/`?` pattern match on a keyword field
    Wildcard { field: String, pattern: String },
}

impl Query {
    #[must_use]
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Field the selector matches on
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Term { field, .. } | Self::Wildcard { field, .. } => field,
        }
    }

    /// Render as a `bool.must` query body
    #[must_use]
    pub fn to_json(&self) -> Value {
        let (kind, field, value) = match self {
            Self::Term { field, value } => ("term", field, value),
            Self::Wildcard { field, pattern } => ("wildcard", field, pattern),
        };
        let mut clause = Map::new();
        clause.insert(field.clone(), Value::String(value.clone()));
        let mut leaf = Map::new();
        leaf.insert(kind.to_string(), Value::Object(clause));
        json!({ "bool": { "must": [Value::Object(leaf)] } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_json() {
        let q = Query::term("list_raw", "<dev.example.org>");
        assert_eq!(
            q.to_json(),
            json!({ "bool": { "must": [ { "term": { "list_raw": "<dev.example.org>" } } ] } })
        );
    }

    #[test]
    fn test_wildcard_json() {
        let q = Query::wildcard("list_raw", "<*.example.org>");
        assert_eq!(
            q.to_json(),
            json!({ "bool": { "must": [ { "wildcard": { "list_raw": "<*.example.org>" } } ] } })
        );
        assert_eq!(q.field(), "list_raw");
    }
}
