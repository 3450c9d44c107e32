//! Elasticsearch REST client
//!
//! Blocking `reqwest` client for the handful of endpoints the edit loop
//! uses: `_search?scroll=`, `_search/scroll`, `_bulk` and `_doc/{id}`.
//! Every request runs under the configured [`RetryPolicy`].

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use super::{ArchiveStore, BulkOp, BulkOutcome, Hit, RetryPolicy, ScrollPage, ScrollRequest, StoreError};
use crate::config::ElasticsearchConfig;

/// Elasticsearch-backed archive store
#[derive(Debug, Clone)]
pub struct ElasticStore {
    client: Client,
    base: Url,
    retry: RetryPolicy,
}

impl ElasticStore {
    /// Build a client for the configured host
    ///
    /// # Errors
    /// Returns `StoreError::Url` if host, port and prefix do not form a URL,
    /// or `StoreError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base: config.base_url()?,
            retry: config.retry_policy(),
        })
    }

    /// Base URL every endpoint is resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL for the given path segments, each percent-encoded
    ///
    /// # Errors
    /// Returns `StoreError::Malformed` if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Malformed(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn execute(&self, build: impl Fn() -> RequestBuilder) -> Result<Value, StoreError> {
        self.retry.run(|| read_json(build().send()?))
    }

    fn send_json(&self, method: Method, url: &Url, body: &Value) -> Result<Value, StoreError> {
        self.execute(|| self.client.request(method.clone(), url.clone()).json(body))
    }
}

fn read_json(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let text = response.text()?;
    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Render a keep-alive as an Elasticsearch time unit (`30m`, `45s`)
#[must_use]
pub fn keep_alive_param(keep_alive: Duration) -> String {
    let secs = keep_alive.as_secs().max(1);
    if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Parse a search or scroll response into a page
///
/// # Errors
/// Returns `StoreError::Malformed` if `hits.hits` is missing or a hit has no `_id`.
pub fn parse_page(response: &Value) -> Result<ScrollPage, StoreError> {
    let scroll_id = response
        .get("_scroll_id")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let raw_hits = response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| StoreError::Malformed("response has no hits.hits array".to_string()))?;

    let hits = raw_hits
        .iter()
        .map(|hit| {
            let id = hit
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Malformed("hit without _id".to_string()))?;
            let source = hit
                .get("_source")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Ok(Hit {
                id: id.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(ScrollPage { scroll_id, hits })
}

/// Serialize bulk actions as newline-delimited JSON
///
/// # Errors
/// Returns `StoreError::Json` if an action cannot be serialized.
pub fn bulk_body(ops: &[BulkOp]) -> Result<String, StoreError> {
    let mut body = String::new();
    for op in ops {
        match op {
            BulkOp::Update { index, id, doc } => {
                body.push_str(&serde_json::to_string(
                    &json!({ "update": { "_index": index, "_id": id } }),
                )?);
                body.push('\n');
                body.push_str(&serde_json::to_string(&json!({ "doc": doc }))?);
                body.push('\n');
            }
            BulkOp::Delete { index, id } => {
                body.push_str(&serde_json::to_string(
                    &json!({ "delete": { "_index": index, "_id": id } }),
                )?);
                body.push('\n');
            }
        }
    }
    Ok(body)
}

/// Count failed items in a `_bulk` response
///
/// A delete of a missing document is reported without an `error` and does
/// not count as a failure.
#[must_use]
pub fn bulk_outcome(response: &Value, submitted: usize) -> BulkOutcome {
    let has_errors = response.get("errors").and_then(Value::as_bool).unwrap_or(false);
    let failed = if has_errors {
        response
            .get("items")
            .and_then(Value::as_array)
            .map_or(0, |items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter(|item| item.values().any(|result| result.get("error").is_some()))
                    .count()
            })
    } else {
        0
    };
    BulkOutcome { submitted, failed }
}

impl ArchiveStore for ElasticStore {
    fn open_scroll(&self, request: &ScrollRequest<'_>) -> Result<ScrollPage, StoreError> {
        let mut url = self.endpoint(&[request.index, "_search"])?;
        url.query_pairs_mut()
            .append_pair("scroll", &keep_alive_param(request.keep_alive));
        let body = json!({
            "size": request.page_size,
            "query": request.query.to_json(),
        });
        debug!(%url, %body, "Opening scroll");
        let response = self.send_json(Method::POST, &url, &body)?;
        parse_page(&response)
    }

    fn next_page(&self, scroll_id: &str, keep_alive: Duration) -> Result<ScrollPage, StoreError> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let body = json!({
            "scroll": keep_alive_param(keep_alive),
            "scroll_id": scroll_id,
        });
        match self.send_json(Method::POST, &url, &body) {
            Ok(response) => parse_page(&response),
            Err(StoreError::Status { status: 404, .. }) => {
                Err(StoreError::ScrollNotFound(scroll_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn clear_scroll(&self, scroll_id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&["_search", "scroll"])?;
        let body = json!({ "scroll_id": [scroll_id] });
        match self.send_json(Method::DELETE, &url, &body) {
            Ok(_) | Err(StoreError::Status { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn bulk(&self, ops: &[BulkOp]) -> Result<BulkOutcome, StoreError> {
        if ops.is_empty() {
            return Ok(BulkOutcome::default());
        }
        let url = self.endpoint(&["_bulk"])?;
        let body = bulk_body(ops)?;
        let response = self.execute(|| {
            self.client
                .post(url.clone())
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(body.clone())
        })?;
        Ok(bulk_outcome(&response, ops.len()))
    }

    fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<(), StoreError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        debug!(%url, "Writing document");
        self.send_json(Method::PUT, &url, doc)?;
        Ok(())
    }
}
