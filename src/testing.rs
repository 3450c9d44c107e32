//! Testing utilities for listedit
//!
//! Fixture emails, pre-filled in-memory stores, and a shortcut from
//! command-line arguments to a validated request.
//!
//! Only available when compiled with `cfg(test)`.

use clap::Parser;
use serde_json::{Value, json};

use crate::cli::Cli;
use crate::request::MutationRequest;
use crate::store::{Hit, MemoryStore};

/// Archive index used by fixtures
pub const ARCHIVE: &str = "ponymail";

/// Source document of an archived email on `list`
#[must_use]
pub fn email_source(n: usize, list: &str) -> Value {
    json!({
        "mid": format!("<msg{n}@mail.example.org>"),
        "list_raw": list,
        "list": list,
        "private": false,
        "subject": format!("Re: thread {n}"),
        "from": "Jane Doe <jane@example.org>",
        "body": format!("Message {n}. Contact jane@example.org for details."),
        "@version": 1,
        "@import_timestamp": "2016/03/01 12:00:00"
    })
}

/// A scroll hit for a fixture email
///
/// # Panics
/// Never; the fixture source is always an object.
#[must_use]
pub fn message(id: &str, list: &str) -> Hit {
    Hit {
        id: id.to_string(),
        source: email_source(0, list).as_object().cloned().expect("fixture is an object"),
    }
}

/// Store holding `count` emails on `list`, IDs `doc00000`, `doc00001`, ...
#[must_use]
pub fn seeded_store(count: usize, list: &str) -> MemoryStore {
    let store = MemoryStore::new();
    seed(&store, count, list, "doc");
    store
}

/// Add `count` emails on `list` with IDs prefixed by `prefix`
pub fn seed(store: &MemoryStore, count: usize, list: &str, prefix: &str) {
    for n in 0..count {
        store.insert(ARCHIVE, &format!("{prefix}{n:05}"), email_source(n, list));
    }
}

/// Parse and validate arguments as if given on the command line
///
/// # Panics
/// Panics if the arguments do not form a valid request.
#[must_use]
pub fn parse_request(args: &[&str]) -> MutationRequest {
    let cli = Cli::try_parse_from(std::iter::once("listedit").chain(args.iter().copied()))
        .expect("arguments parse");
    MutationRequest::from_cli(&cli).expect("arguments form a valid request")
}
