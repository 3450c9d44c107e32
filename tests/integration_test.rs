//! Integration tests for listedit
//!
//! These tests drive the complete flow (argument parsing, validation,
//! description upsert, scroll/bulk loop) against an in-memory store.

use std::io::Write;

use clap::Parser;
use serde_json::{Value, json};
use listedit::{
    cli::Cli,
    config::{ArchiveConfig, IndexNames},
    mutate,
    output::plan_lines,
    request::{MutationRequest, RequestError},
    store::{ElasticStore, MemoryStore},
};

const ARCHIVE: &str = "ponymail";
const LISTS: &str = "ponymail-lists";

/// Helper to parse arguments like the binary does
fn request(args: &[&str]) -> Result<MutationRequest, RequestError> {
    let cli = Cli::try_parse_from(std::iter::once("listedit").chain(args.iter().copied())).unwrap();
    MutationRequest::from_cli(&cli)
}

fn indices() -> IndexNames {
    IndexNames {
        archive: ARCHIVE.to_string(),
        lists: LISTS.to_string(),
    }
}

/// Helper to create a store with `count` emails on `list`
fn setup_store(count: usize, list: &str) -> MemoryStore {
    let store = MemoryStore::new();
    add_emails(&store, count, list, "m");
    store
}

fn add_emails(store: &MemoryStore, count: usize, list: &str, prefix: &str) {
    for n in 0..count {
        store.insert(
            ARCHIVE,
            &format!("{prefix}{n}"),
            json!({
                "mid": format!("<{prefix}{n}@example.org>"),
                "list_raw": list,
                "list": list,
                "private": false,
                "subject": "Weekly report",
                "from": "bot@example.org",
                "body": format!("Report {n} for {list}"),
                "@version": 1,
                "@import_timestamp": "2016/03/01 12:00:00"
            }),
        );
    }
}

#[test]
fn test_usage_errors() {
    assert_eq!(request(&["--delete"]), Err(RequestError::MissingSource));
    assert_eq!(request(&["--source", "a@b.org"]), Err(RequestError::NothingToDo));
    assert_eq!(
        request(&["--source", "a@b.org", "--public", "--private"]),
        Err(RequestError::ConflictingVisibility)
    );
}

#[test]
fn test_usage_error_touches_nothing() {
    let store = setup_store(10, "<a.b.org>");
    assert!(request(&["--source", "a@b.org", "--public", "--private"]).is_err());
    assert!(store.bulk_calls().is_empty());
    assert_eq!(store.len(ARCHIVE), 10);
}

#[test]
fn test_rename_make_private_and_describe() {
    let store = setup_store(1234, "<dev.old.example.org>");
    add_emails(&store, 7, "<users.old.example.org>", "u");
    let req = request(&[
        "--source",
        "dev@old.example.org",
        "--rename",
        "dev@new.example.org",
        "--private",
        "--desc",
        "Developers",
    ])
    .unwrap();

    let summary = mutate::run(&store, &indices(), &req).unwrap();

    assert_eq!(summary.processed, 1234);
    assert_eq!(summary.updated, 1234);
    assert_eq!(store.bulk_calls(), vec![500, 500, 234]);
    assert!(summary.is_clean());

    for n in 0..1234 {
        let doc = store.get(ARCHIVE, &format!("m{n}")).unwrap();
        assert_eq!(doc["list_raw"], json!("<dev.new.example.org>"));
        assert_eq!(doc["list"], json!("<dev.new.example.org>"));
        assert_eq!(doc["private"], json!(true));
        assert_eq!(doc["@version"], json!(1));
        assert_eq!(doc["body"], json!(format!("Report {n} for <dev.old.example.org>")));
    }
    let untouched = store.get(ARCHIVE, "u0").unwrap();
    assert_eq!(untouched["list_raw"], json!("<users.old.example.org>"));
    assert_eq!(untouched["private"], json!(false));

    let meta = store.get(LISTS, "<dev.new.example.org>").unwrap();
    assert_eq!(
        Value::Object(meta),
        json!({
            "list": "<dev.new.example.org>",
            "name": "<dev.new.example.org>",
            "description": "Developers"
        })
    );
}

#[test]
fn test_rerun_is_idempotent_for_rename_and_visibility() {
    let store = setup_store(40, "<a.b.org>");
    let req = request(&["--source", "a@b.org", "--private", "--desc", "A"]).unwrap();

    mutate::run(&store, &indices(), &req).unwrap();
    let first: Vec<_> = (0..40).map(|n| store.get(ARCHIVE, &format!("m{n}"))).collect();
    let first_meta = store.get(LISTS, "<a.b.org>");
    mutate::run(&store, &indices(), &req).unwrap();
    let second: Vec<_> = (0..40).map(|n| store.get(ARCHIVE, &format!("m{n}"))).collect();

    assert_eq!(first, second);
    assert_eq!(first_meta, store.get(LISTS, "<a.b.org>"));
}

#[test]
fn test_delete_by_message_id() {
    let store = setup_store(25, "<a.b.org>");
    let req = request(&["--mid", "<m12@example.org>", "--delete"]).unwrap();

    let summary = mutate::run(&store, &indices(), &req).unwrap();

    assert_eq!(summary.processed, 1);
    assert!(store.get(ARCHIVE, "m12").is_none());
    assert_eq!(store.len(ARCHIVE), 24);
}

#[test]
fn test_dry_run_matches_real_count() {
    let dry_store = setup_store(777, "<a.b.org>");
    let real_store = setup_store(777, "<a.b.org>");
    let dry = request(&["--source", "a@b.org", "--delete", "--desc", "gone", "--test"]).unwrap();
    let real = request(&["--source", "a@b.org", "--delete", "--desc", "gone"]).unwrap();

    let dry_summary = mutate::run(&dry_store, &indices(), &dry).unwrap();
    let real_summary = mutate::run(&real_store, &indices(), &real).unwrap();

    assert_eq!(dry_summary.processed, 777);
    assert_eq!(dry_summary.processed, real_summary.processed);
    assert_eq!(dry_store.len(ARCHIVE), 777);
    assert!(dry_store.is_empty(LISTS));
    assert!(real_store.is_empty(ARCHIVE));
    assert_eq!(real_store.len(LISTS), 1);
}

#[test]
fn test_notag_lists() {
    let store = setup_store(5, "a.b.org");
    add_emails(&store, 5, "<a.b.org>", "t");
    let req = request(&["--source", "a@b.org", "--notag", "--public", "--rename", "c@b.org"]).unwrap();

    let summary = mutate::run(&store, &indices(), &req).unwrap();

    assert_eq!(summary.processed, 5);
    assert_eq!(store.get(ARCHIVE, "m0").unwrap()["list"], json!("c.b.org"));
    assert_eq!(store.get(ARCHIVE, "t0").unwrap()["list"], json!("<a.b.org>"));
}

#[test]
fn test_plan_banner() {
    let req = request(&["--source", "a@b.org", "--private", "--test"]).unwrap();
    let lines = plan_lines(&req);
    assert_eq!(lines[0], "Beginning list edit:");
    assert!(lines.iter().any(|l| l == "  - Action: Mark all emails private"));
}

#[test]
fn test_config_file_builds_client() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[elasticsearch]\nhostname = localhost\nport = 9201\ndbname = ponymail\nuri = es\n")
        .unwrap();

    let config = ArchiveConfig::load(file.path()).unwrap();
    let store = ElasticStore::new(&config.elasticsearch).unwrap();

    assert_eq!(store.base_url().as_str(), "http://localhost:9201/es/");
    assert_eq!(config.elasticsearch.indices().lists, "ponymail");
}
