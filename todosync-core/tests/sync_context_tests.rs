// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for sync::context and sync::source

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::NamedTempFile;
use todosync_core::network::*;
use todosync_core::sync::*;
use todosync_core::todo::TodoListClient;

const ENTITY: &str = "todo.shopping_list";

/// Tiny in-memory to-do list behind the mock transport.
fn fake_server(
    initial: &[(&str, &str)],
    reject: Option<&'static str>,
) -> (MockTransport, Arc<Mutex<Vec<Value>>>) {
    let items: Vec<Value> = initial
        .iter()
        .enumerate()
        .map(|(i, (summary, status))| json!({"uid": i.to_string(), "summary": summary, "status": status}))
        .collect();
    let list = Arc::new(Mutex::new(items));
    let server_list = Arc::clone(&list);

    let transport = MockTransport::new().with_handshake("T").respond_with(move |request| {
        let id = request["id"].as_u64().unwrap_or_default();
        let mut items = server_list.lock().unwrap();
        match request["service"].as_str() {
            Some("get_items") => vec![MockEvent::result(
                id,
                json!({"response": {ENTITY: {"items": items.clone()}}}),
            )],
            Some("add_item") => {
                let summary = request["service_data"]["item"].as_str().unwrap_or_default();
                if Some(summary) == reject {
                    return vec![MockEvent::failure(
                        id,
                        json!({"code": "invalid_format", "message": "rejected"}),
                    )];
                }
                let next_index = items.len();
                items.push(json!({"uid": format!("n{}", next_index), "summary": summary, "status": "needs_action"}));
                vec![MockEvent::result(id, Value::Null)]
            }
            _ => vec![MockEvent::failure(id, json!({"code": "unknown_service"}))],
        }
    });
    (transport, list)
}

fn context<S: ItemSource>(transport: MockTransport, source: S) -> SyncContext<MockTransport, S> {
    let policy = ReconnectPolicy::new(3, Duration::from_secs(5)).with_sleeper(RecordingSleep::new());
    let session = Session::with_policy(
        transport,
        Endpoint::new("ws://homeassistant.local:8123/api/websocket", "T"),
        policy,
    );
    SyncContext::new(TodoListClient::new(session, ENTITY), source)
}

#[test]
fn test_sync_adds_only_missing_items() {
    let (transport, list) = fake_server(&[("Milk", "needs_action"), ("Bread", "completed")], None);
    let mut ctx = context(transport, StaticSource::new(["milk", "Bread", "Eggs", ""]));

    let report = ctx.run_once().unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(report.already_present, 1);
    // Completed items do not count as present.
    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.is_clean());

    let summaries: Vec<String> = list
        .lock()
        .unwrap()
        .iter()
        .map(|item| item["summary"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(summaries, vec!["Milk", "Bread", "Bread", "Eggs"]);
}

#[test]
fn test_sync_second_cycle_adds_nothing() {
    let (transport, _) = fake_server(&[], None);
    let mut ctx = context(transport, StaticSource::new(["Tea", "Rice"]));

    assert_eq!(ctx.run_once().unwrap().added, 2);
    let second = ctx.run_once().unwrap();

    assert_eq!(second.added, 0);
    assert_eq!(second.already_present, 2);
    assert_eq!(ctx.cycles(), 2);
    // One session for both cycles.
    assert_eq!(ctx.list().session().transport().open_count(), 1);
}

#[test]
fn test_sync_records_rejected_item_and_continues() {
    let (transport, _) = fake_server(&[], Some("Bad"));
    let mut ctx = context(transport, StaticSource::new(["Bad", "Good"]));

    let report = ctx.run_once().unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item, "Bad");
    assert_eq!(report.failed[0].error.code(), Some("invalid_format"));
}

#[test]
fn test_sync_aborts_on_connection_failure() {
    let mut transport = MockTransport::new().with_handshake("T");
    for _ in 0..3 {
        transport.fail_next_open(NetworkError::ConnectionFailed("refused".into()));
    }
    let mut ctx = context(transport, StaticSource::new(["Tea"]));

    let err = ctx.run_once().unwrap_err();

    assert!(matches!(err, SyncError::Network(NetworkError::ConnectionFailed(_))));
    assert_eq!(ctx.cycles(), 0);
}

#[test]
fn test_sync_source_failure_skips_network() {
    let (transport, _) = fake_server(&[], None);
    let mut ctx = context(transport, JsonFileSource::new("/nonexistent/items.json"));

    let err = ctx.run_once().unwrap_err();

    assert!(matches!(err, SyncError::Source(SourceError::Io { .. })));
    assert_eq!(ctx.list().session().transport().open_attempts(), 0);
}

#[test]
fn test_sync_close_pairs_connections() {
    let (transport, _) = fake_server(&[], None);
    let mut ctx = context(transport, StaticSource::new(["Tea"]));
    ctx.run_once().unwrap();

    ctx.close();

    let transport = ctx.list().session().transport();
    assert_eq!(transport.close_count(), transport.open_count());
    assert!(matches!(
        ctx.run_once(),
        Err(SyncError::Network(NetworkError::SessionClosed))
    ));
}

#[test]
fn test_json_file_source_reads_array() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"["Milk", "Eggs"]"#).unwrap();

    let mut source = JsonFileSource::new(file.path());

    assert_eq!(source.fetch_items().unwrap(), vec!["Milk", "Eggs"]);
}

#[test]
fn test_json_file_source_reads_wrapped_items() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"items": ["Tea"], "scraped_at": "2026-01-01"}}"#).unwrap();

    let mut source = JsonFileSource::new(file.path());

    assert_eq!(source.fetch_items().unwrap(), vec!["Tea"]);
}

#[test]
fn test_json_file_source_rejects_malformed_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"things": 1}}"#).unwrap();

    let mut source = JsonFileSource::new(file.path());

    assert!(matches!(
        source.fetch_items(),
        Err(SourceError::Parse { .. })
    ));
}

/// Source standing in for an unreachable scraper.
struct OfflineSource;

impl ItemSource for OfflineSource {
    fn fetch_items(&mut self) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Unavailable("scraper offline".into()))
    }
}

#[test]
fn test_sync_unavailable_source_aborts_cycle() {
    let (transport, _) = fake_server(&[], None);
    let mut ctx = context(transport, OfflineSource);

    let err = ctx.run_once().unwrap_err();

    assert!(matches!(err, SyncError::Source(SourceError::Unavailable(_))));
    assert_eq!(ctx.cycles(), 0);
    assert!(ctx.list().session().transport().sent_calls().is_empty());
}
