// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for todo::client

use std::time::Duration;

use serde_json::{json, Value};
use todosync_core::network::*;
use todosync_core::todo::*;

const ENTITY: &str = "todo.shopping_list";

fn request_id(request: &Value) -> u64 {
    request["id"].as_u64().expect("request carries an id")
}

fn items_response(items: Value) -> Value {
    json!({"response": {ENTITY: {"items": items}}})
}

fn client(transport: MockTransport) -> TodoListClient<MockTransport> {
    let policy = ReconnectPolicy::new(3, Duration::from_secs(5)).with_sleeper(RecordingSleep::new());
    let session = Session::with_policy(
        transport,
        Endpoint::new("ws://homeassistant.local:8123/api/websocket", "T"),
        policy,
    );
    TodoListClient::new(session, ENTITY)
}

#[test]
fn test_fetch_pending_items_end_to_end() {
    let transport = MockTransport::new().with_handshake("T").respond_with(|request| {
        vec![MockEvent::result(
            request_id(request),
            items_response(json!([
                {"uid": "a", "summary": "Milk", "status": "needs_action"},
                {"uid": "b", "summary": "Bread", "status": "completed"}
            ])),
        )]
    });
    let mut list = client(transport);

    let items = list.fetch_pending_items().unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].summary, "Milk");
    assert_eq!(items[0].uid, "a");
    assert_eq!(items[0].status, ItemStatus::NeedsAction);

    let transport = list.session().transport();
    assert_eq!(
        transport.sent_frames()[0],
        r#"{"type":"auth","access_token":"T"}"#
    );
    let calls = transport.sent_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["service"], "get_items");
    assert_eq!(calls[0]["service_data"], json!({"entity_id": ENTITY}));
    assert_eq!(calls[0]["return_response"], true);
}

#[test]
fn test_fetch_pending_items_empty_list() {
    let transport = MockTransport::new().with_handshake("T").respond_with(|request| {
        vec![MockEvent::result(request_id(request), items_response(json!([])))]
    });
    let mut list = client(transport);

    assert!(list.fetch_pending_items().unwrap().is_empty());
}

#[test]
fn test_fetch_pending_items_keeps_server_order() {
    let transport = MockTransport::new().with_handshake("T").respond_with(|request| {
        vec![MockEvent::result(
            request_id(request),
            items_response(json!([
                {"uid": "1", "summary": "C", "status": "needs_action"},
                {"uid": "2", "summary": "A", "status": "completed"},
                {"uid": "3", "summary": "B", "status": "needs_action"}
            ])),
        )]
    });
    let mut list = client(transport);

    let summaries: Vec<String> = list
        .fetch_pending_items()
        .unwrap()
        .into_iter()
        .map(|item| item.summary)
        .collect();
    assert_eq!(summaries, vec!["C", "B"]);
}

#[test]
fn test_fetch_items_includes_completed() {
    let transport = MockTransport::new().with_handshake("T").respond_with(|request| {
        vec![MockEvent::result(
            request_id(request),
            items_response(json!([
                {"uid": "1", "summary": "Tea", "status": "needs_action"},
                {"uid": "2", "summary": "Rice", "status": "completed"}
            ])),
        )]
    });
    let mut list = client(transport);

    assert_eq!(list.fetch_items().unwrap().len(), 2);
}

#[test]
fn test_add_item_sends_call() {
    let transport = MockTransport::new()
        .with_handshake("T")
        .respond_with(|request| vec![MockEvent::result(request_id(request), Value::Null)]);
    let mut list = client(transport);

    assert_eq!(list.add_item("Milk").unwrap(), AddOutcome::Added);

    let calls = list.session().transport().sent_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["service"], "add_item");
    assert_eq!(
        calls[0]["service_data"],
        json!({"entity_id": ENTITY, "item": "Milk"})
    );
    assert!(calls[0].get("return_response").is_none());
}

#[test]
fn test_add_empty_item_is_skipped_without_network() {
    let mut list = client(MockTransport::new().with_handshake("T"));

    assert_eq!(list.add_item("").unwrap(), AddOutcome::Skipped);
    assert_eq!(list.add_item("   ").unwrap(), AddOutcome::Skipped);

    let transport = list.session().transport();
    assert_eq!(transport.open_attempts(), 0);
    assert!(transport.sent_frames().is_empty());
}

#[test]
fn test_add_item_rejected_by_server() {
    let transport = MockTransport::new().with_handshake("T").respond_with(|request| {
        vec![MockEvent::failure(
            request_id(request),
            json!({"code": "not_found", "message": "Entity todo.shopping_list not found"}),
        )]
    });
    let mut list = client(transport);

    let err = list.add_item("Milk").unwrap_err();

    assert!(matches!(err, NetworkError::Application(_)));
    assert_eq!(list.session().transport().sent_calls().len(), 1);
}

#[test]
fn test_add_item_retried_once_after_loss() {
    let mut calls = 0;
    let transport = MockTransport::new().with_handshake("T").respond_with(move |request| {
        calls += 1;
        if calls == 1 {
            vec![MockEvent::Error(NetworkError::ConnectionClosed)]
        } else {
            vec![MockEvent::result(request_id(request), Value::Null)]
        }
    });
    let mut list = client(transport);

    assert_eq!(list.add_item("Milk").unwrap(), AddOutcome::Added);

    let calls = list.session().transport().sent_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["service_data"], calls[1]["service_data"]);
}

#[test]
fn test_close_closes_session() {
    let transport = MockTransport::new()
        .with_handshake("T")
        .respond_with(|request| vec![MockEvent::result(request_id(request), Value::Null)]);
    let mut list = client(transport);
    list.add_item("Milk").unwrap();

    list.close();

    assert!(list.session().is_closed());
    assert!(matches!(list.add_item("Eggs"), Err(NetworkError::SessionClosed)));
}
