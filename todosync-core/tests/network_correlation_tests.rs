// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::correlation
//! Property tests over arbitrary arrival orders.

use proptest::prelude::*;
use serde_json::json;
use todosync_core::network::{Dispatch, PendingCalls, RpcResult};

fn result_for(id: u64) -> RpcResult {
    RpcResult {
        id,
        success: true,
        result: Some(json!({ "for": id })),
        error: None,
    }
}

/// Awaits `id` against the inbound stream, like a session does.
fn await_id(pending: &mut PendingCalls, id: u64, stream: &mut Vec<RpcResult>) -> Option<RpcResult> {
    if let Some(parked) = pending.take_parked(id) {
        return Some(parked);
    }
    while !stream.is_empty() {
        let next = stream.remove(0);
        if let Dispatch::Matched(result) = pending.dispatch(id, next) {
            return Some(result);
        }
    }
    None
}

/// Request count, shuffled arrival order of their results, and noise ids.
fn arrival_strategy() -> impl Strategy<Value = (u64, Vec<u64>, Vec<u64>)> {
    (1u64..10).prop_flat_map(|n| {
        (
            Just(n),
            Just((1..=n).collect::<Vec<u64>>()).prop_shuffle(),
            prop::collection::vec(100u64..200, 0..6),
        )
    })
}

proptest! {
    /// Property: every request gets exactly its own result, whatever the order
    #[test]
    fn prop_results_match_by_id((n, order, noise) in arrival_strategy()) {
        let mut pending = PendingCalls::new();
        for _ in 0..n {
            pending.register("todo.get_items");
        }

        let mut stream: Vec<RpcResult> = Vec::new();
        let mut noise = noise.into_iter();
        for id in order {
            if let Some(stray) = noise.next() {
                stream.push(result_for(stray));
            }
            stream.push(result_for(id));
        }
        stream.extend(noise.map(result_for));

        for id in 1..=n {
            let matched = await_id(&mut pending, id, &mut stream);
            prop_assert_eq!(matched.map(|r| r.id), Some(id));
        }
        prop_assert!(pending.is_empty());
    }

    /// Property: ids are handed out consecutively from 1 after every reset
    #[test]
    fn prop_ids_restart_after_reset(first in 0usize..20, second in 1usize..20) {
        let mut pending = PendingCalls::new();
        for _ in 0..first {
            pending.register("todo.add_item");
        }
        pending.reset();

        let ids: Vec<u64> = (0..second).map(|_| pending.register("todo.add_item")).collect();
        let expected: Vec<u64> = (1..=second as u64).collect();
        prop_assert_eq!(ids, expected);
    }
}

#[test]
fn test_unmatched_result_is_discarded() {
    let mut pending = PendingCalls::new();
    let id = pending.register("todo.get_items");

    assert_eq!(pending.dispatch(id, result_for(42)), Dispatch::Unmatched);
    assert!(pending.is_pending(id));
}

#[test]
fn test_sweep_fails_everything_in_id_order() {
    let mut pending = PendingCalls::new();
    pending.register("todo.get_items");
    pending.register("todo.add_item");
    pending.dispatch(1, result_for(2));

    let swept: Vec<u64> = pending.fail_all().into_iter().map(|(id, _)| id).collect();

    assert_eq!(swept, vec![1, 2]);
    assert!(pending.is_empty());
    assert!(pending.take_parked(2).is_none());
}
