// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Correlation Bookkeeping
//!
//! Allocates correlation ids and tracks in-flight requests for one
//! connection instance.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use tracing::warn;

use super::message::RpcResult;

/// Tracks a request sent but not yet answered.
#[derive(Debug, Clone)]
pub struct PendingCall {
    /// `domain.service` of the request.
    pub method: String,
    /// When the request was recorded.
    pub sent_at: Instant,
}

/// Outcome of routing an inbound result.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The result answers the awaited request.
    Matched(RpcResult),
    /// The result answers another pending request and was set aside.
    Parked,
    /// No pending request has this id; the result was dropped.
    Unmatched,
}

/// Correlation ids and in-flight requests of one connection.
///
/// Ids start at 1 and strictly increase. [`PendingCalls::reset`] restarts
/// numbering for a new connection; results for ids that are no longer
/// pending are never matched.
#[derive(Debug)]
pub struct PendingCalls {
    next_id: u64,
    /// Requests sent but not yet answered: id -> tracking info
    pending: BTreeMap<u64, PendingCall>,
    /// Results that arrived while another request was awaited.
    parked: HashMap<u64, RpcResult>,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCalls {
    /// Creates empty bookkeeping with the counter at 1.
    pub fn new() -> Self {
        PendingCalls {
            next_id: 1,
            pending: BTreeMap::new(),
            parked: HashMap::new(),
        }
    }

    /// Returns the id the next request will get.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Allocates the next id and records the request as pending.
    pub fn register(&mut self, method: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(
            id,
            PendingCall {
                method: method.to_string(),
                sent_at: Instant::now(),
            },
        );
        id
    }

    /// Forgets a request, e.g. after its send failed.
    pub fn remove(&mut self, id: u64) -> Option<PendingCall> {
        self.parked.remove(&id);
        self.pending.remove(&id)
    }

    /// Returns true if the id is awaiting a result.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    /// Returns the number of in-flight requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Takes a result parked earlier for `id`, completing the request.
    pub fn take_parked(&mut self, id: u64) -> Option<RpcResult> {
        let result = self.parked.remove(&id)?;
        self.pending.remove(&id);
        Some(result)
    }

    /// Routes an inbound result while `awaited` is the request being waited on.
    pub fn dispatch(&mut self, awaited: u64, result: RpcResult) -> Dispatch {
        if result.id == awaited && self.pending.remove(&awaited).is_some() {
            return Dispatch::Matched(result);
        }

        if self.pending.contains_key(&result.id) {
            self.parked.insert(result.id, result);
            return Dispatch::Parked;
        }

        warn!(id = result.id, "discarding result with no pending request");
        Dispatch::Unmatched
    }

    /// Fails every pending request after the connection was lost.
    ///
    /// Returns the swept entries in id order.
    pub fn fail_all(&mut self) -> Vec<(u64, PendingCall)> {
        self.parked.clear();
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Clears all state and restarts numbering at 1 for a new connection.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.parked.clear();
        self.next_id = 1;
    }
}
