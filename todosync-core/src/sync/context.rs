// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Context
//!
//! Owns the to-do client and the item source of one sync job and runs
//! sync cycles against them.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::network::{NetworkError, RemoteError, Transport};
use crate::todo::{AddOutcome, TodoItem, TodoListClient};

use super::source::ItemSource;
use super::SyncError;

/// An item the server refused to add.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Item text as sent.
    pub item: String,
    /// Error payload returned by the server.
    pub error: RemoteError,
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Items read from the source.
    pub fetched: usize,
    /// Source items already on the list (or repeated in the source).
    pub already_present: usize,
    /// Items added to the list.
    pub added: usize,
    /// Blank source items.
    pub skipped: usize,
    /// Items the server rejected.
    pub failed: Vec<ItemFailure>,
}

impl SyncReport {
    /// Returns true if every missing item was added.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Items to add, as decided by [`missing_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Item texts to add, trimmed, in source order.
    pub to_add: Vec<String>,
    /// Source items that need no add.
    pub already_present: usize,
    /// Blank source items.
    pub skipped: usize,
}

fn match_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Decides which source items are missing from the pending list.
///
/// Matching is case-insensitive and ignores surrounding whitespace. An item
/// repeated in the source is added once.
pub fn missing_items(source: &[String], pending: &[TodoItem]) -> SyncPlan {
    let mut seen: HashSet<String> = pending.iter().map(|item| match_key(&item.summary)).collect();
    let mut plan = SyncPlan::default();

    for item in source {
        let key = match_key(item);
        if key.is_empty() {
            plan.skipped += 1;
        } else if seen.insert(key) {
            plan.to_add.push(item.trim().to_string());
        } else {
            plan.already_present += 1;
        }
    }

    plan
}

/// One sync job: a to-do list, the source feeding it, and the session
/// between them.
///
/// The session stays open across cycles and is closed by
/// [`SyncContext::close`] or when the context is dropped.
///
/// # Example
///
/// ```ignore
/// use todosync_core::sync::{JsonFileSource, SyncContext};
///
/// let mut ctx = SyncContext::new(list, JsonFileSource::new("items.json"));
/// let report = ctx.run_once()?;
/// println!("added {}", report.added);
/// ctx.close();
/// ```
pub struct SyncContext<T: Transport, S: ItemSource> {
    list: TodoListClient<T>,
    source: S,
    cycles: u64,
}

impl<T: Transport, S: ItemSource> SyncContext<T, S> {
    /// Creates a sync job.
    pub fn new(list: TodoListClient<T>, source: S) -> Self {
        SyncContext {
            list,
            source,
            cycles: 0,
        }
    }

    /// Returns the to-do client.
    pub fn list(&self) -> &TodoListClient<T> {
        &self.list
    }

    /// Returns the to-do client mutably.
    pub fn list_mut(&mut self) -> &mut TodoListClient<T> {
        &mut self.list
    }

    /// Returns the item source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs one sync cycle.
    ///
    /// A rejected item is recorded in the report and the cycle moves on;
    /// any other failure aborts the cycle.
    pub fn run_once(&mut self) -> Result<SyncReport, SyncError> {
        let source_items = self.source.fetch_items()?;
        let pending = self.list.fetch_pending_items()?;
        let plan = missing_items(&source_items, &pending);
        debug!(
            fetched = source_items.len(),
            pending = pending.len(),
            missing = plan.to_add.len(),
            "sync plan"
        );

        let mut report = SyncReport {
            fetched: source_items.len(),
            already_present: plan.already_present,
            skipped: plan.skipped,
            ..SyncReport::default()
        };

        for item in plan.to_add {
            match self.list.add_item(&item) {
                Ok(AddOutcome::Added) => report.added += 1,
                Ok(AddOutcome::Skipped) => report.skipped += 1,
                Err(NetworkError::Application(error)) => {
                    warn!(%item, %error, "item rejected");
                    report.failed.push(ItemFailure { item, error });
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.cycles += 1;
        info!(
            entity_id = self.list.entity_id(),
            fetched = report.fetched,
            added = report.added,
            already_present = report.already_present,
            failed = report.failed.len(),
            "sync cycle finished"
        );
        Ok(report)
    }

    /// Closes the session. Later cycles fail.
    pub fn close(&mut self) {
        self.list.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::ItemStatus;

    fn pending(summary: &str) -> TodoItem {
        TodoItem {
            uid: String::new(),
            summary: summary.into(),
            status: ItemStatus::NeedsAction,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_items_is_case_insensitive() {
        let plan = missing_items(&strings(&["Milk", "bread", "Eggs"]), &[pending("milk"), pending("BREAD")]);
        assert_eq!(plan.to_add, vec!["Eggs"]);
        assert_eq!(plan.already_present, 2);
    }

    #[test]
    fn test_missing_items_deduplicates_source() {
        let plan = missing_items(&strings(&["Tea", "tea ", "TEA"]), &[]);
        assert_eq!(plan.to_add, vec!["Tea"]);
        assert_eq!(plan.already_present, 2);
    }

    #[test]
    fn test_missing_items_counts_blank_as_skipped() {
        let plan = missing_items(&strings(&["", "  ", "Rice"]), &[]);
        assert_eq!(plan.to_add, vec!["Rice"]);
        assert_eq!(plan.skipped, 2);
    }

    #[test]
    fn test_missing_items_keeps_source_order() {
        let plan = missing_items(&strings(&["c", "a", "b"]), &[]);
        assert_eq!(plan.to_add, vec!["c", "a", "b"]);
    }
}
