// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! To-do List Client
//!
//! Reads and extends one Home Assistant to-do entity through a [`Session`].

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::network::{ServiceCall, Session, SessionResult, Transport};

use super::types::{AddOutcome, TodoItem};

const TODO_DOMAIN: &str = "todo";

/// Client for one to-do list entity.
///
/// # Example
///
/// ```ignore
/// use todosync_core::todo::TodoListClient;
///
/// let mut list = TodoListClient::new(session, "todo.shopping_list");
/// for item in list.fetch_pending_items()? {
///     println!("{}", item.summary);
/// }
/// list.add_item("Milk")?;
/// ```
pub struct TodoListClient<T: Transport> {
    session: Session<T>,
    entity_id: String,
}

impl<T: Transport> TodoListClient<T> {
    /// Creates a client for `entity_id`. The id is passed through as is.
    pub fn new(session: Session<T>, entity_id: impl Into<String>) -> Self {
        TodoListClient {
            session,
            entity_id: entity_id.into(),
        }
    }

    /// Returns the target entity id.
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Returns a reference to the session.
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Closes the underlying session.
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Fetches every item of the list, in server order.
    pub fn fetch_items(&mut self) -> SessionResult<Vec<TodoItem>> {
        let call = ServiceCall::new(TODO_DOMAIN, "get_items")
            .with_data(json!({ "entity_id": self.entity_id }))
            .returning_response();

        let result = self.session.call(&call)?;
        let items = parse_items(&result, &self.entity_id);
        debug!(entity_id = %self.entity_id, count = items.len(), "fetched to-do items");
        Ok(items)
    }

    /// Fetches the items that still need action, in server order.
    ///
    /// Returns an empty list when the to-do list is empty.
    pub fn fetch_pending_items(&mut self) -> SessionResult<Vec<TodoItem>> {
        Ok(self
            .fetch_items()?
            .into_iter()
            .filter(TodoItem::is_pending)
            .collect())
    }

    /// Adds an item to the list.
    ///
    /// Empty or whitespace-only text is skipped without touching the network.
    pub fn add_item(&mut self, summary: &str) -> SessionResult<AddOutcome> {
        if summary.trim().is_empty() {
            debug!("skipping empty to-do item");
            return Ok(AddOutcome::Skipped);
        }

        let call = ServiceCall::new(TODO_DOMAIN, "add_item").with_data(json!({
            "entity_id": self.entity_id,
            "item": summary,
        }));

        self.session.call(&call)?;
        info!(entity_id = %self.entity_id, item = summary, "added to-do item");
        Ok(AddOutcome::Added)
    }
}

/// Extracts `response.<entity_id>.items` from a `get_items` result.
fn parse_items(result: &Value, entity_id: &str) -> Vec<TodoItem> {
    let Some(items) = result
        .get("response")
        .and_then(|response| response.get(entity_id))
        .and_then(|entity| entity.get("items"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<TodoItem>(item.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping malformed to-do item");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::types::ItemStatus;

    #[test]
    fn test_parse_items_reads_entity_items() {
        let result = json!({
            "response": {
                "todo.shopping_list": {
                    "items": [
                        {"uid": "1", "summary": "Milk", "status": "needs_action"},
                        {"uid": "2", "summary": "Bread", "status": "completed"}
                    ]
                }
            }
        });

        let items = parse_items(&result, "todo.shopping_list");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].status, ItemStatus::Completed);
    }

    #[test]
    fn test_parse_items_missing_path_is_empty() {
        assert!(parse_items(&Value::Null, "todo.shopping_list").is_empty());
        assert!(parse_items(&json!({"response": {}}), "todo.shopping_list").is_empty());
        assert!(parse_items(
            &json!({"response": {"todo.other": {"items": [{"summary": "x"}]}}}),
            "todo.shopping_list"
        )
        .is_empty());
    }

    #[test]
    fn test_parse_items_skips_malformed_entries() {
        let result = json!({
            "response": {"todo.shopping_list": {"items": [{"uid": "1"}, {"summary": "Tea"}]}}
        });
        let items = parse_items(&result, "todo.shopping_list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].summary, "Tea");
    }
}
