// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! To-do list item types.

use serde::{Deserialize, Serialize};

/// Completion status of a to-do item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Still open.
    NeedsAction,
    /// Checked off.
    Completed,
    /// Any status this client does not know.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One item of a Home Assistant to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Stable identifier assigned by Home Assistant.
    #[serde(default)]
    pub uid: String,
    /// Display text.
    pub summary: String,
    /// Completion status.
    #[serde(default)]
    pub status: ItemStatus,
}

impl TodoItem {
    /// Returns true if the item still needs action.
    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::NeedsAction
    }
}

/// Result of adding an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The server accepted the item.
    Added,
    /// Nothing was sent because the text was empty.
    Skipped,
}
