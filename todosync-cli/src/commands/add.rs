// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Add Command

use anyhow::Result;
use todosync_core::AddOutcome;

use crate::config::CliConfig;
use crate::display;

/// Adds one item to the to-do list.
pub fn run(config: &CliConfig, text: &str) -> Result<()> {
    let mut list = super::open_list(config);

    match list.add_item(text)? {
        AddOutcome::Added => display::success(&format!("Added '{}' to {}", text.trim(), list.entity_id())),
        AddOutcome::Skipped => display::warning("Nothing to add: item text is empty"),
    }

    list.close();
    Ok(())
}
