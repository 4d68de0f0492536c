// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Items Command
//!
//! Shows the current content of the to-do list.

use anyhow::Result;

use crate::config::CliConfig;
use crate::display;

/// Lists the pending items, or all items with `all`.
pub fn list(config: &CliConfig, all: bool) -> Result<()> {
    let mut list = super::open_list(config);

    let items = if all {
        list.fetch_items()?
    } else {
        list.fetch_pending_items()?
    };
    display::display_items(list.entity_id(), &items);

    list.close();
    Ok(())
}
