// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Command
//!
//! Copies missing items from the items file into the to-do list, once or
//! on an interval.

use std::thread;

use anyhow::{bail, Result};
use todosync_core::{JsonFileSource, SyncContext, WebSocketTransport};

use crate::config::CliConfig;
use crate::display;

/// Builds the sync job for the configured list and items file.
fn open_context(config: &CliConfig) -> Result<SyncContext<WebSocketTransport, JsonFileSource>> {
    let Some(items_file) = config.items_file() else {
        bail!(
            "No items file configured. Set 'items_file' in {} or pass --items <FILE>.",
            config.path.display()
        );
    };
    Ok(SyncContext::new(
        super::open_list(config),
        JsonFileSource::new(items_file),
    ))
}

/// Runs a single sync cycle.
pub fn run(config: &CliConfig) -> Result<()> {
    let mut ctx = open_context(config)?;
    let report = ctx.run_once()?;
    display::display_report(&report);
    ctx.close();
    Ok(())
}

/// Runs sync cycles every interval, `cycles` times or forever.
///
/// A failed cycle is reported and the next one runs as scheduled.
pub fn watch(config: &CliConfig, cycles: Option<u64>) -> Result<()> {
    let mut ctx = open_context(config)?;
    let interval = config.sync.sync_interval();
    display::info(&format!(
        "Syncing into {} every {}s",
        ctx.list().entity_id(),
        interval.as_secs()
    ));

    let mut done = 0;
    loop {
        match ctx.run_once() {
            Ok(report) => display::display_report(&report),
            Err(e) => {
                tracing::error!(error = %e, "sync cycle failed");
                display::error(&format!("Sync failed: {}", e));
            }
        }

        done += 1;
        if cycles.is_some_and(|limit| done >= limit) {
            break;
        }
        thread::sleep(interval);
    }

    ctx.close();
    Ok(())
}
