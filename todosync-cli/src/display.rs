// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Display Helpers
//!
//! Terminal output formatting and styling.

use console::style;
use todosync_core::{ItemStatus, SyncReport, TodoItem};

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Returns the checkbox shown for a status.
fn status_mark(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::NeedsAction => "[ ]",
        ItemStatus::Completed => "[x]",
        ItemStatus::Unknown => "[?]",
    }
}

/// Displays to-do items, one per line.
pub fn display_items(entity_id: &str, items: &[TodoItem]) {
    println!();
    println!("  {} ({})", style(entity_id).bold().cyan(), items.len());
    println!("{}", "─".repeat(40));

    if items.is_empty() {
        println!("  {}", style("(empty)").dim());
    } else {
        for item in items {
            let line = format!("  {} {}", status_mark(item.status), item.summary);
            if item.is_pending() {
                println!("{}", line);
            } else {
                println!("{}", style(line).dim());
            }
        }
    }

    println!();
}

/// Summarizes one sync cycle.
pub fn display_report(report: &SyncReport) {
    let summary = format!(
        "Sync finished: {} fetched, {} added, {} already present, {} skipped",
        report.fetched, report.added, report.already_present, report.skipped
    );
    if report.is_clean() {
        success(&summary);
    } else {
        warning(&summary);
        for failure in &report.failed {
            error(&format!("Not added: {} ({})", failure.item, failure.error));
        }
    }
}
