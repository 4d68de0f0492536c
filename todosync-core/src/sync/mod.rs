// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Module
//!
//! One-way synchronization of an external item list into a to-do list.
//! Items missing from the list are added; nothing is ever removed.

pub mod context;
pub mod source;

use thiserror::Error;

use crate::network::NetworkError;

pub use context::{missing_items, ItemFailure, SyncContext, SyncPlan, SyncReport};
pub use source::{ItemSource, JsonFileSource, SourceError, StaticSource};

/// Sync cycle errors.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The session could not reach or talk to the server.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The item source failed.
    #[error("Item source error: {0}")]
    Source(#[from] SourceError),
}
