// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! To-do List Module
//!
//! Typed access to one Home Assistant to-do entity on top of the session.

pub mod client;
pub mod entity;
pub mod types;

pub use client::TodoListClient;
#[cfg(feature = "locale-lookup")]
pub use entity::fetch_language;
pub use entity::{
    config_url, entity_id_for_language, resolve_entity_id, LookupError, DEFAULT_ENTITY_ID,
    DEFAULT_LANGUAGE,
};
pub use types::{AddOutcome, ItemStatus, TodoItem};
