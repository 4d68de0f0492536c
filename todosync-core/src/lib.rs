// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Todosync Core Library
//!
//! One-way sync of an external item list into a Home Assistant to-do list,
//! over an authenticated, self-healing WebSocket session.

pub mod config;
pub mod network;
pub mod sync;
pub mod todo;

pub use config::{ConfigError, SyncConfig};
pub use network::{
    ConnectionState, Endpoint, MockTransport, NetworkError, ReconnectPolicy, RemoteError,
    ServiceCall, Session, SessionState, Transport, TransportConfig, WebSocketTransport,
};
pub use sync::{ItemSource, JsonFileSource, StaticSource, SyncContext, SyncError, SyncReport};
pub use todo::{AddOutcome, ItemStatus, TodoItem, TodoListClient};
