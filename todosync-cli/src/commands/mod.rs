// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Commands

pub mod add;
pub mod items;
pub mod sync;

use todosync_core::network::Session;
use todosync_core::{TodoListClient, WebSocketTransport};

use crate::config::CliConfig;

/// Opens a to-do client for the configured list.
///
/// Connects lazily: nothing touches the network until the first call.
fn open_list(config: &CliConfig) -> TodoListClient<WebSocketTransport> {
    let transport = WebSocketTransport::new(config.sync.transport_config());
    let session = Session::with_policy(
        transport,
        config.sync.endpoint(),
        config.sync.reconnect_policy(),
    );
    TodoListClient::new(session, config.entity_id())
}
