// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Session Layer
//!
//! Persistent-connection client for the Home Assistant WebSocket API.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Transport trait**: one duplex text-frame connection (WebSocket in production)
//! - **Message types**: handshake and `call_service` / `result` wire frames
//! - **Correlation**: id allocation and in-flight request tracking
//! - **Reconnect policy**: bounded, fixed-delay connection retries
//! - **Session**: authentication state machine and correlated calls with a
//!   single transparent resend on connection loss
//!
//! # Example
//!
//! ```ignore
//! use todosync_core::network::{Endpoint, ServiceCall, Session, WebSocketTransport};
//!
//! let transport = WebSocketTransport::new(Default::default());
//! let mut session = Session::new(transport, Endpoint::new(url, token));
//!
//! let result = session.call(
//!     &ServiceCall::new("todo", "get_items")
//!         .with_data(json!({"entity_id": "todo.shopping_list"}))
//!         .returning_response(),
//! )?;
//! session.close();
//! ```

pub mod correlation;
pub mod error;
pub mod message;
pub mod mock;
pub mod reconnect;
pub mod session;
pub mod transport;
pub mod websocket;

// Error types
pub use error::{NetworkError, RemoteError};

// Message types
pub use message::{encode_auth, InboundMessage, RpcRequest, RpcResult, ServiceCall};

// Correlation bookkeeping
pub use correlation::{Dispatch, PendingCall, PendingCalls};

// Transport abstraction
pub use transport::{ConnectionState, Endpoint, Transport, TransportConfig, TransportResult};

// Mock transport for testing
pub use mock::{MockEvent, MockTransport, RecordingSleep};

// WebSocket transport for production
pub use websocket::WebSocketTransport;

// Reconnection
pub use reconnect::{ReconnectPolicy, Sleep, ThreadSleep, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

// Session
pub use session::{Session, SessionEvent, SessionResult, SessionState};
