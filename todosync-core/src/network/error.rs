// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network Error Types
//!
//! Error types for transport, session and RPC operations.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Error payload reported by the remote end for a failed RPC.
///
/// The payload is kept exactly as received; `code` and `message` are
/// convenience accessors for the usual `{"code": .., "message": ..}` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    payload: Value,
}

impl RemoteError {
    /// Wraps a raw error payload.
    pub fn new(payload: Value) -> Self {
        RemoteError { payload }
    }

    /// Returns the raw payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the `code` field, if present.
    pub fn code(&self) -> Option<&str> {
        self.payload.get("code").and_then(Value::as_str)
    }

    /// Returns the `message` field, if present.
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code(), self.message()) {
            (Some(code), Some(message)) => write!(f, "{}: {}", code, message),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => f.write_str(code),
            (None, None) => write!(f, "{}", self.payload),
        }
    }
}

/// Network, session and RPC error types.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timeout")]
    Timeout,

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Message receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Call failed after reconnect: {0}")]
    RetryFailed(Box<NetworkError>),

    #[error("Remote call failed: {0}")]
    Application(RemoteError),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid session transition: {event} while {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Session closed")]
    SessionClosed,
}

impl NetworkError {
    /// Returns true if the error means the connection was lost mid-operation.
    ///
    /// These are the errors a call recovers from with one reconnect and resend.
    pub fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionClosed
                | NetworkError::Timeout
                | NetworkError::SendFailed(_)
                | NetworkError::ReceiveFailed(_)
                | NetworkError::NotConnected
        )
    }

    /// Returns true if the error happened while establishing a session.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            NetworkError::ConnectionFailed(_) | NetworkError::AuthenticationFailed(_)
        )
    }

    /// Returns the remote error payload for application-level failures.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            NetworkError::Application(remote) => Some(remote),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(e: serde_json::Error) -> Self {
        NetworkError::Serialization(e.to_string())
    }
}
