// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Messages
//!
//! JSON text frames exchanged with the Home Assistant WebSocket API.
//!
//! Handshake:
//! - server: `{"type": "auth_required"}`
//! - client: `{"type": "auth", "access_token": "..."}`
//! - server: `{"type": "auth_ok"}` or `{"type": "auth_invalid", "message": "..."}`
//!
//! RPC:
//! - client: `{"id": 1, "type": "call_service", "domain": .., "service": .., "service_data": {..}}`
//! - server: `{"id": 1, "type": "result", "success": true, "result": {..}}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::NetworkError;

/// A service invocation, independent of any correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    /// Service domain, e.g. `todo`.
    pub domain: String,
    /// Service name, e.g. `get_items`.
    pub service: String,
    /// Service arguments.
    pub service_data: Value,
    /// Ask the server to include the service response in the result.
    pub return_response: bool,
    /// Whether the session may resend this call once after losing the connection.
    ///
    /// Only set for calls that are safe to repeat.
    pub retry_on_loss: bool,
}

impl ServiceCall {
    /// Creates a call with empty service data.
    pub fn new(domain: impl Into<String>, service: impl Into<String>) -> Self {
        ServiceCall {
            domain: domain.into(),
            service: service.into(),
            service_data: Value::Object(Default::default()),
            return_response: false,
            retry_on_loss: true,
        }
    }

    /// Sets the service data.
    pub fn with_data(mut self, service_data: Value) -> Self {
        self.service_data = service_data;
        self
    }

    /// Requests the service response.
    pub fn returning_response(mut self) -> Self {
        self.return_response = true;
        self
    }

    /// Disables the automatic resend after a connection loss.
    pub fn without_retry(mut self) -> Self {
        self.retry_on_loss = false;
        self
    }

    /// Returns `domain.service`, used in logs.
    pub fn method(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }
}

/// A correlated request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    id: u64,
    call: ServiceCall,
}

#[derive(Serialize)]
struct CallServiceFrame<'a> {
    id: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    domain: &'a str,
    service: &'a str,
    service_data: &'a Value,
    #[serde(skip_serializing_if = "is_false")]
    return_response: bool,
}

#[derive(Serialize)]
struct AuthFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    access_token: &'a str,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RpcRequest {
    /// Binds a call to a correlation id.
    pub fn new(id: u64, call: ServiceCall) -> Self {
        RpcRequest { id, call }
    }

    /// Returns the correlation id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the call.
    pub fn call(&self) -> &ServiceCall {
        &self.call
    }

    /// Encodes the request as a `call_service` frame.
    pub fn encode(&self) -> Result<String, NetworkError> {
        let frame = CallServiceFrame {
            id: self.id,
            kind: "call_service",
            domain: &self.call.domain,
            service: &self.call.service,
            service_data: &self.call.service_data,
            return_response: self.call.return_response,
        };
        Ok(serde_json::to_string(&frame)?)
    }
}

/// Encodes the authentication frame.
pub fn encode_auth(access_token: &str) -> Result<String, NetworkError> {
    let frame = AuthFrame {
        kind: "auth",
        access_token,
    };
    Ok(serde_json::to_string(&frame)?)
}

/// Server reply to a correlated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult {
    /// Correlation id of the request this answers.
    pub id: u64,
    /// Whether the service call succeeded.
    pub success: bool,
    /// Result payload on success.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error payload on failure.
    #[serde(default)]
    pub error: Option<Value>,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// First frame of every connection.
    AuthRequired,
    /// Credential accepted.
    AuthOk,
    /// Credential rejected.
    AuthInvalid { message: Option<String> },
    /// Reply to a request.
    Result(RpcResult),
    /// Anything else (events, pongs, future message types).
    Other { kind: String },
}

impl InboundMessage {
    /// Decodes a text frame.
    ///
    /// Frames without a `type` but with an `id` are read as results.
    pub fn decode(frame: &str) -> Result<Self, NetworkError> {
        let value: Value = serde_json::from_str(frame)
            .map_err(|e| NetworkError::InvalidMessage(e.to_string()))?;

        let kind = value.get("type").and_then(Value::as_str);
        match kind {
            Some("auth_required") => Ok(InboundMessage::AuthRequired),
            Some("auth_ok") => Ok(InboundMessage::AuthOk),
            Some("auth_invalid") => Ok(InboundMessage::AuthInvalid {
                message: value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            Some("result") => Self::decode_result(value),
            None if value.get("id").is_some() => Self::decode_result(value),
            Some(other) => Ok(InboundMessage::Other {
                kind: other.to_string(),
            }),
            None => Err(NetworkError::InvalidMessage("Missing message type".into())),
        }
    }

    fn decode_result(value: Value) -> Result<Self, NetworkError> {
        serde_json::from_value(value)
            .map(InboundMessage::Result)
            .map_err(|e| NetworkError::InvalidMessage(format!("Malformed result: {}", e)))
    }

    /// Returns the message type name, used in logs.
    pub fn kind(&self) -> &str {
        match self {
            InboundMessage::AuthRequired => "auth_required",
            InboundMessage::AuthOk => "auth_ok",
            InboundMessage::AuthInvalid { .. } => "auth_invalid",
            InboundMessage::Result(_) => "result",
            InboundMessage::Other { kind } => kind,
        }
    }
}
