// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scripted implementation of the Transport trait for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use super::error::NetworkError;
use super::reconnect::Sleep;
use super::transport::{ConnectionState, Endpoint, Transport, TransportResult};

/// Something the mock server does on the next `receive()`.
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Deliver a text frame.
    Frame(String),
    /// Fail the receive. `ConnectionClosed` also drops the connection.
    Error(NetworkError),
}

impl MockEvent {
    /// A successful result frame.
    pub fn result(id: u64, result: Value) -> Self {
        MockEvent::Frame(
            json!({"id": id, "type": "result", "success": true, "result": result}).to_string(),
        )
    }

    /// A failed result frame.
    pub fn failure(id: u64, error: Value) -> Self {
        MockEvent::Frame(
            json!({"id": id, "type": "result", "success": false, "result": null, "error": error})
                .to_string(),
        )
    }

    /// An arbitrary JSON frame.
    pub fn json(value: Value) -> Self {
        MockEvent::Frame(value.to_string())
    }
}

type Responder = Box<dyn FnMut(&Value) -> Vec<MockEvent> + Send>;

/// Mock transport for testing.
///
/// Plays the server side: optionally performs the authentication handshake
/// on its own, and answers `call_service` frames through a responder
/// closure. Receiving with nothing queued behaves like a hung server and
/// fails with [`NetworkError::Timeout`].
///
/// # Example
///
/// ```ignore
/// use todosync_core::network::{MockEvent, MockTransport};
///
/// let transport = MockTransport::new()
///     .with_handshake("T")
///     .respond_with(|request| vec![MockEvent::result(request["id"].as_u64().unwrap(), json!({}))]);
/// ```
pub struct MockTransport {
    state: ConnectionState,
    /// Frames that have been sent.
    sent: Vec<String>,
    /// Events to play back on receive().
    inbound: VecDeque<MockEvent>,
    /// Errors for upcoming open() calls.
    open_failures: VecDeque<NetworkError>,
    /// Errors for upcoming send() calls.
    send_failures: VecDeque<NetworkError>,
    /// Token accepted by the automatic handshake, if enabled.
    accepted_token: Option<String>,
    responder: Option<Responder>,
    /// An opened connection not yet released by close().
    live: bool,
    open_attempts: u32,
    open_count: u32,
    close_count: u32,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("state", &self.state)
            .field("sent", &self.sent.len())
            .field("inbound", &self.inbound.len())
            .field("open_count", &self.open_count)
            .field("close_count", &self.close_count)
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Creates a mock with nothing scripted.
    pub fn new() -> Self {
        MockTransport {
            state: ConnectionState::Disconnected,
            sent: Vec::new(),
            inbound: VecDeque::new(),
            open_failures: VecDeque::new(),
            send_failures: VecDeque::new(),
            accepted_token: None,
            responder: None,
            live: false,
            open_attempts: 0,
            open_count: 0,
            close_count: 0,
        }
    }

    /// Enables the automatic handshake: every open() greets with
    /// `auth_required`, and an `auth` frame gets `auth_ok` if it carries
    /// `token`, `auth_invalid` otherwise.
    pub fn with_handshake(mut self, token: &str) -> Self {
        self.accepted_token = Some(token.to_string());
        self
    }

    /// Answers every `call_service` frame with the events `responder` returns.
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: FnMut(&Value) -> Vec<MockEvent> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Queues a text frame for receive().
    pub fn queue_receive(&mut self, frame: impl Into<String>) {
        self.inbound.push_back(MockEvent::Frame(frame.into()));
    }

    /// Queues a receive() failure.
    pub fn queue_error(&mut self, error: NetworkError) {
        self.inbound.push_back(MockEvent::Error(error));
    }

    /// Makes the next open() fail.
    pub fn fail_next_open(&mut self, error: NetworkError) {
        self.open_failures.push_back(error);
    }

    /// Makes the next send() fail.
    pub fn fail_next_send(&mut self, error: NetworkError) {
        self.send_failures.push_back(error);
    }

    /// Returns all frames that have been sent.
    pub fn sent_frames(&self) -> &[String] {
        &self.sent
    }

    /// Returns the sent `call_service` frames, decoded.
    pub fn sent_calls(&self) -> Vec<Value> {
        self.sent
            .iter()
            .filter_map(|frame| serde_json::from_str::<Value>(frame).ok())
            .filter(|value| value["type"] == "call_service")
            .collect()
    }

    /// Returns the number of open() calls, failed ones included.
    pub fn open_attempts(&self) -> u32 {
        self.open_attempts
    }

    /// Returns the number of successful open() calls.
    pub fn open_count(&self) -> u32 {
        self.open_count
    }

    /// Returns the number of close() calls that released a connection.
    pub fn close_count(&self) -> u32 {
        self.close_count
    }

    /// Peer went away: frames of a dropped connection are never delivered.
    fn drop_connection(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.inbound.clear();
    }

    fn handle_sent(&mut self, frame: &str) {
        let Ok(value) = serde_json::from_str::<Value>(frame) else {
            return;
        };

        match value["type"].as_str() {
            Some("auth") => {
                if let Some(token) = &self.accepted_token {
                    let reply = if value["access_token"] == token.as_str() {
                        json!({"type": "auth_ok", "ha_version": "2024.6.0"})
                    } else {
                        json!({"type": "auth_invalid", "message": "Invalid access token"})
                    };
                    self.inbound.push_back(MockEvent::json(reply));
                }
            }
            Some("call_service") => {
                if let Some(responder) = self.responder.as_mut() {
                    let events = responder(&value);
                    self.inbound.extend(events);
                }
            }
            _ => {}
        }
    }
}

impl Transport for MockTransport {
    fn open(&mut self, _endpoint: &Endpoint) -> TransportResult<()> {
        self.open_attempts += 1;
        if let Some(err) = self.open_failures.pop_front() {
            self.state = ConnectionState::Disconnected;
            return Err(err);
        }

        self.open_count += 1;
        self.live = true;
        self.state = ConnectionState::Connected;
        if self.accepted_token.is_some() {
            self.inbound
                .push_front(MockEvent::json(json!({"type": "auth_required", "ha_version": "2024.6.0"})));
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.live {
            self.live = false;
            self.close_count += 1;
            self.inbound.clear();
        }
        self.state = ConnectionState::Disconnected;
    }

    fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn send(&mut self, frame: &str) -> TransportResult<()> {
        if let Some(err) = self.send_failures.pop_front() {
            if matches!(err, NetworkError::ConnectionClosed) {
                self.drop_connection();
            }
            return Err(err);
        }

        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        self.sent.push(frame.to_string());
        self.handle_sent(frame);
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<String> {
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }

        match self.inbound.pop_front() {
            Some(MockEvent::Frame(frame)) => Ok(frame),
            Some(MockEvent::Error(err)) => {
                if matches!(err, NetworkError::ConnectionClosed) {
                    self.drop_connection();
                }
                Err(err)
            }
            None => Err(NetworkError::Timeout),
        }
    }
}

/// Sleeper that records requested delays instead of sleeping.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleep {
    recorded: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleep {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delays requested so far.
    pub fn recorded(&self) -> Vec<Duration> {
        self.recorded
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }
}

impl Sleep for RecordingSleep {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut delays) = self.recorded.lock() {
            delays.push(duration);
        }
    }
}
