// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session
//!
//! Authenticated RPC session over one transport, with transparent
//! reconnection.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::correlation::{Dispatch, PendingCalls};
use super::error::{NetworkError, RemoteError};
use super::message::{encode_auth, InboundMessage, RpcRequest, RpcResult, ServiceCall};
use super::reconnect::ReconnectPolicy;
use super::transport::{ConnectionState, Endpoint, Transport};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, NetworkError>;

/// Unrelated frames tolerated while awaiting one result before the
/// connection is considered broken.
const MAX_IGNORED_FRAMES: usize = 128;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No live connection. Initial state, and where a closed session ends.
    Disconnected,
    /// Transport open in progress, waiting for the greeting.
    Connecting,
    /// Credential sent, waiting for the verdict.
    Authenticating,
    /// Authenticated; calls may be issued.
    Ready,
    /// Shutting down.
    Closing,
}

/// Inputs of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start opening a connection.
    Open,
    /// Server greeted with `auth_required`.
    AuthRequired,
    /// Server answered `auth_ok`.
    AuthAccepted,
    /// Connection failed or dropped.
    Lost,
    /// Explicit close requested.
    Close,
    /// Close finished.
    Closed,
}

impl SessionState {
    /// Applies one event, returning the next state.
    ///
    /// Pairs missing from the table are rejected with
    /// [`NetworkError::InvalidTransition`].
    pub fn on(self, event: SessionEvent) -> SessionResult<SessionState> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Disconnected, E::Open) => Ok(S::Connecting),
            (S::Connecting, E::AuthRequired) => Ok(S::Authenticating),
            (S::Authenticating, E::AuthAccepted) => Ok(S::Ready),
            (S::Connecting | S::Authenticating | S::Ready, E::Lost) => Ok(S::Disconnected),
            (S::Closing, E::Closed) => Ok(S::Disconnected),
            (from, E::Close) if from != S::Closing => Ok(S::Closing),
            (from, event) => Err(NetworkError::InvalidTransition {
                from: from.to_string(),
                event: event.to_string(),
            }),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Authenticating => "authenticating",
            SessionState::Ready => "ready",
            SessionState::Closing => "closing",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::Open => "open",
            SessionEvent::AuthRequired => "auth_required",
            SessionEvent::AuthAccepted => "auth_ok",
            SessionEvent::Lost => "connection lost",
            SessionEvent::Close => "close",
            SessionEvent::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The transport, the endpoint and the state they are in.
struct Link<T: Transport> {
    transport: T,
    endpoint: Endpoint,
    state: SessionState,
}

impl<T: Transport> Link<T> {
    fn advance(&mut self, event: SessionEvent) -> SessionResult<()> {
        let next = self.state.on(event)?;
        debug!(from = %self.state, to = %next, %event, "session transition");
        self.state = next;
        Ok(())
    }

    /// One connect + authenticate attempt.
    fn establish(&mut self, attempt: u32) -> SessionResult<()> {
        info!(attempt, address = self.endpoint.address(), "connecting");
        self.advance(SessionEvent::Open)?;

        self.handshake().inspect_err(|_| self.drop_connection())
    }

    fn handshake(&mut self) -> SessionResult<()> {
        self.transport.open(&self.endpoint).map_err(|e| match e {
            NetworkError::ConnectionFailed(_) => e,
            other => NetworkError::ConnectionFailed(other.to_string()),
        })?;

        let greeting = self
            .transport
            .receive()
            .map_err(|e| NetworkError::ConnectionFailed(format!("No greeting: {}", e)))?;
        match InboundMessage::decode(&greeting) {
            Ok(InboundMessage::AuthRequired) => {}
            Ok(other) => {
                return Err(NetworkError::ConnectionFailed(format!(
                    "Expected auth_required, got {}",
                    other.kind()
                )))
            }
            Err(e) => return Err(NetworkError::ConnectionFailed(e.to_string())),
        }
        self.advance(SessionEvent::AuthRequired)?;

        let auth = encode_auth(self.endpoint.credential())?;
        self.transport
            .send(&auth)
            .map_err(|e| NetworkError::AuthenticationFailed(e.to_string()))?;

        let verdict = self
            .transport
            .receive()
            .map_err(|e| NetworkError::AuthenticationFailed(e.to_string()))?;
        match InboundMessage::decode(&verdict) {
            Ok(InboundMessage::AuthOk) => self.advance(SessionEvent::AuthAccepted),
            Ok(InboundMessage::AuthInvalid { message }) => Err(NetworkError::AuthenticationFailed(
                message.unwrap_or_else(|| "Credential rejected".into()),
            )),
            Ok(other) => Err(NetworkError::AuthenticationFailed(format!(
                "Expected auth_ok, got {}",
                other.kind()
            ))),
            Err(e) => Err(NetworkError::AuthenticationFailed(e.to_string())),
        }
    }

    /// Releases the transport and falls back to Disconnected.
    fn drop_connection(&mut self) {
        self.transport.close();
        if let Ok(next) = self.state.on(SessionEvent::Lost) {
            debug!(from = %self.state, to = %next, "session transition");
            self.state = next;
        }
    }
}

/// Authenticated RPC session.
///
/// Owns one transport and hides reconnection from callers:
/// - Connects and authenticates lazily through the [`ReconnectPolicy`]
/// - Correlates each request with its result by id
/// - Resends a call once if the connection drops under it
///
/// Calls take `&mut self`, so only one is ever in flight.
///
/// # Example
///
/// ```ignore
/// use todosync_core::network::{Endpoint, ServiceCall, Session, WebSocketTransport};
///
/// let transport = WebSocketTransport::new(Default::default());
/// let mut session = Session::new(transport, Endpoint::new(url, token));
/// let items = session.call(&ServiceCall::new("todo", "get_items").returning_response())?;
/// session.close();
/// ```
pub struct Session<T: Transport> {
    link: Link<T>,
    reconnect: ReconnectPolicy,
    pending: PendingCalls,
    closed: bool,
}

impl<T: Transport> Session<T> {
    /// Creates a session with the default reconnect policy.
    pub fn new(transport: T, endpoint: Endpoint) -> Self {
        Self::with_policy(transport, endpoint, ReconnectPolicy::default())
    }

    /// Creates a session with a custom reconnect policy.
    pub fn with_policy(transport: T, endpoint: Endpoint, reconnect: ReconnectPolicy) -> Self {
        Session {
            link: Link {
                transport,
                endpoint,
                state: SessionState::Disconnected,
            },
            reconnect,
            pending: PendingCalls::new(),
            closed: false,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.link.state
    }

    /// Returns true if authenticated and the transport is still up.
    pub fn is_ready(&self) -> bool {
        self.link.state == SessionState::Ready
            && self.link.transport.state() == ConnectionState::Connected
    }

    /// Returns true once [`Session::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the id the next request will carry.
    pub fn next_correlation_id(&self) -> u64 {
        self.pending.next_id()
    }

    /// Returns the number of requests awaiting a result.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns the endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.link.endpoint
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.link.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.link.transport
    }

    /// Connects and authenticates unless already ready.
    ///
    /// Runs through the reconnect policy; on exhaustion returns the last
    /// attempt's error. A fresh connection restarts correlation ids at 1.
    pub fn ensure_ready(&mut self) -> SessionResult<()> {
        if self.closed {
            return Err(NetworkError::SessionClosed);
        }
        if self.is_ready() {
            return Ok(());
        }
        if self.link.state != SessionState::Disconnected {
            self.connection_lost();
        }

        let link = &mut self.link;
        self.reconnect.run(|attempt| link.establish(attempt))?;

        self.pending.reset();
        info!(address = self.link.endpoint.address(), "session ready");
        Ok(())
    }

    /// Issues one service call and returns its result payload.
    ///
    /// If the connection drops while sending or awaiting, the session
    /// reconnects and resends once (for calls with `retry_on_loss`); a
    /// second loss fails with [`NetworkError::RetryFailed`]. A failure
    /// reported by the server is returned as [`NetworkError::Application`]
    /// and never retried.
    pub fn call(&mut self, call: &ServiceCall) -> SessionResult<Value> {
        let first = match self.call_once(call) {
            Err(e) if e.is_connection_loss() => e,
            other => return other,
        };

        self.connection_lost();
        if !call.retry_on_loss {
            return Err(first);
        }

        warn!(method = %call.method(), error = %first, "connection lost, resending once");
        match self.call_once(call) {
            Err(e) if e.is_connection_loss() => {
                self.connection_lost();
                Err(NetworkError::RetryFailed(Box::new(e)))
            }
            other => other,
        }
    }

    /// Closes the session. Idempotent; later calls fail with
    /// [`NetworkError::SessionClosed`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        let _ = self.link.advance(SessionEvent::Close);
        for (id, pending) in self.pending.fail_all() {
            warn!(id, method = %pending.method, "request abandoned by close");
        }
        self.link.transport.close();
        let _ = self.link.advance(SessionEvent::Closed);
        self.closed = true;
        info!("session closed");
    }

    fn call_once(&mut self, call: &ServiceCall) -> SessionResult<Value> {
        self.ensure_ready()?;
        if self.link.state != SessionState::Ready {
            return Err(NetworkError::InvalidTransition {
                from: self.link.state.to_string(),
                event: "call_service".into(),
            });
        }

        let method = call.method();
        let id = self.pending.register(&method);
        let request = RpcRequest::new(id, call.clone());
        let sent = request
            .encode()
            .and_then(|frame| self.link.transport.send(&frame));
        if let Err(e) = sent {
            self.pending.remove(id);
            return Err(e);
        }
        debug!(id, %method, "request sent");

        let result = match self.await_result(id) {
            Ok(result) => result,
            Err(e) => {
                self.pending.remove(id);
                return Err(e);
            }
        };
        if result.success {
            debug!(id, %method, "request succeeded");
            Ok(result.result.unwrap_or(Value::Null))
        } else {
            let remote = RemoteError::new(result.error.unwrap_or(Value::Null));
            warn!(id, %method, error = %remote, "request rejected by server");
            Err(NetworkError::Application(remote))
        }
    }

    fn await_result(&mut self, id: u64) -> SessionResult<RpcResult> {
        if let Some(parked) = self.pending.take_parked(id) {
            return Ok(parked);
        }

        for _ in 0..MAX_IGNORED_FRAMES {
            let frame = match self.link.transport.receive() {
                Ok(frame) => frame,
                Err(e) if e.is_connection_loss() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable frame");
                    continue;
                }
            };
            match InboundMessage::decode(&frame) {
                Ok(InboundMessage::Result(result)) => {
                    if let Dispatch::Matched(result) = self.pending.dispatch(id, result) {
                        return Ok(result);
                    }
                }
                Ok(other) => warn!(kind = other.kind(), "ignoring unsolicited message"),
                Err(e) => warn!(error = %e, "discarding undecodable frame"),
            }
        }

        Err(NetworkError::ReceiveFailed(format!(
            "No result for request {} after {} unrelated frames",
            id, MAX_IGNORED_FRAMES
        )))
    }

    /// Fails every pending request and drops the connection.
    fn connection_lost(&mut self) {
        for (id, pending) in self.pending.fail_all() {
            warn!(id, method = %pending.method, "request failed: connection lost");
        }
        self.link.drop_connection();
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}

// INLINE_TEST_REQUIRED: Tests the private Link handshake and transition table
#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::MockTransport;

    fn link(transport: MockTransport) -> Link<MockTransport> {
        Link {
            transport,
            endpoint: Endpoint::new("ws://localhost:8123/api/websocket", "T"),
            state: SessionState::Disconnected,
        }
    }

    #[test]
    fn test_transition_table_happy_path() {
        let state = SessionState::Disconnected
            .on(SessionEvent::Open)
            .and_then(|s| s.on(SessionEvent::AuthRequired))
            .and_then(|s| s.on(SessionEvent::AuthAccepted))
            .unwrap();
        assert_eq!(state, SessionState::Ready);
        assert_eq!(state.on(SessionEvent::Lost).unwrap(), SessionState::Disconnected);
    }

    #[test]
    fn test_transition_table_close() {
        let closing = SessionState::Ready.on(SessionEvent::Close).unwrap();
        assert_eq!(closing, SessionState::Closing);
        assert_eq!(
            closing.on(SessionEvent::Closed).unwrap(),
            SessionState::Disconnected
        );
        assert_eq!(
            SessionState::Disconnected.on(SessionEvent::Close).unwrap(),
            SessionState::Closing
        );
    }

    #[test]
    fn test_transition_table_rejects_illegal_pairs() {
        let illegal = [
            (SessionState::Ready, SessionEvent::Open),
            (SessionState::Disconnected, SessionEvent::AuthAccepted),
            (SessionState::Connecting, SessionEvent::AuthAccepted),
            (SessionState::Authenticating, SessionEvent::AuthRequired),
            (SessionState::Disconnected, SessionEvent::Lost),
            (SessionState::Closing, SessionEvent::Close),
            (SessionState::Ready, SessionEvent::Closed),
        ];

        for (state, event) in illegal {
            assert!(
                matches!(state.on(event), Err(NetworkError::InvalidTransition { .. })),
                "{} on {} should be rejected",
                event,
                state
            );
        }
    }

    #[test]
    fn test_establish_reaches_ready() {
        let mut link = link(MockTransport::new().with_handshake("T"));
        link.establish(1).unwrap();
        assert_eq!(link.state, SessionState::Ready);
        assert_eq!(
            link.transport.sent_frames(),
            [r#"{"type":"auth","access_token":"T"}"#.to_string()]
        );
    }

    #[test]
    fn test_establish_unexpected_greeting_is_connect_error() {
        let mut transport = MockTransport::new();
        transport.queue_receive(r#"{"type":"auth_ok"}"#);
        let mut link = link(transport);

        let err = link.establish(1).unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed(_)));
        assert_eq!(link.state, SessionState::Disconnected);
        assert_eq!(link.transport.close_count(), 1);
    }

    #[test]
    fn test_establish_rejected_token_is_auth_error() {
        let mut link = link(MockTransport::new().with_handshake("other"));

        let err = link.establish(1).unwrap_err();
        assert!(matches!(err, NetworkError::AuthenticationFailed(ref m) if m == "Invalid access token"));
        assert_eq!(link.state, SessionState::Disconnected);
    }

    #[test]
    fn test_establish_loss_during_auth_is_auth_error() {
        let mut transport = MockTransport::new();
        transport.queue_receive(r#"{"type":"auth_required"}"#);
        transport.queue_error(NetworkError::ConnectionClosed);
        let mut link = link(transport);

        let err = link.establish(1).unwrap_err();
        assert!(matches!(err, NetworkError::AuthenticationFailed(_)));
        assert_eq!(link.state, SessionState::Disconnected);
    }

    #[test]
    fn test_establish_open_failure_is_connect_error() {
        let mut transport = MockTransport::new();
        transport.fail_next_open(NetworkError::Timeout);
        let mut link = link(transport);

        let err = link.establish(1).unwrap_err();
        assert!(matches!(err, NetworkError::ConnectionFailed(_)));
        assert_eq!(link.state, SessionState::Disconnected);
    }
}
