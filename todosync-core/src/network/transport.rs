// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for a single duplex message connection.

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to any server.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected and usable.
    Connected,
}

/// Address and credential of the remote endpoint.
///
/// Immutable once built. The credential is wiped from memory on drop and
/// never printed.
#[derive(Clone)]
pub struct Endpoint {
    address: String,
    credential: Zeroizing<String>,
}

impl Endpoint {
    /// Creates an endpoint from a `ws://` or `wss://` address and an access token.
    pub fn new(address: impl Into<String>, credential: impl Into<String>) -> Self {
        Endpoint {
            address: address.into(),
            credential: Zeroizing::new(credential.into()),
        }
    }

    /// Returns the endpoint address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the access token.
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("address", &self.address)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Timeouts applied by transport implementations.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Bound on every read and write. A read that exceeds it fails with
    /// [`NetworkError::Timeout`].
    pub io_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(30),
        }
    }
}

/// Transport trait for a single full-duplex text message connection.
///
/// Abstracts the underlying mechanism (WebSocket in production, scripted
/// frames in tests). The interface is blocking; `open`, `send`, `receive`
/// are the only calls that may wait on the network.
///
/// Every successful `open` must be paired with a `close`.
///
/// # Example
///
/// ```ignore
/// use todosync_core::network::{Endpoint, Transport, WebSocketTransport};
///
/// let mut transport = WebSocketTransport::new(Default::default());
/// transport.open(&Endpoint::new("ws://homeassistant.local:8123/api/websocket", token))?;
/// let first = transport.receive()?;
/// transport.close();
/// ```
pub trait Transport: Send {
    /// Opens one connection to the endpoint.
    ///
    /// Fails with [`NetworkError::ConnectionFailed`].
    fn open(&mut self, endpoint: &Endpoint) -> TransportResult<()>;

    /// Releases the connection. Idempotent and infallible.
    fn close(&mut self);

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends one text frame.
    ///
    /// Returns [`NetworkError::NotConnected`] if the transport is not open.
    fn send(&mut self, frame: &str) -> TransportResult<()>;

    /// Receives the next text frame.
    ///
    /// Blocks until a frame arrives, the connection drops
    /// ([`NetworkError::ConnectionClosed`]) or the I/O timeout elapses
    /// ([`NetworkError::Timeout`]).
    fn receive(&mut self) -> TransportResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_debug_redacts_credential() {
        let endpoint = Endpoint::new("ws://localhost:8123/api/websocket", "secret-token");
        let printed = format!("{:?}", endpoint);
        assert!(printed.contains("localhost"));
        assert!(!printed.contains("secret-token"));
        assert_eq!(endpoint.credential(), "secret-token");
    }

    #[test]
    fn test_default_transport_config() {
        let config = TransportConfig::default();
        assert_eq!(config.io_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }
}
