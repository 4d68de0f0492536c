// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Real transport implementation using tungstenite for WebSocket connections.
//! Supports both native-tls and rustls TLS backends.

use std::net::{TcpStream, ToSocketAddrs};

#[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
use native_tls::TlsConnector;

#[cfg(feature = "network-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "network-rustls")]
use std::sync::Arc;

use tracing::debug;
use tungstenite::client::IntoClientRequest;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::NetworkError;
use super::transport::{ConnectionState, Endpoint, Transport, TransportConfig, TransportResult};

/// WebSocket transport for the Home Assistant API.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) connections.
///
/// # Example
///
/// ```ignore
/// use todosync_core::network::{Endpoint, Transport, TransportConfig, WebSocketTransport};
///
/// let mut transport = WebSocketTransport::new(TransportConfig::default());
/// transport.open(&Endpoint::new("wss://ha.example.com/api/websocket", token))?;
/// ```
pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
    config: TransportConfig,
    state: ConnectionState,
}

impl WebSocketTransport {
    /// Creates a new WebSocket transport.
    pub fn new(config: TransportConfig) -> Self {
        WebSocketTransport {
            socket: None,
            config,
            state: ConnectionState::Disconnected,
        }
    }

    /// Parses a WebSocket URL into host and port.
    fn parse_url(url: &str) -> Result<(String, u16, bool), NetworkError> {
        let is_tls = url.starts_with("wss://");
        let url_without_scheme = url
            .strip_prefix("wss://")
            .or_else(|| url.strip_prefix("ws://"))
            .ok_or_else(|| {
                NetworkError::ConnectionFailed(
                    "Invalid URL scheme (expected ws:// or wss://)".into(),
                )
            })?;

        let host_port = url_without_scheme
            .split('/')
            .next()
            .unwrap_or(url_without_scheme);

        let (host, port) = if let Some(colon_pos) = host_port.rfind(':') {
            let host = &host_port[..colon_pos];
            let port_str = &host_port[colon_pos + 1..];
            let port: u16 = port_str.parse().map_err(|_| {
                NetworkError::ConnectionFailed(format!("Invalid port: {}", port_str))
            })?;
            (host.to_string(), port)
        } else {
            let default_port = if is_tls { 443 } else { 80 };
            (host_port.to_string(), default_port)
        };

        if host.is_empty() {
            return Err(NetworkError::ConnectionFailed("Missing host".into()));
        }

        Ok((host, port, is_tls))
    }

    /// Resolves the host and connects with the configured timeout.
    fn connect_tcp(&self, host: &str, port: u16) -> Result<TcpStream, NetworkError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| NetworkError::ConnectionFailed(format!("Cannot resolve {}: {}", host, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }

        Err(NetworkError::ConnectionFailed(match last_error {
            Some(e) => e.to_string(),
            None => format!("No addresses for {}", host),
        }))
    }

    /// Create a TLS stream using native-tls
    #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let connector = TlsConnector::new()
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS error: {}", e)))?;
        let tls_stream = connector
            .connect(host, tcp_stream)
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS handshake failed: {}", e)))?;
        Ok(MaybeTlsStream::NativeTls(tls_stream))
    }

    /// Create a TLS stream using rustls
    #[cfg(feature = "network-rustls")]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name: ServerName<'_> = host.try_into().map_err(|_| {
            NetworkError::ConnectionFailed(format!("Invalid server name: {}", host))
        })?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(config), server_name.to_owned())
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);
        Ok(MaybeTlsStream::Rustls(tls_stream))
    }

    #[cfg(not(any(feature = "network-native-tls", feature = "network-rustls")))]
    fn create_tls_stream(
        _host: &str,
        _tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        Err(NetworkError::ConnectionFailed(
            "wss:// requires the network-native-tls or network-rustls feature".into(),
        ))
    }

    fn connect_socket(
        &self,
        endpoint: &Endpoint,
    ) -> Result<WebSocket<MaybeTlsStream<TcpStream>>, NetworkError> {
        let (host, port, is_tls) = Self::parse_url(endpoint.address())?;
        let tcp_stream = self.connect_tcp(&host, port)?;

        tcp_stream
            .set_read_timeout(Some(self.config.io_timeout))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        tcp_stream
            .set_write_timeout(Some(self.config.io_timeout))
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        let stream: MaybeTlsStream<TcpStream> = if is_tls {
            Self::create_tls_stream(&host, tcp_stream)?
        } else {
            MaybeTlsStream::Plain(tcp_stream)
        };

        let request = endpoint.address().into_client_request().map_err(|e| {
            NetworkError::ConnectionFailed(format!("Invalid WebSocket request: {}", e))
        })?;

        let (socket, _response) = tungstenite::client(request, stream).map_err(|e| {
            NetworkError::ConnectionFailed(format!("WebSocket handshake failed: {}", e))
        })?;

        Ok(socket)
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, endpoint: &Endpoint) -> TransportResult<()> {
        if matches!(self.state, ConnectionState::Connected) {
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        match self.connect_socket(endpoint) {
            Ok(socket) => {
                debug!(address = endpoint.address(), "websocket connected");
                self.socket = Some(socket);
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            // Best effort: the peer may already be gone.
            let _ = socket.close(None);
            let _ = socket.flush();
            debug!("websocket closed");
        }
        self.state = ConnectionState::Disconnected;
    }

    fn state(&self) -> ConnectionState {
        self.state.clone()
    }

    fn send(&mut self, frame: &str) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        let result = socket
            .send(Message::Text(frame.to_string()))
            .and_then(|_| socket.flush());

        result.map_err(|e| match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                self.state = ConnectionState::Disconnected;
                NetworkError::ConnectionClosed
            }
            tungstenite::Error::Io(ref io)
                if io.kind() == std::io::ErrorKind::WouldBlock
                    || io.kind() == std::io::ErrorKind::TimedOut =>
            {
                NetworkError::Timeout
            }
            other => NetworkError::SendFailed(other.to_string()),
        })
    }

    fn receive(&mut self) -> TransportResult<String> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        loop {
            match socket.read() {
                Ok(Message::Text(text)) => return Ok(text),
                Ok(Message::Binary(data)) => {
                    return String::from_utf8(data).map_err(|_| {
                        NetworkError::InvalidMessage("Binary frame is not UTF-8".into())
                    });
                }
                // tungstenite queues the pong itself; it goes out with the next flush.
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                Ok(Message::Close(_)) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(NetworkError::ConnectionClosed);
                }
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Err(NetworkError::Timeout);
                }
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(NetworkError::ConnectionClosed);
                }
                Err(e) => return Err(NetworkError::ReceiveFailed(e.to_string())),
            }
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.close();
    }
}
