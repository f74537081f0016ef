//! Blocking TCP transport with per-poll read timeouts.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::{Buf, BytesMut};
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, trace, warn};

use rfb_engine::{ErrorCode, ErrorSlot, Transport};

const READ_CHUNK: usize = 16 * 1024;

/// TCP-backed [`Transport`].
///
/// Reads are bounded by the timeout passed to each `advance` call, so the
/// protocol engine's poll never blocks longer than the caller allows.
/// Sends write straight through to the socket; protocol messages are small
/// enough that the kernel buffer absorbs them.
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    receive: BytesMut,
    link_up: bool,
    errors: ErrorSlot,
}

impl TcpTransport {
    /// Connect to `host:port`, trying each resolved address in turn.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, crate::RemoteError> {
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(crate::RemoteError::Resolve {
                host: host.to_owned(),
                port,
            });
        }

        let mut last_error = None;
        for addr in addrs {
            match Self::connect_addr(addr, timeout) {
                Ok(transport) => {
                    debug!(%addr, "tcp link established");
                    return Ok(transport);
                }
                Err(error) => {
                    warn!(%addr, %error, "tcp connect attempt failed");
                    last_error = Some(error);
                }
            }
        }
        Err(crate::RemoteError::Connect {
            host: host.to_owned(),
            port,
            source: last_error.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "no address connected")
            }),
        })
    }

    fn connect_addr(addr: SocketAddr, timeout: Duration) -> std::io::Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.connect_timeout(&addr.into(), timeout)?;
        socket.set_nodelay(true)?;
        let stream: TcpStream = socket.into();
        Ok(Self {
            stream,
            peer: addr,
            receive: BytesMut::with_capacity(READ_CHUNK),
            link_up: true,
            errors: ErrorSlot::new(),
        })
    }

    /// Address this transport is connected to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    fn mark_broken(&mut self, context: &str, error: &std::io::Error) {
        warn!(peer = %self.peer, %error, "{context}");
        self.link_up = false;
        self.errors
            .set(ErrorCode::TransportFailed, &format!("{context}: {error}"));
    }

}

impl Transport for TcpTransport {
    fn advance(&mut self, timeout: Duration) -> bool {
        if !self.link_up {
            return false;
        }

        // A zero read timeout means "no timeout" to the OS; clamp it.
        let mut wait = timeout.max(Duration::from_millis(1));
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Err(error) = self.stream.set_read_timeout(Some(wait)) {
                self.mark_broken("socket configuration failed", &error);
                return false;
            }
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    // Let anything read in this call still be decoded;
                    // the next advance reports the dead link.
                    let error =
                        std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed");
                    self.mark_broken("server closed the connection", &error);
                    break;
                }
                Ok(n) => {
                    self.receive.extend_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        break;
                    }
                    // The buffer filled; drain whatever else is queued
                    // without waiting the full timeout again.
                    wait = Duration::from_millis(1);
                }
                Err(error)
                    if matches!(
                        error.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    break;
                }
                Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.mark_broken("read from server failed", &error);
                    return false;
                }
            }
        }
        true
    }

    fn is_link_connected(&self) -> bool {
        self.link_up
    }

    fn receive_buffer(&self) -> &[u8] {
        &self.receive
    }

    fn consume(&mut self, n: usize) {
        self.receive.advance(n);
    }

    fn send(&mut self, bytes: &[u8]) {
        if !self.link_up {
            return;
        }
        if let Err(error) = self.stream.write_all(bytes) {
            self.mark_broken("write to server failed", &error);
        } else {
            trace!(bytes = bytes.len(), "sent");
        }
    }

    fn error_code(&self) -> Option<ErrorCode> {
        self.errors.code()
    }

    fn last_error(&self) -> Option<&str> {
        self.errors.message()
    }

    fn set_error(&mut self, code: ErrorCode, message: &str) {
        self.errors.set(code, message);
    }

    fn clear_error(&mut self) {
        self.errors.clear();
    }
}
