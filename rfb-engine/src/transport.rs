//! Transport abstraction consumed by the protocol engine.
//!
//! The engine never touches a socket. It is handed something implementing
//! [`Transport`]: a byte-oriented duplex connection with an accumulating
//! receive buffer, a send path, and a slot for the current error
//! condition. The concrete TCP implementation lives in the host-facing
//! crate; tests drive the engine with scripted in-memory transports.

use std::fmt;
use std::time::Duration;

/// Error conditions surfaced through the transport's error slot.
///
/// The protocol engine reports problems by storing a code and message on
/// its transport rather than returning errors per call; the host polls the
/// composite of link state, protocol stage and error code. Credential
/// conditions are the only recoverable ones - supplying credentials clears
/// them and the stalled state re-evaluates on the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The underlying link failed (connect refused, socket closed).
    TransportFailed,
    /// The peer violated the protocol or spoke something else entirely.
    ProtocolError,
    /// The peer sent a message or encoding this client cannot handle.
    Unsupported,
    /// Authentication needs a password that has not been supplied.
    PasswordRequired,
    /// Authentication needs a username and password pair.
    UsernamePasswordRequired,
    /// The server rejected the supplied credentials.
    LoginFailed,
    /// The server is rate-limiting login attempts.
    TooManyAttempts,
}

impl ErrorCode {
    /// Credential conditions are cleared by supplying credentials; every
    /// other code is terminal for the connection attempt.
    pub fn is_credential_request(&self) -> bool {
        matches!(
            self,
            ErrorCode::PasswordRequired | ErrorCode::UsernamePasswordRequired
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::TransportFailed => "transport failed",
            ErrorCode::ProtocolError => "protocol error",
            ErrorCode::Unsupported => "unsupported",
            ErrorCode::PasswordRequired => "password required",
            ErrorCode::UsernamePasswordRequired => "username and password required",
            ErrorCode::LoginFailed => "login failed",
            ErrorCode::TooManyAttempts => "too many attempts",
        };
        f.write_str(name)
    }
}

/// Byte-stream transport contract.
///
/// `advance` pumps the underlying I/O and refills the receive buffer; it
/// returns `false` only on unrecoverable transport failure (returning
/// `true` with no new bytes is normal). The receive buffer holds every
/// byte received and not yet consumed, contiguous and in arrival order;
/// `consume(n)` drops its first `n` bytes. The engine only ever consumes
/// bytes it has validated as a complete message.
pub trait Transport {
    /// Pump socket I/O, waiting up to `timeout` for new bytes.
    fn advance(&mut self, timeout: Duration) -> bool;

    /// Link-level connectedness, distinct from protocol-level.
    fn is_link_connected(&self) -> bool;

    /// All received, not-yet-consumed bytes.
    fn receive_buffer(&self) -> &[u8];

    /// Drop the first `n` bytes of the receive buffer.
    fn consume(&mut self, n: usize);

    /// Queue bytes for sending; they are assumed to eventually flush.
    fn send(&mut self, bytes: &[u8]);

    /// Current error condition, if any.
    fn error_code(&self) -> Option<ErrorCode>;

    /// Message accompanying the current error condition.
    fn last_error(&self) -> Option<&str>;

    /// Record an error condition.
    fn set_error(&mut self, code: ErrorCode, message: &str);

    /// Clear the error condition.
    fn clear_error(&mut self);
}

/// Reusable error-slot storage for [`Transport`] implementations.
#[derive(Debug, Default, Clone)]
pub struct ErrorSlot {
    current: Option<(ErrorCode, String)>,
}

impl ErrorSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current code, if set.
    pub fn code(&self) -> Option<ErrorCode> {
        self.current.as_ref().map(|(code, _)| *code)
    }

    /// Current message, if set.
    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, msg)| msg.as_str())
    }

    /// Record a condition, replacing any previous one.
    pub fn set(&mut self, code: ErrorCode, message: &str) {
        self.current = Some((code, message.to_owned()));
    }

    /// Clear the slot.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
