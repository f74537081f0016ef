//! Protocol stage tracking.

/// The handshake and session stages of one RFB connection attempt.
///
/// Exactly one stage is current at any time, owned by the engine. Stages
/// advance only inside a poll, strictly forward except for `Connected`,
/// which self-loops over server sub-messages. `ProtocolFailure` is
/// terminal; a connection that lands there must be torn down and retried
/// from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    /// Waiting for the server's 12-byte version line.
    AwaitingVersion,
    /// Pre-3.7: waiting for the server-chosen 4-byte security word.
    AwaitingSecurityList,
    /// 3.7+: waiting for the count-prefixed security type list.
    AwaitingSecurityTypes,
    /// Dispatching on the negotiated security type.
    Authenticating,
    /// Waiting for the 16-byte VNC authentication challenge.
    AwaitingVncChallenge,
    /// Waiting for an ARD challenge. Handling is a stub; the connection
    /// stalls here by design and must be abandoned by the caller.
    AwaitingArdChallenge,
    /// Waiting for the 4-byte SecurityResult word.
    AwaitingAuthResult,
    /// Waiting for the failure-reason text (3.8+ only).
    AwaitingFailureReason,
    /// About to send ClientInit.
    Initializing,
    /// Waiting for ServerInit (geometry, pixel format, name).
    AwaitingServerInit,
    /// About to send SetEncodings.
    Setup,
    /// Session established; decoding server sub-messages.
    Connected,
    /// Terminal: the protocol broke down or the server rejected us.
    ProtocolFailure,
}

impl ProtocolState {
    /// True once the session is established.
    pub fn is_connected(&self) -> bool {
        matches!(self, ProtocolState::Connected)
    }

    /// True for the terminal failure stage.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProtocolState::ProtocolFailure)
    }
}
