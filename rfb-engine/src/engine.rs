//! The RFB protocol engine: handshake state machine and session decoder.

use std::marker::PhantomData;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use rfb_auth::{
    challenge_response, choose_security_type, derive_key, ChallengeCipher, DesCipher,
    CHALLENGE_LEN, SECURITY_ARD, SECURITY_NONE, SECURITY_TIGHT, SECURITY_VNC,
};
use rfb_wire::{
    scan_update, skip_bell, skip_color_map, skip_cut_text, ClientInit, FramebufferUpdateRequest,
    KeyEvent, ProtocolVersion, ServerInit, SetEncodings, UpdateScan, SERVER_MSG_BELL,
    SERVER_MSG_CUT_TEXT, SERVER_MSG_FRAMEBUFFER_UPDATE, SERVER_MSG_SET_COLOR_MAP,
    VERSION_LINE_LEN,
};

use crate::framebuffer::RetainedFramebuffer;
use crate::state::ProtocolState;
use crate::transport::{ErrorCode, Transport};

/// Client-side RFB protocol engine.
///
/// The engine owns one [`Transport`] for the duration of one logical
/// connection attempt and drives the whole protocol through a single pump
/// operation: [`poll`](Self::poll) lets the transport advance its socket,
/// then decodes as much of the buffered byte stream as is currently
/// complete. Insufficient bytes are simply left in place - every decode
/// step either consumes a whole recognized message or consumes nothing, so
/// arbitrary read fragmentation cannot desynchronize the stream.
///
/// Credentials may be supplied up front or reactively after the engine
/// reports a credential-required condition; supplying them clears that
/// condition and the stalled stage re-evaluates against the same buffered
/// bytes on the next poll.
///
/// The engine is single-threaded and cooperative: no internal threads,
/// locks or timers. A stalled authentication method (Tight, ARD) never
/// progresses on its own - abandoning it is the caller's elapsed-time
/// policy.
pub struct ProtocolEngine<T: Transport, C: ChallengeCipher = DesCipher> {
    transport: T,
    state: ProtocolState,
    version: Option<ProtocolVersion>,
    /// Negotiated security type. Kept at word width because the pre-3.7
    /// path stores the server's 4-byte word exactly as received.
    security_type: u32,
    username: Vec<u8>,
    password: Vec<u8>,
    server_name: Vec<u8>,
    failure_reason: Vec<u8>,
    framebuffer: RetainedFramebuffer,
    _cipher: PhantomData<C>,
}

impl<T: Transport, C: ChallengeCipher> ProtocolEngine<T, C> {
    /// Bind an engine to a transport, starting at version negotiation.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: ProtocolState::AwaitingVersion,
            version: None,
            security_type: 0,
            username: Vec::new(),
            password: Vec::new(),
            server_name: Vec::new(),
            failure_reason: Vec::new(),
            framebuffer: RetainedFramebuffer::new(),
            _cipher: PhantomData,
        }
    }

    /// Current protocol stage.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// True once the RFB session is fully established.
    pub fn is_protocol_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// The transport this engine is bound to.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport (teardown, error inspection).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Session name announced by the server in ServerInit.
    pub fn server_name(&self) -> &[u8] {
        &self.server_name
    }

    /// Failure-reason text from the server, when one was sent (3.8+).
    pub fn failure_reason(&self) -> &[u8] {
        &self.failure_reason
    }

    /// The retained screen buffer and its geometry.
    pub fn framebuffer(&self) -> &RetainedFramebuffer {
        &self.framebuffer
    }

    /// Opt in to retaining decoded pixels. Off by default; decoding
    /// advances identically either way.
    pub fn set_keep_framebuffer(&mut self, keep: bool) {
        self.framebuffer.set_keep(keep);
    }

    /// Supply the password, clearing a pending password-required condition
    /// so the stalled authentication stage can re-attempt.
    pub fn set_password(&mut self, password: &[u8]) {
        self.password = password.to_vec();
        if self.transport.error_code() == Some(ErrorCode::PasswordRequired) {
            self.transport.clear_error();
        }
    }

    /// Supply username and password, clearing any credential-required
    /// condition.
    pub fn set_credentials(&mut self, username: &[u8], password: &[u8]) {
        self.username = username.to_vec();
        self.password = password.to_vec();
        if self
            .transport
            .error_code()
            .map_or(false, |code| code.is_credential_request())
        {
            self.transport.clear_error();
        }
    }

    /// Pump the connection once.
    ///
    /// Lets the transport advance its socket, then dispatches on the
    /// current stage repeatedly until neither the stage changes nor a byte
    /// is consumed - so emit-only stages chain through in one call and
    /// several fully-buffered server messages drain in one call. Returns
    /// `false` only when the transport reports unrecoverable failure.
    pub fn poll(&mut self, timeout: Duration) -> bool {
        if !self.transport.advance(timeout) {
            return false;
        }

        loop {
            let state_before = self.state;
            let consumed = self.step();
            if self.state == state_before && consumed == 0 {
                break;
            }
            if self.state.is_terminal() {
                break;
            }
        }
        true
    }

    /// Send a key press or release. Meaningful once connected.
    pub fn send_key(&mut self, key: u16, down: bool) {
        let mut out = BytesMut::with_capacity(8);
        KeyEvent { down, key }.encode(&mut out);
        self.transport.send(&out);
        trace!(key, down, "sent key event");
    }

    /// Send a press immediately followed by a release of the same key.
    pub fn pulse_key(&mut self, key: u16) {
        self.send_key(key, true);
        self.send_key(key, false);
    }

    /// Ask the server for screen content covering the given rectangle.
    pub fn request_screen(&mut self, incremental: bool, x: u16, y: u16, width: u16, height: u16) {
        let mut out = BytesMut::with_capacity(10);
        FramebufferUpdateRequest {
            incremental,
            x,
            y,
            width,
            height,
        }
        .encode(&mut out);
        self.transport.send(&out);
    }

    /// Dispatch once on the current stage. Returns the bytes consumed.
    fn step(&mut self) -> usize {
        match self.state {
            ProtocolState::AwaitingVersion => self.step_version(),
            ProtocolState::AwaitingSecurityList => self.step_security_list(),
            ProtocolState::AwaitingSecurityTypes => self.step_security_types(),
            ProtocolState::Authenticating => self.step_authenticating(),
            ProtocolState::AwaitingVncChallenge => self.step_vnc_challenge(),
            // ARD challenge handling is a stub: the stage never advances.
            ProtocolState::AwaitingArdChallenge => 0,
            ProtocolState::AwaitingAuthResult => self.step_auth_result(),
            ProtocolState::AwaitingFailureReason => self.step_failure_reason(),
            ProtocolState::Initializing => self.step_initializing(),
            ProtocolState::AwaitingServerInit => self.step_server_init(),
            ProtocolState::Setup => self.step_setup(),
            ProtocolState::Connected => self.step_connected(),
            ProtocolState::ProtocolFailure => 0,
        }
    }

    /// Record a terminal protocol error.
    fn fail(&mut self, code: ErrorCode, message: &str) {
        warn!(%code, message, state = ?self.state, "protocol failure");
        self.transport.set_error(code, message);
        self.state = ProtocolState::ProtocolFailure;
    }

    fn transition(&mut self, next: ProtocolState) {
        debug!(from = ?self.state, to = ?next, "protocol stage advanced");
        self.state = next;
    }

    fn step_version(&mut self) -> usize {
        let line = {
            let buf = self.transport.receive_buffer();
            if buf.len() < VERSION_LINE_LEN {
                return 0;
            }
            let mut line = [0u8; VERSION_LINE_LEN];
            line.copy_from_slice(&buf[..VERSION_LINE_LEN]);
            line
        };

        let Some(version) = ProtocolVersion::parse(&line) else {
            self.fail(ErrorCode::ProtocolError, "unknown remote control protocol");
            return 0;
        };

        // The client claims the same version the server announced.
        self.transport.send(&line);
        self.transport.consume(VERSION_LINE_LEN);
        self.version = Some(version);
        debug!(major = version.major, minor = version.minor, "negotiated protocol version");

        if version.is_pre_3_7() {
            self.transition(ProtocolState::AwaitingSecurityList);
        } else {
            self.transition(ProtocolState::AwaitingSecurityTypes);
        }
        VERSION_LINE_LEN
    }

    fn step_security_list(&mut self) -> usize {
        // Legacy negotiation reads the word as received, no byte swap.
        let word = {
            let mut cur = rfb_wire::WireCursor::new(self.transport.receive_buffer());
            match cur.try_u32_native() {
                Some(word) => word,
                None => return 0,
            }
        };

        if word == 0 {
            self.fail(
                ErrorCode::ProtocolError,
                "server refused remote control connection",
            );
            return 0;
        }

        self.security_type = word;
        self.transport.consume(4);
        self.transition(ProtocolState::Authenticating);
        4
    }

    fn step_security_types(&mut self) -> usize {
        enum ListAction {
            Refused,
            Chosen { ty: u8, span: usize },
            Unsupported { span: usize },
        }

        let action = {
            let buf = self.transport.receive_buffer();
            let Some(&count) = buf.first() else {
                return 0;
            };
            let count = usize::from(count);
            if count == 0 {
                ListAction::Refused
            } else if buf.len() >= 1 + count {
                match choose_security_type(&buf[1..1 + count]) {
                    Some(ty) => ListAction::Chosen {
                        ty,
                        span: 1 + count,
                    },
                    None => ListAction::Unsupported { span: 1 + count },
                }
            } else {
                return 0;
            }
        };

        match action {
            ListAction::Refused => {
                self.transport.set_error(
                    ErrorCode::ProtocolError,
                    "server refused remote control connection",
                );
                self.transport.consume(1);
                self.transition(ProtocolState::AwaitingFailureReason);
                1
            }
            ListAction::Chosen { ty, span } => {
                debug!(security_type = ty, "chose security type");
                self.transport.send(&[ty]);
                self.security_type = u32::from(ty);
                self.transport.consume(span);
                self.transition(ProtocolState::Authenticating);
                span
            }
            ListAction::Unsupported { span } => {
                self.transport.consume(span);
                self.fail(
                    ErrorCode::ProtocolError,
                    "server does not support a usable authentication mode",
                );
                span
            }
        }
    }

    fn step_authenticating(&mut self) -> usize {
        match self.security_type {
            ty if ty == u32::from(SECURITY_NONE) => {
                // Up to 3.7 the None type has no SecurityResult phase.
                let legacy = self.version.map_or(false, |v| v.is_at_most_3_7());
                if legacy {
                    self.transition(ProtocolState::Initializing);
                } else {
                    self.transition(ProtocolState::AwaitingAuthResult);
                }
            }
            ty if ty == u32::from(SECURITY_VNC) => {
                self.transition(ProtocolState::AwaitingVncChallenge);
            }
            ty if ty == u32::from(SECURITY_ARD) => {
                self.transition(ProtocolState::AwaitingArdChallenge);
            }
            ty if ty == u32::from(SECURITY_TIGHT) => {
                // Tight negotiation is not implemented; the connection
                // stalls in this stage.
            }
            _ => {}
        }
        0
    }

    fn step_vnc_challenge(&mut self) -> usize {
        let challenge = {
            let buf = self.transport.receive_buffer();
            if buf.len() < CHALLENGE_LEN {
                return 0;
            }
            if self.password.is_empty() {
                None
            } else {
                let mut challenge = [0u8; CHALLENGE_LEN];
                challenge.copy_from_slice(&buf[..CHALLENGE_LEN]);
                Some(challenge)
            }
        };

        let Some(challenge) = challenge else {
            // Recoverable: the same challenge bytes stay buffered and are
            // re-checked once the caller supplies a password.
            if self.transport.error_code() != Some(ErrorCode::PasswordRequired) {
                warn!("authentication needs a password");
                self.transport
                    .set_error(ErrorCode::PasswordRequired, "your password is needed");
            }
            return 0;
        };

        let cipher = C::with_key(derive_key(&self.password));
        let response = challenge_response(&cipher, &challenge);
        self.transport.send(&response);
        self.transport.consume(CHALLENGE_LEN);
        self.transition(ProtocolState::AwaitingAuthResult);
        CHALLENGE_LEN
    }

    fn step_auth_result(&mut self) -> usize {
        let result = {
            let buf = self.transport.receive_buffer();
            if buf.len() < 4 {
                return 0;
            }
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&buf[..4]);
            u32::from_be_bytes(raw)
        };
        self.transport.consume(4);

        match result {
            0 => self.transition(ProtocolState::Initializing),
            2 => {
                self.transport.set_error(
                    ErrorCode::TooManyAttempts,
                    "too many attempts to login to server",
                );
                self.transition(ProtocolState::AwaitingFailureReason);
            }
            _ => {
                self.transport
                    .set_error(ErrorCode::LoginFailed, "unable to login to server");
                self.transition(ProtocolState::AwaitingFailureReason);
            }
        }
        4
    }

    fn step_failure_reason(&mut self) -> usize {
        // 3.7 and older send no reason text.
        if self.version.map_or(true, |v| v.is_at_most_3_7()) {
            self.transition(ProtocolState::ProtocolFailure);
            return 0;
        }

        let parsed = {
            let buf = self.transport.receive_buffer();
            let mut cur = rfb_wire::WireCursor::new(buf);
            cur.try_u32().and_then(|len| {
                let reason = cur.try_bytes(len as usize)?.to_vec();
                Some((reason, cur.consumed()))
            })
        };
        let Some((reason, span)) = parsed else {
            return 0;
        };

        warn!(reason = %String::from_utf8_lossy(&reason), "server reported failure reason");
        self.failure_reason = reason;
        self.transport.consume(span);
        self.transition(ProtocolState::ProtocolFailure);
        span
    }

    fn step_initializing(&mut self) -> usize {
        // Ask for a shared session; emit-only, nothing is consumed.
        let mut out = BytesMut::with_capacity(1);
        ClientInit { shared: true }.encode(&mut out);
        self.transport.send(&out);
        self.transition(ProtocolState::AwaitingServerInit);
        0
    }

    fn step_server_init(&mut self) -> usize {
        let Some((init, span)) = ServerInit::try_parse(self.transport.receive_buffer()) else {
            return 0;
        };

        debug!(
            width = init.width,
            height = init.height,
            bits_per_pixel = init.bits_per_pixel,
            name = %String::from_utf8_lossy(&init.name),
            "server initialization complete"
        );
        self.framebuffer
            .configure(init.width, init.height, init.bytes_per_pixel());
        self.server_name = init.name;
        self.transport.consume(span);
        self.transition(ProtocolState::Setup);
        span
    }

    fn step_setup(&mut self) -> usize {
        // Declare raw as the only supported encoding; emit-only.
        let mut out = BytesMut::with_capacity(8);
        SetEncodings::raw_only().encode(&mut out);
        self.transport.send(&out);
        self.transition(ProtocolState::Connected);
        0
    }

    fn step_connected(&mut self) -> usize {
        let Some(&tag) = self.transport.receive_buffer().first() else {
            return 0;
        };

        match tag {
            SERVER_MSG_FRAMEBUFFER_UPDATE => self.step_framebuffer_update(),
            SERVER_MSG_SET_COLOR_MAP => {
                let span = skip_color_map(self.transport.receive_buffer());
                self.consume_skipped(span, "color map entries")
            }
            SERVER_MSG_BELL => {
                let span = skip_bell(self.transport.receive_buffer());
                self.consume_skipped(span, "bell")
            }
            SERVER_MSG_CUT_TEXT => {
                let span = skip_cut_text(self.transport.receive_buffer());
                self.consume_skipped(span, "clipboard text")
            }
            other => {
                self.fail(
                    ErrorCode::Unsupported,
                    &format!("server sent unsupported message type {other}"),
                );
                0
            }
        }
    }

    fn consume_skipped(&mut self, span: Option<usize>, what: &str) -> usize {
        let Some(span) = span else {
            return 0;
        };
        trace!(bytes = span, "skipped {what} message");
        self.transport.consume(span);
        span
    }

    fn step_framebuffer_update(&mut self) -> usize {
        let outcome = scan_update(
            self.transport.receive_buffer(),
            self.framebuffer.bytes_per_pixel(),
        );

        match outcome {
            // All-or-nothing: the whole batch is retried from its start on
            // the next poll once more bytes arrive.
            UpdateScan::Incomplete => 0,
            UpdateScan::Unsupported { encoding } => {
                self.fail(
                    ErrorCode::Unsupported,
                    &format!("server sent unsupported encoding {encoding}"),
                );
                0
            }
            UpdateScan::Complete(batch) => {
                {
                    let buf = self.transport.receive_buffer();
                    for scanned in &batch.rects {
                        let payload =
                            &buf[scanned.payload_offset..scanned.payload_offset + scanned.payload_len];
                        self.framebuffer.apply_rect(scanned.rect, payload);
                    }
                }
                trace!(
                    rectangles = batch.rects.len(),
                    bytes = batch.total_len,
                    "applied framebuffer update"
                );
                self.transport.consume(batch.total_len);
                batch.total_len
            }
        }
    }
}
