//! High-level session facade for driving a set-top box.

use std::time::Instant;

use tracing::{debug, info, warn};

use rfb_engine::{ErrorCode, ProtocolEngine, ProtocolState, Transport};

use crate::config::Config;
use crate::errors::RemoteError;
use crate::transport::TcpTransport;

/// Composite session state as seen by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// A fatal error is latched; inspect [`RemoteController::error_code`].
    Failure,
    /// No session, or the link has been torn down.
    Disconnected,
    /// TCP link is up, protocol handshake not yet complete.
    Connecting,
    /// Session established; key injection is live.
    Connected,
}

/// One remote-control session over TCP.
///
/// Wraps a [`ProtocolEngine`] and hides the pump: every command method
/// polls once after sending, so callers interact with plain blocking-style
/// calls. Methods are no-ops while no session exists.
pub struct RemoteController {
    config: Config,
    engine: Option<ProtocolEngine<TcpTransport>>,
}

impl RemoteController {
    pub fn new(config: Config) -> Result<Self, RemoteError> {
        config.validate()?;
        Ok(Self {
            config,
            engine: None,
        })
    }

    /// Establish the TCP link and pump the handshake until the session is
    /// up, a protocol error is latched, or the configured timeout elapses.
    ///
    /// A recoverable credential request also returns: check
    /// [`needs_credentials`](Self::needs_credentials), supply them, and
    /// call [`resume`](Self::resume).
    pub fn connect(&mut self) -> Result<(), RemoteError> {
        self.disconnect();

        info!(host = %self.config.host, port = self.config.port, "connecting");
        let transport = TcpTransport::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout(),
        )?;

        let mut engine = ProtocolEngine::new(transport);
        engine.set_keep_framebuffer(self.config.keep_framebuffer);
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => engine.set_credentials(user.as_bytes(), pass.as_bytes()),
            (None, Some(pass)) => engine.set_password(pass.as_bytes()),
            _ => {}
        }
        self.engine = Some(engine);
        self.pump_until_settled();
        Ok(())
    }

    /// Continue a handshake stalled on a credential request, after the
    /// credentials have been supplied.
    pub fn resume(&mut self) {
        self.pump_until_settled();
    }

    fn pump_until_settled(&mut self) {
        let deadline = Instant::now() + self.config.connect_timeout();
        let poll_timeout = self.config.poll_timeout();
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        while engine.poll(poll_timeout) {
            if engine.is_protocol_connected() {
                info!(
                    name = %String::from_utf8_lossy(engine.server_name()),
                    "session established"
                );
                break;
            }
            if engine.transport().error_code().is_some() {
                break;
            }
            if Instant::now() >= deadline {
                warn!(state = ?engine.state(), "handshake timed out");
                engine
                    .transport_mut()
                    .set_error(ErrorCode::TransportFailed, "handshake timed out");
                break;
            }
        }
    }

    /// Drop the session. Safe to call at any time.
    pub fn disconnect(&mut self) {
        if self.engine.take().is_some() {
            debug!("session closed");
        }
    }

    /// Composite session state.
    pub fn state(&self) -> ControllerState {
        let Some(engine) = self.engine.as_ref() else {
            return ControllerState::Disconnected;
        };
        if !engine.transport().is_link_connected() {
            return ControllerState::Failure;
        }
        if engine.state() == ProtocolState::ProtocolFailure {
            return ControllerState::Failure;
        }
        // A pending credential request is recoverable; anything else
        // latched is not.
        if engine
            .transport()
            .error_code()
            .map_or(false, |code| !code.is_credential_request())
        {
            return ControllerState::Failure;
        }
        if engine.is_protocol_connected() {
            return ControllerState::Connected;
        }
        ControllerState::Connecting
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ControllerState::Connected
    }

    /// Latched error, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.engine.as_ref().and_then(|e| e.transport().error_code())
    }

    /// Human-readable text for the latched error.
    pub fn last_error(&self) -> Option<String> {
        self.engine
            .as_ref()
            .and_then(|e| e.transport().last_error().map(str::to_owned))
    }

    /// True while the handshake is stalled waiting for credentials.
    pub fn needs_credentials(&self) -> bool {
        self.error_code()
            .map_or(false, |code| code.is_credential_request())
    }

    /// Supply a password mid-handshake; call [`resume`](Self::resume)
    /// afterwards.
    pub fn set_password(&mut self, password: &str) {
        self.config.password = Some(password.to_owned());
        if let Some(engine) = self.engine.as_mut() {
            engine.set_password(password.as_bytes());
        }
    }

    /// Supply username and password mid-handshake.
    pub fn set_credentials(&mut self, username: &str, password: &str) {
        self.config.username = Some(username.to_owned());
        self.config.password = Some(password.to_owned());
        if let Some(engine) = self.engine.as_mut() {
            engine.set_credentials(username.as_bytes(), password.as_bytes());
        }
    }

    /// Let the engine process whatever the server has sent.
    pub fn poll(&mut self) {
        let timeout = self.config.poll_timeout();
        if let Some(engine) = self.engine.as_mut() {
            engine.poll(timeout);
        }
    }

    /// Send one half of a key stroke, for keys that are held down.
    pub fn send_key(&mut self, key: u16, down: bool) {
        let timeout = self.config.poll_timeout();
        if let Some(engine) = self.engine.as_mut() {
            engine.send_key(key, down);
            engine.poll(timeout);
        }
    }

    /// Press and release a key, identified by its code.
    pub fn toggle_key(&mut self, key: u16) {
        let timeout = self.config.poll_timeout();
        if let Some(engine) = self.engine.as_mut() {
            engine.pulse_key(key);
            engine.poll(timeout);
        }
    }

    /// Ask the server for the whole screen. Incremental requests only
    /// report regions changed since the previous update.
    pub fn request_screen(&mut self, incremental: bool) {
        let timeout = self.config.poll_timeout();
        if let Some(engine) = self.engine.as_mut() {
            let (width, height) = (engine.framebuffer().width(), engine.framebuffer().height());
            engine.request_screen(incremental, 0, 0, width, height);
            engine.poll(timeout);
        }
    }

    /// Screen geometry announced by the server, in pixels.
    pub fn screen_size(&self) -> Option<(u16, u16)> {
        self.engine.as_ref().map(|e| {
            let fb = e.framebuffer();
            (fb.width(), fb.height())
        })
    }

    /// Retained screen pixels, when retention is enabled and at least one
    /// update has landed.
    pub fn screen_data(&self) -> Option<&[u8]> {
        self.engine.as_ref().and_then(|e| e.framebuffer().data())
    }

    /// Counter that advances once per decoded screen rectangle.
    pub fn screen_version(&self) -> u64 {
        self.engine
            .as_ref()
            .map_or(0, |e| e.framebuffer().version())
    }

    /// Session name announced by the server.
    pub fn server_name(&self) -> Option<String> {
        self.engine
            .as_ref()
            .map(|e| String::from_utf8_lossy(e.server_name()).into_owned())
    }
}
