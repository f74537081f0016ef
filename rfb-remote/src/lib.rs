//! Remote control of a set-top box over the RFB protocol.
//!
//! This crate supplies the outward-facing pieces of the stack: a TCP
//! transport, TOML-loadable configuration, and the [`RemoteController`]
//! facade that owns one session and exposes key injection and optional
//! screen retention as plain method calls.
//!
//! ```no_run
//! use rfb_remote::{keys, Config, RemoteController};
//!
//! # fn main() -> Result<(), rfb_remote::RemoteError> {
//! let config = Config::new("stb.local").with_password("hunter2");
//! let mut remote = RemoteController::new(config)?;
//! remote.connect()?;
//! remote.toggle_key(keys::CHANNEL_UP);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod errors;
pub mod keys;
pub mod transport;

pub use config::Config;
pub use controller::{ControllerState, RemoteController};
pub use errors::RemoteError;
pub use transport::TcpTransport;

pub use rfb_engine::{ErrorCode, ProtocolState};
