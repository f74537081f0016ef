//! Transport-independent RFB client engine.
//!
//! This crate contains the protocol state machine that takes a byte stream
//! from some [`Transport`] and drives an RFB session through version
//! negotiation, security negotiation, authentication, initialization and
//! into the connected phase, where it decodes server messages and injects
//! key events.
//!
//! The engine never blocks and never spawns: all forward progress happens
//! inside [`ProtocolEngine::poll`], which the caller invokes from its own
//! loop. Decoding is strictly incremental - a message is consumed from the
//! receive buffer only once all of its bytes are present, so the engine
//! behaves identically however the transport fragments its reads.
//!
//! Pixel data from framebuffer updates is validated and consumed always,
//! and additionally retained in a [`RetainedFramebuffer`] when the caller
//! opts in.

pub mod engine;
pub mod framebuffer;
pub mod state;
pub mod transport;

pub use engine::ProtocolEngine;
pub use framebuffer::RetainedFramebuffer;
pub use state::ProtocolState;
pub use transport::{ErrorCode, ErrorSlot, Transport};

pub use rfb_auth::{ChallengeCipher, DesCipher};
