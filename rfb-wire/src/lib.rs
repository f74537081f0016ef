//! Incremental wire codec for the RFB (Remote Framebuffer) protocol.
//!
//! This crate implements the byte-level half of the client: big-endian
//! decoding over a buffered receive window, and builders for the handful of
//! client-to-server messages the remote-control engine emits.
//!
//! # Incremental decoding
//!
//! The protocol engine consumes bytes from an accumulating receive buffer
//! where any message may arrive split across an arbitrary number of reads.
//! Every parser here is therefore written against one primitive,
//! [`WireCursor`]: try to decode a complete message prefix, and either
//! report "need more data" (by returning `None` without side effects) or
//! report the exact number of bytes the message occupied. Callers only
//! consume bytes from the underlying buffer once a whole message has been
//! recognized, so a partially-received message is always retried from its
//! start on the next poll.
//!
//! # Wire format
//!
//! All multi-byte integers are network byte order (big-endian) per the RFB
//! specification, with one deliberate exception documented at
//! [`WireCursor::try_u32_native`].

pub mod client;
pub mod cursor;
#[cfg(test)]
mod proptest_framing;
pub mod server;
pub mod version;

pub use client::{ClientInit, FramebufferUpdateRequest, KeyEvent, SetEncodings};
pub use cursor::WireCursor;
pub use server::{
    scan_update, skip_bell, skip_color_map, skip_cut_text, ScannedRect, ServerInit, UpdateBatch,
    UpdateScan, SERVER_MSG_BELL, SERVER_MSG_CUT_TEXT, SERVER_MSG_FRAMEBUFFER_UPDATE,
    SERVER_MSG_SET_COLOR_MAP,
};
pub use version::{ProtocolVersion, VERSION_LINE_LEN};

/// The only framebuffer encoding this client negotiates: raw pixels.
pub const ENCODING_RAW: i32 = 0;
