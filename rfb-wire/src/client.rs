//! Client-to-server RFB messages.
//!
//! Builders for the four messages this client ever emits after the version
//! echo: ClientInit, SetEncodings, KeyEvent and FramebufferUpdateRequest.
//! Each message encodes itself into a caller-supplied buffer; the transport
//! layer owns when the bytes actually hit the socket.

use bytes::{BufMut, BytesMut};

/// ClientInit message - client initialization.
///
/// Sent once authentication succeeds. Indicates whether the client wants a
/// shared or exclusive session.
///
/// # Wire Format
///
/// - 1 byte: shared flag (0 = exclusive, 1 = shared)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInit {
    pub shared: bool,
}

impl ClientInit {
    /// Encode into `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_u8(u8::from(self.shared));
    }
}

/// SetEncodings message - declare supported encodings.
///
/// # Wire Format
///
/// - 1 byte: message type (2)
/// - 1 byte: padding
/// - 2 bytes: number of encodings
/// - N * 4 bytes: encoding types (signed i32 each)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEncodings {
    pub encodings: Vec<i32>,
}

impl SetEncodings {
    /// The fixed declaration this client sends: raw encoding only.
    pub fn raw_only() -> Self {
        Self {
            encodings: vec![crate::ENCODING_RAW],
        }
    }

    /// Encode into `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_u8(2); // message type
        out.put_u8(0); // padding
        out.put_u16(self.encodings.len() as u16);
        for encoding in &self.encodings {
            out.put_i32(*encoding);
        }
    }
}

/// KeyEvent message - keyboard input.
///
/// The keycode space this client drives is 16-bit; the wire field is the
/// usual 32-bit keysym slot with the high half zero.
///
/// # Wire Format
///
/// - 1 byte: message type (4)
/// - 1 byte: down flag (0 = up, 1 = down)
/// - 2 bytes: padding
/// - 4 bytes: keycode (high 16 bits zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub down: bool,
    pub key: u16,
}

impl KeyEvent {
    /// Encode into `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_u8(4); // message type
        out.put_u8(u8::from(self.down));
        out.put_u16(0); // padding
        out.put_u32(u32::from(self.key));
    }
}

/// FramebufferUpdateRequest message - request screen content.
///
/// # Wire Format
///
/// - 1 byte: message type (3)
/// - 1 byte: incremental (0 = full update, 1 = incremental)
/// - 2 bytes: x position
/// - 2 bytes: y position
/// - 2 bytes: width
/// - 2 bytes: height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferUpdateRequest {
    pub incremental: bool,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl FramebufferUpdateRequest {
    /// Encode into `out`.
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_u8(3); // message type
        out.put_u8(u8::from(self.incremental));
        out.put_u16(self.x);
        out.put_u16(self.y);
        out.put_u16(self.width);
        out.put_u16(self.height);
    }
}
