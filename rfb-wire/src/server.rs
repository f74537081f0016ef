//! Server-to-client RFB messages: incremental parsers and skippers.
//!
//! Each parser operates on the receive buffer as it currently stands and
//! reports either the complete message (with the exact byte count it spans)
//! or "not all here yet" without touching anything. Messages whose content
//! this client does not interpret (color map entries, bell, clipboard) get
//! skippers that compute the span to drop.

use crate::cursor::WireCursor;
use rfb_common::Rect;

/// Server message type tag: framebuffer update.
pub const SERVER_MSG_FRAMEBUFFER_UPDATE: u8 = 0;
/// Server message type tag: color map entries.
pub const SERVER_MSG_SET_COLOR_MAP: u8 = 1;
/// Server message type tag: bell.
pub const SERVER_MSG_BELL: u8 = 2;
/// Server message type tag: clipboard text.
pub const SERVER_MSG_CUT_TEXT: u8 = 3;

/// ServerInit message - screen geometry and session name.
///
/// # Wire Format
///
/// - 2 bytes: framebuffer width
/// - 2 bytes: framebuffer height
/// - 16 bytes: pixel format, of which only the leading bits-per-pixel byte
///   is interpreted (the client assumes a raw bytes-per-pixel layout and
///   ignores depth, endianness and the channel maxima/shifts)
/// - 4 bytes: name length
/// - N bytes: name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInit {
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub name: Vec<u8>,
}

impl ServerInit {
    /// Pixel bytes per pixel as negotiated: bits-per-pixel / 8.
    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.bits_per_pixel / 8)
    }

    /// Try to parse a complete ServerInit from the front of `buf`.
    ///
    /// Returns the message and the number of bytes it spans, or `None` while
    /// the fixed 24-byte head or the trailing name is still incomplete.
    pub fn try_parse(buf: &[u8]) -> Option<(Self, usize)> {
        let mut cur = WireCursor::new(buf);
        let width = cur.try_u16()?;
        let height = cur.try_u16()?;
        let bits_per_pixel = cur.try_u8()?;
        cur.try_skip(15)?; // rest of the pixel format block
        let name_len = cur.try_u32()? as usize;
        let name = cur.try_bytes(name_len)?.to_vec();
        Some((
            Self {
                width,
                height,
                bits_per_pixel,
                name,
            },
            cur.consumed(),
        ))
    }
}

/// One raw-encoded rectangle located inside a scanned update batch.
///
/// Offsets are relative to the start of the update message (the type byte),
/// so the payload can be sliced straight out of the receive buffer before
/// the batch is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedRect {
    pub rect: Rect,
    pub payload_offset: usize,
    pub payload_len: usize,
}

/// A fully-buffered framebuffer update batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBatch {
    /// Total bytes the update spans, type byte through last pixel.
    pub total_len: usize,
    pub rects: Vec<ScannedRect>,
}

/// Outcome of scanning a framebuffer update against the current buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateScan {
    /// The batch is not fully buffered yet; nothing may be consumed.
    Incomplete,
    /// A rectangle carries an encoding other than raw. The update cannot be
    /// decoded at all; raw is the only encoding this client declared.
    Unsupported { encoding: i32 },
    /// Every rectangle is present and raw-encoded.
    Complete(UpdateBatch),
}

/// Scan a framebuffer update whose type byte sits at `buf[0]`.
///
/// The update is all-or-nothing: no rectangle is reported until the entire
/// batch (header plus every rectangle's header and pixel payload) is
/// buffered, so the caller either consumes the whole span or retries the
/// whole message on the next poll. An unsupported encoding tag is reported
/// as soon as its rectangle header is visible, before any pixel data is
/// handed out.
///
/// # Wire Format
///
/// - 1 byte: message type (0)
/// - 1 byte: padding
/// - 2 bytes: number of rectangles
/// - per rectangle: x, y, width, height (u16 each), encoding (i32), then
///   width * height * `bytes_per_pixel` pixel bytes for raw encoding
pub fn scan_update(buf: &[u8], bytes_per_pixel: usize) -> UpdateScan {
    let mut cur = WireCursor::new(buf);
    let header = (|| {
        cur.try_skip(2)?; // type byte + padding
        cur.try_u16()
    })();
    let Some(count) = header else {
        return UpdateScan::Incomplete;
    };

    let mut rects = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let rect_head = (|| {
            let x = cur.try_u16()?;
            let y = cur.try_u16()?;
            let width = cur.try_u16()?;
            let height = cur.try_u16()?;
            let encoding = cur.try_i32()?;
            Some((Rect::new(x, y, width, height), encoding))
        })();
        let Some((rect, encoding)) = rect_head else {
            return UpdateScan::Incomplete;
        };

        if encoding != crate::ENCODING_RAW {
            return UpdateScan::Unsupported { encoding };
        }

        let payload_len = rect.area() as usize * bytes_per_pixel;
        let payload_offset = cur.consumed();
        if cur.try_skip(payload_len).is_none() {
            return UpdateScan::Incomplete;
        }
        rects.push(ScannedRect {
            rect,
            payload_offset,
            payload_len,
        });
    }

    UpdateScan::Complete(UpdateBatch {
        total_len: cur.consumed(),
        rects,
    })
}

/// Compute the span of a SetColorMapEntries message at `buf[0]`.
///
/// Header is 6 bytes (type, padding, first color, entry count), each entry
/// is 6 bytes of RGB intensities. The entries are not interpreted; the
/// client never subscribes to a color map.
pub fn skip_color_map(buf: &[u8]) -> Option<usize> {
    let mut cur = WireCursor::new(buf);
    cur.try_skip(4)?; // type, padding, first color
    let count = cur.try_u16()?;
    cur.try_skip(usize::from(count) * 6)?;
    Some(cur.consumed())
}

/// Compute the span of a Bell message at `buf[0]`: exactly its 1 type byte.
pub fn skip_bell(buf: &[u8]) -> Option<usize> {
    let mut cur = WireCursor::new(buf);
    cur.try_u8()?;
    Some(cur.consumed())
}

/// Compute the span of a ServerCutText message at `buf[0]`.
///
/// Header is 8 bytes (type, 3 padding, text length), followed by the text,
/// which is discarded rather than surfaced.
pub fn skip_cut_text(buf: &[u8]) -> Option<usize> {
    let mut cur = WireCursor::new(buf);
    cur.try_skip(4)?; // type + padding
    let len = cur.try_u32()? as usize;
    cur.try_skip(len)?;
    Some(cur.consumed())
}
