//! Incremental big-endian decoding over a borrowed byte slice.

/// A non-consuming read cursor over a receive buffer.
///
/// Every `try_*` method either decodes its value and advances the cursor, or
/// returns `None` leaving the cursor position untouched. The caller decides
/// when (and whether) to actually consume [`consumed()`](Self::consumed)
/// bytes from the underlying buffer - typically only after an entire message
/// has been recognized, so that a short read never leaves the stream in a
/// half-parsed position.
///
/// # Examples
///
/// ```
/// use rfb_wire::WireCursor;
///
/// let buf = [0x00, 0x12, 0x34];
/// let mut cur = WireCursor::new(&buf);
/// assert_eq!(cur.try_u8(), Some(0x00));
/// assert_eq!(cur.try_u16(), Some(0x1234));
/// assert_eq!(cur.try_u16(), None); // short buffer, cursor unchanged
/// assert_eq!(cur.consumed(), 3);
/// ```
#[derive(Debug)]
pub struct WireCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireCursor<'a> {
    /// Create a cursor at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes decoded so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bytes still available ahead of the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Decode one byte.
    pub fn try_u8(&mut self) -> Option<u8> {
        let b = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    /// Decode a big-endian u16.
    pub fn try_u16(&mut self) -> Option<u16> {
        let raw = self.try_array::<2>()?;
        Some(u16::from_be_bytes(raw))
    }

    /// Decode a big-endian u32.
    pub fn try_u32(&mut self) -> Option<u32> {
        let raw = self.try_array::<4>()?;
        Some(u32::from_be_bytes(raw))
    }

    /// Decode a big-endian i32.
    pub fn try_i32(&mut self) -> Option<i32> {
        let raw = self.try_array::<4>()?;
        Some(i32::from_be_bytes(raw))
    }

    /// Decode a u32 in host byte order, exactly as the bytes arrived.
    ///
    /// The pre-3.7 security word is the one field this client reads without a
    /// byte swap: the legacy negotiation path only distinguishes zero from
    /// non-zero, and the servers this client targets put the discriminating
    /// byte where a native-order read sees it.
    pub fn try_u32_native(&mut self) -> Option<u32> {
        let raw = self.try_array::<4>()?;
        Some(u32::from_ne_bytes(raw))
    }

    /// Borrow the next `n` bytes without copying.
    pub fn try_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.buf.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    /// Advance past `n` bytes whose content is irrelevant.
    pub fn try_skip(&mut self, n: usize) -> Option<()> {
        if self.remaining() < n {
            return None;
        }
        self.pos += n;
        Some(())
    }

    fn try_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let slice = self.buf.get(self.pos..self.pos + N)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(slice);
        self.pos += N;
        Some(raw)
    }
}
