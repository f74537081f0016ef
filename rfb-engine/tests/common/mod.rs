//! Shared test harness: a scripted in-memory transport.

use std::time::Duration;

use rfb_engine::{ErrorCode, ErrorSlot, Transport};

/// In-memory transport that plays back a scripted server byte stream.
///
/// Bytes queued with [`feed`](Self::feed) become visible to the engine in
/// `chunk`-sized installments, one installment per `advance` call, which
/// models arbitrary TCP read fragmentation.
pub struct ScriptedTransport {
    pending: Vec<u8>,
    buffer: Vec<u8>,
    pub sent: Vec<u8>,
    chunk: usize,
    errors: ErrorSlot,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            buffer: Vec::new(),
            sent: Vec::new(),
            chunk: usize::MAX,
            errors: ErrorSlot::new(),
        }
    }

    /// Deliver at most `chunk` scripted bytes per `advance` call.
    pub fn with_chunk_size(chunk: usize) -> Self {
        let mut t = Self::new();
        t.chunk = chunk.max(1);
        t
    }

    /// Queue server bytes for delivery.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// True once every scripted byte has been delivered and consumed.
    pub fn drained(&self) -> bool {
        self.pending.is_empty() && self.buffer.is_empty()
    }

    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sent)
    }

}

impl Transport for ScriptedTransport {
    fn advance(&mut self, _timeout: Duration) -> bool {
        if !self.pending.is_empty() {
            let n = self.chunk.min(self.pending.len());
            self.buffer.extend(self.pending.drain(..n));
        }
        true
    }

    fn is_link_connected(&self) -> bool {
        true
    }

    fn receive_buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn consume(&mut self, n: usize) {
        self.buffer.drain(..n);
    }

    fn send(&mut self, bytes: &[u8]) {
        self.sent.extend_from_slice(bytes);
    }

    fn error_code(&self) -> Option<ErrorCode> {
        self.errors.code()
    }

    fn last_error(&self) -> Option<&str> {
        self.errors.message()
    }

    fn set_error(&mut self, code: ErrorCode, message: &str) {
        self.errors.set(code, message);
    }

    fn clear_error(&mut self) {
        self.errors.clear();
    }
}

/// ServerInit bytes for a screen of the given geometry and pixel depth.
pub fn server_init(width: u16, height: u16, bits_per_pixel: u8, name: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(24 + name.len());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.push(bits_per_pixel);
    out.extend_from_slice(&[0u8; 15]);
    out.extend_from_slice(&(name.len() as u32).to_be_bytes());
    out.extend_from_slice(name);
    out
}

/// A FramebufferUpdate message holding raw-encoded rectangles.
pub fn framebuffer_update(rects: &[(u16, u16, u16, u16, &[u8])]) -> Vec<u8> {
    let mut out = vec![0u8, 0];
    out.extend_from_slice(&(rects.len() as u16).to_be_bytes());
    for &(x, y, w, h, payload) in rects {
        out.extend_from_slice(&x.to_be_bytes());
        out.extend_from_slice(&y.to_be_bytes());
        out.extend_from_slice(&w.to_be_bytes());
        out.extend_from_slice(&h.to_be_bytes());
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(payload);
    }
    out
}
