//! Optional retained screen buffer composed from raw update rectangles.

use rfb_common::Rect;

/// The client-side copy of the remote screen.
///
/// Retention is opt-in: a host that only injects key events never pays for
/// pixel storage, and update decoding advances identically either way. When
/// retention is on, the flat buffer is allocated lazily on the first
/// rectangle and each accepted rectangle overwrites its clipped region.
///
/// The version counter is the sole freshness signal for readers: it bumps
/// once per rectangle applied and never decreases, so a renderer compares
/// counters instead of diffing frames.
#[derive(Debug, Default)]
pub struct RetainedFramebuffer {
    width: u16,
    height: u16,
    bytes_per_pixel: usize,
    keep: bool,
    data: Vec<u8>,
    version: u64,
}

impl RetainedFramebuffer {
    /// A framebuffer with retention disabled and no geometry yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt in or out of pixel retention.
    pub fn set_keep(&mut self, keep: bool) {
        self.keep = keep;
    }

    /// Whether pixel retention is enabled.
    pub fn keeps_pixels(&self) -> bool {
        self.keep
    }

    /// Record the geometry from ServerInit. Set once; read-only thereafter.
    pub fn configure(&mut self, width: u16, height: u16, bytes_per_pixel: usize) {
        self.width = width;
        self.height = height;
        self.bytes_per_pixel = bytes_per_pixel;
    }

    /// Declared screen width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Declared screen height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Negotiated bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Monotonic change counter; equal counters mean unchanged content.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The retained pixels, row-major with stride = width.
    ///
    /// `None` until retention is enabled and the first rectangle arrives.
    pub fn data(&self) -> Option<&[u8]> {
        if self.data.is_empty() {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Apply one raw-encoded rectangle.
    ///
    /// `payload` holds `rect.width * rect.height * bytes_per_pixel` pixel
    /// bytes, row-major. The rectangle is clipped against the declared
    /// geometry; overhang is dropped, never written out of bounds. With
    /// retention disabled this only bumps state the caller cannot observe -
    /// the payload is discarded.
    pub fn apply_rect(&mut self, rect: Rect, payload: &[u8]) {
        if !self.keep {
            return;
        }

        let bpp = self.bytes_per_pixel;
        let full_size = usize::from(self.width) * usize::from(self.height) * bpp;
        if self.data.len() < full_size {
            self.data.resize(full_size, 0);
        }

        let clip = rect.clipped_to(self.width, self.height);
        if !clip.is_empty() {
            // Non-empty clips share the rectangle's origin (positions are
            // unsigned), so only the right and bottom edges were trimmed.
            let row_bytes = usize::from(clip.width) * bpp;
            let src_stride = usize::from(rect.width) * bpp;
            for row in 0..usize::from(clip.height) {
                let src = row * src_stride;
                let dst = (usize::from(clip.y) + row) * usize::from(self.width) * bpp
                    + usize::from(clip.x) * bpp;
                self.data[dst..dst + row_bytes].copy_from_slice(&payload[src..src + row_bytes]);
            }
        }

        self.version += 1;
        tracing::trace!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            version = self.version,
            "applied update rectangle"
        );
    }
}
