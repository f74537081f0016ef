//! Common types shared across the RFB remote-control crates.
//!
//! This crate provides the small geometry vocabulary used when composing
//! framebuffer update rectangles into a screen buffer:
//! - [`Rect`] - Rectangle in protocol coordinates (u16, as carried on the wire)

/// A rectangle in RFB protocol coordinates.
///
/// Positions and dimensions are `u16` because that is exactly what the wire
/// carries; arithmetic that could overflow (right/bottom edges, byte sizes)
/// widens to `u32`/`usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge (x + width).
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// Get the bottom edge (y + height).
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// Get the area of the rectangle in pixels.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True if the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip this rectangle against a `bounds_width` x `bounds_height` screen
    /// anchored at the origin.
    ///
    /// The position is clamped into the bounds and the extent shortened so
    /// that `right() <= bounds_width` and `bottom() <= bounds_height`. A
    /// rectangle entirely outside the bounds clips to an empty one.
    pub fn clipped_to(&self, bounds_width: u16, bounds_height: u16) -> Rect {
        let left = self.x.min(bounds_width);
        let top = self.y.min(bounds_height);
        let right = self.right().min(bounds_width as u32) as u16;
        let bottom = self.bottom().min(bounds_height as u32) as u16;
        Rect::new(left, top, right - left, bottom - top)
    }
}
