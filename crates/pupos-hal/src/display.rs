//! [`EyeDisplay`] – the monochrome screen the eye animation draws on.
//!
//! Frames follow a clear → draw → commit protocol: nothing reaches the
//! physical screen until [`EyeDisplay::commit`] is called.

use pupos_types::PupError;

/// Axis-aligned rectangle in screen pixels, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Fill color for drawn shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Black,
    White,
}

/// Buffered display driver.
pub trait EyeDisplay: Send + Sync {
    /// Blank the draw buffer.
    fn clear(&self) -> Result<(), PupError>;

    /// Draw a filled rectangle into the buffer.
    fn draw_rectangle(&self, bounds: Rect, fill: Fill) -> Result<(), PupError>;

    /// Apply pending changes to the screen.
    fn commit(&self) -> Result<(), PupError>;
}
