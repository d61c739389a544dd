//! Page sizes and points (PDF points, origin bottom-left)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Dimensions multiplied by a preview scale factor
    pub fn scaled(&self, scale: f64) -> Size {
        Size::new(self.width * scale, self.height * scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Common paper sizes
pub mod page_sizes {
    use super::Size;

    pub const A3: Size = Size::new(841.89, 1190.55);
    pub const A4: Size = Size::new(595.28, 841.89);
    pub const A5: Size = Size::new(419.53, 595.28);
    pub const LETTER: Size = Size::new(612.0, 792.0);
    pub const LEGAL: Size = Size::new(612.0, 1008.0);
}
