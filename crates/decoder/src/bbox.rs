use crate::layer::boxes::{CX, CY, H, SIZE, W};

/// Input resolution of the network, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkGeometry {
    pub width: u32,
    pub height: u32,
}

impl NetworkGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Pixel-space box as left/top corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Clamp to `[min, max]`; NaN lands on `min`.
#[inline]
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Convert a normalized cxcywh row into a box clamped to the network input.
///
/// Corners are clamped independently, so boxes hugging the border can come
/// out with zero width or height.
#[inline]
pub fn decode_box(row: &[f32; SIZE], network: NetworkGeometry) -> PixelBox {
    let width = network.width as f32;
    let height = network.height as f32;

    let x1 = (row[CX] - row[W] / 2.0) * width;
    let y1 = (row[CY] - row[H] / 2.0) * height;
    let x2 = x1 + row[W] * width;
    let y2 = y1 + row[H] * height;

    let max_x = width - 1.0;
    let max_y = height - 1.0;

    let x1 = clamp(x1, 0.0, max_x);
    let y1 = clamp(y1, 0.0, max_y);
    let x2 = clamp(x2, 0.0, max_x);
    let y2 = clamp(y2, 0.0, max_y);

    PixelBox {
        left: x1,
        top: y1,
        width: x2 - x1,
        height: y2 - y1,
    }
}
