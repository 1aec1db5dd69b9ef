use serde::{Deserialize, Serialize};

/// Rectangle of a detected barcode in view coordinates.
///
/// Used to draw the success overlay while the navigation debounce runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScanBounds {
    pub const ZERO: ScanBounds = ScanBounds {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}
