//! Physical sizes used by the datasheet layout. All values are millimetres.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    /// Width over height. Degenerate sizes report a ratio of 1.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 || self.width <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// True if this size fits inside `other` (with a small tolerance for float noise).
    pub fn fits_within(&self, other: Size) -> bool {
        const EPSILON: f32 = 0.001;
        self.width <= other.width + EPSILON && self.height <= other.height + EPSILON
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Size::new(80.0, 40.0).aspect_ratio(), 2.0);
        assert_eq!(Size::zero().aspect_ratio(), 1.0);
    }

    #[test]
    fn test_fits_within() {
        assert!(Size::new(50.0, 25.0).fits_within(Size::new(50.0, 40.0)));
        assert!(!Size::new(50.1, 25.0).fits_within(Size::new(50.0, 40.0)));
    }
}
