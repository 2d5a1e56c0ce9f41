use serde::{Deserialize, Serialize};
use specsheet_types::Color;

/// A solid stroke around a box. Width is in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

impl Border {
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}
