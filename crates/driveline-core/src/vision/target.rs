//! Detected blob bounding boxes

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One detected blob within one camera frame
///
/// An immutable value with no identity beyond structural equality; created
/// fresh from each frame's measurements and discarded with the frame.
/// Construction does not validate the measurements - malformed upstream
/// input propagates and is rejected only where it would corrupt a
/// computation (see [`Target::aspect_ratio`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Bounding-box left edge
    pub x: f64,
    /// Bounding-box top edge (image row)
    pub y: f64,
    /// Bounding-box width
    pub width: f64,
    /// Bounding-box height
    pub height: f64,
    /// Blob area in pixels
    pub area: f64,
}

impl Target {
    /// Create a target from raw blob measurements
    pub fn new(x: f64, y: f64, width: f64, height: f64, area: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            area,
        }
    }

    /// Height-to-width ratio of the bounding box
    ///
    /// Fails with [`Error::DegenerateGeometry`] when the width is not
    /// positive rather than producing NaN/Inf. The pairing size filter
    /// rejects such blobs before they reach angle estimation.
    pub fn aspect_ratio(&self) -> Result<f64> {
        if self.width <= 0.0 {
            return Err(Error::DegenerateGeometry { width: self.width });
        }
        Ok(self.height / self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let target = Target::new(10.0, 50.0, 60.0, 10.0, 600.0);
        assert!((target.aspect_ratio().unwrap() - 10.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let target = Target::new(0.0, 0.0, 0.0, 8.0, 0.0);
        assert!(matches!(
            target.aspect_ratio(),
            Err(Error::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_structural_equality() {
        let a = Target::new(1.0, 2.0, 3.0, 4.0, 12.0);
        let b = Target::new(1.0, 2.0, 3.0, 4.0, 12.0);
        assert_eq!(a, b);
    }
}
