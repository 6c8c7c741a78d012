//! Pair discovery and approach-angle estimation
//!
//! Two blobs at nearly the same image row are treated as the two strips of
//! one marker. The approach angle comes from a quadratic fitted to the
//! pair's mean aspect ratio; the coefficients are a calibration artifact of
//! one camera/marker geometry and are carried as configuration, not
//! constants.

use serde::{Deserialize, Serialize};

use super::Target;
use crate::Result;

/// Quadratic angle calibration: `angle = a*r^2 + b*r + c`
///
/// `r` is a pair's mean height-to-width ratio and the output is a signed
/// angle in degrees with no defined valid range - nothing is clamped.
/// The defaults were fitted empirically to one physical camera and marker;
/// different optics need recalibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleCalibration {
    /// Quadratic coefficient
    pub a: f64,
    /// Linear coefficient
    pub b: f64,
    /// Constant term
    pub c: f64,
}

impl Default for AngleCalibration {
    fn default() -> Self {
        Self {
            a: -89.85,
            b: 313.72,
            c: -219.194,
        }
    }
}

impl AngleCalibration {
    /// Evaluate the quadratic at the given ratio
    pub fn angle_for_ratio(&self, ratio: f64) -> f64 {
        self.a * ratio * ratio + self.b * ratio + self.c
    }
}

/// Pairing engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Maximum vertical distance between two blobs of one pair
    pub y_tolerance: f64,
    /// Minimum blob height to survive the noise filter
    pub min_height: f64,
    /// Minimum blob width to survive the noise filter
    pub min_width: f64,
    /// Angle estimation coefficients
    pub calibration: AngleCalibration,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            y_tolerance: 5.0,
            min_height: 3.0,
            min_width: 50.0,
            calibration: AngleCalibration::default(),
        }
    }
}

impl PairingConfig {
    /// Set the vertical pairing tolerance
    pub fn with_y_tolerance(mut self, tolerance: f64) -> Self {
        self.y_tolerance = tolerance;
        self
    }

    /// Set the minimum blob size filter
    pub fn with_min_size(mut self, min_width: f64, min_height: f64) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    /// Set the angle calibration
    pub fn with_calibration(mut self, calibration: AngleCalibration) -> Self {
        self.calibration = calibration;
        self
    }
}

/// Two targets judged to be halves of one marker
///
/// Unordered: equality is set-equality over the members. Created per frame
/// by the engine and discarded with the frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pair {
    a: Target,
    b: Target,
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl Pair {
    fn new(a: Target, b: Target) -> Self {
        Self { a, b }
    }

    /// First member in enumeration order
    pub fn first(&self) -> &Target {
        &self.a
    }

    /// Second member in enumeration order
    pub fn second(&self) -> &Target {
        &self.b
    }

    /// Mean of the two halves' height-to-width ratios
    pub fn mean_aspect_ratio(&self) -> Result<f64> {
        Ok((self.a.aspect_ratio()? + self.b.aspect_ratio()?) / 2.0)
    }

    /// Estimated approach angle in degrees
    ///
    /// Deterministic: identical inputs yield bit-identical output.
    pub fn angle(&self, calibration: &AngleCalibration) -> Result<f64> {
        Ok(calibration.angle_for_ratio(self.mean_aspect_ratio()?))
    }

    /// Summed area of both members, used for best-pair selection
    pub fn combined_area(&self) -> f64 {
        self.a.area + self.b.area
    }
}

/// Per-frame pair discovery over a blob list
#[derive(Debug, Clone, Default)]
pub struct PairingEngine {
    config: PairingConfig,
}

impl PairingEngine {
    /// Create an engine with the given configuration
    pub fn new(config: PairingConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration
    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Whether a blob survives the minimum-size noise filter
    ///
    /// Applied before pair discovery, not inside the compatibility
    /// predicate. Eligible blobs always have positive width, so angle
    /// estimation downstream cannot see degenerate geometry.
    pub fn eligible(&self, target: &Target) -> bool {
        target.height > self.config.min_height && target.width > self.config.min_width
    }

    /// Whether two blobs are compatible halves of one marker
    ///
    /// A cheap proximity heuristic: paired strips appear at nearly the same
    /// image row. Symmetric in its arguments.
    pub fn compatible(&self, a: &Target, b: &Target) -> bool {
        (a.y - b.y).abs() <= self.config.y_tolerance
    }

    /// All compatible unordered pairs among the eligible blobs of a frame
    ///
    /// A blob may appear in several pairs when compatible with several
    /// others; callers wanting a single estimate use
    /// [`PairingEngine::best_pair`].
    pub fn find_pairs(&self, targets: &[Target]) -> Vec<Pair> {
        let eligible: Vec<Target> = targets
            .iter()
            .copied()
            .filter(|t| self.eligible(t))
            .collect();
        let mut pairs = Vec::new();
        for (i, a) in eligible.iter().enumerate() {
            for b in &eligible[i + 1..] {
                if self.compatible(a, b) {
                    pairs.push(Pair::new(*a, *b));
                }
            }
        }
        pairs
    }

    /// The pair with the largest combined area
    ///
    /// Enumeration order breaks exact ties.
    pub fn best_pair(&self, targets: &[Target]) -> Option<Pair> {
        self.find_pairs(targets)
            .into_iter()
            .reduce(|best, candidate| {
                if candidate.combined_area() > best.combined_area() {
                    candidate
                } else {
                    best
                }
            })
    }

    /// Approach angle of the best pair, if the frame contains one
    pub fn estimate_angle(&self, targets: &[Target]) -> Option<f64> {
        let pair = self.best_pair(targets)?;
        // The size filter guarantees positive widths for every pair member.
        pair.angle(&self.config.calibration).ok()
    }
}
