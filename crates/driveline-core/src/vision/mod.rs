//! Vision target geometry and pairing
//!
//! Consumes per-frame blob measurements from the external vision pipeline
//! and produces pairs of blobs judged to be the two halves of one physical
//! marker, plus an approach-angle estimate from the best pair.

mod pairing;
mod target;

pub use pairing::{AngleCalibration, Pair, PairingConfig, PairingEngine};
pub use target::Target;
