//! Landmark sets and the scale-normalized measurements derived from them.

mod landmark;
mod metrics;

pub use landmark::{HandId, Handedness, LANDMARK_COUNT, LandmarkSet, index};
pub use metrics::{Finger, FingerExtension, HandMetrics};
