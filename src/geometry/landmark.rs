//! Per-hand landmark sets as delivered by the external landmark extractor.

use std::fmt;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;

/// Number of keypoints in a complete hand landmark set.
pub const LANDMARK_COUNT: usize = 21;

/// Keypoint indices of the 21-point hand model.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// Wrist and the five finger bases.
    pub const PALM: [usize; 6] = [WRIST, THUMB_CMC, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
}

/// Identity assigned to a hand by the external landmark matcher.
///
/// Stable across consecutive frames for the same physical hand, but may be
/// reassigned after an occlusion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandId(String);

impl HandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for HandId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Left/right label of a detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Sign applied to chirality-dependent measurements (palm normal) so
    /// that both hands share one convention.
    pub fn sign(&self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keypoints of one detected hand in one frame.
///
/// Coordinates are normalized image space (x, y in `[0, 1]`, y pointing
/// down) plus relative depth. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    hand_id: HandId,
    handedness: Handedness,
    confidence: f32,
    points: Vec<Point3<f32>>,
}

impl LandmarkSet {
    pub fn new(
        hand_id: impl Into<HandId>,
        handedness: Handedness,
        confidence: f32,
        points: Vec<Point3<f32>>,
    ) -> Self {
        Self {
            hand_id: hand_id.into(),
            handedness,
            confidence,
            points,
        }
    }

    pub fn hand_id(&self) -> &HandId {
        &self.hand_id
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    /// Keypoint by index, `None` when the set is too short.
    pub fn get(&self, index: usize) -> Option<Point3<f32>> {
        self.points.get(index).copied()
    }

    /// Keypoint by index. Callers must have validated the set first.
    #[inline]
    pub(crate) fn point(&self, index: usize) -> Point3<f32> {
        self.points[index]
    }

    /// Check that the set is complete and numerically sound.
    pub fn validate(&self) -> Result<(), LandmarkError> {
        if self.points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongPointCount {
                expected: LANDMARK_COUNT,
                got: self.points.len(),
            });
        }
        if !self.confidence.is_finite() {
            return Err(LandmarkError::InvalidConfidence(self.confidence));
        }
        if let Some(index) = self
            .points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<Point3<f32>> {
        (0..n).map(|i| Point3::new(i as f32 * 0.01, 0.5, 0.0)).collect()
    }

    #[test]
    fn test_validate_accepts_complete_set() {
        let set = LandmarkSet::new("hand_0", Handedness::Right, 0.9, points(LANDMARK_COUNT));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_set() {
        let set = LandmarkSet::new("hand_0", Handedness::Right, 0.9, points(12));
        assert_eq!(
            set.validate(),
            Err(LandmarkError::WrongPointCount {
                expected: LANDMARK_COUNT,
                got: 12
            })
        );
    }

    #[test]
    fn test_get_on_short_set_is_none() {
        let set = LandmarkSet::new("hand_0", Handedness::Right, 0.9, points(12));
        assert_eq!(set.get(11), Some(points(12)[11]));
        assert_eq!(set.get(index::PINKY_TIP), None);
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut pts = points(LANDMARK_COUNT);
        pts[7].y = f32::NAN;
        let set = LandmarkSet::new("hand_0", Handedness::Left, 0.9, pts);
        assert_eq!(set.validate(), Err(LandmarkError::NonFinite { index: 7 }));
    }

    #[test]
    fn test_handedness_labels() {
        assert_eq!(Handedness::Left.to_string(), "Left");
        assert_eq!(Handedness::Right.as_str(), "Right");
        assert_eq!(HandId::from("hand_1").to_string(), "hand_1");
    }
}
