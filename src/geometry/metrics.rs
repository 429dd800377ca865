//! Hand-scale normalized measurements computed once per hand per frame.
//!
//! All distances are measured in the image plane and divided by the hand
//! scale (wrist to middle-finger base), so thresholds hold regardless of
//! how far the hand is from the camera.

use nalgebra::{Point3, Vector3};
use ndarray::Array1;

use super::landmark::{LandmarkSet, index};
use crate::config::PoseConfig;
use crate::error::LandmarkError;

/// Hand scales below this are treated as a collapsed (malformed) hand.
const MIN_SCALE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(self) -> usize {
        match self {
            Self::Thumb => index::THUMB_TIP,
            Self::Index => index::INDEX_TIP,
            Self::Middle => index::MIDDLE_TIP,
            Self::Ring => index::RING_TIP,
            Self::Pinky => index::PINKY_TIP,
        }
    }

    /// Middle joint (IP for the thumb, PIP for the others).
    pub fn pip(self) -> usize {
        match self {
            Self::Thumb => index::THUMB_IP,
            Self::Index => index::INDEX_PIP,
            Self::Middle => index::MIDDLE_PIP,
            Self::Ring => index::RING_PIP,
            Self::Pinky => index::PINKY_PIP,
        }
    }

    pub fn mcp(self) -> usize {
        match self {
            Self::Thumb => index::THUMB_MCP,
            Self::Index => index::INDEX_MCP,
            Self::Middle => index::MIDDLE_MCP,
            Self::Ring => index::RING_MCP,
            Self::Pinky => index::PINKY_MCP,
        }
    }
}

/// Extended/folded flag per finger, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FingerExtension(pub [bool; 5]);

impl FingerExtension {
    pub const fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        Self([thumb, index, middle, ring, pinky])
    }

    #[inline]
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger as usize]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|e| **e).count()
    }

    /// Index, middle, ring and pinky all extended.
    pub fn fingers_extended(&self) -> bool {
        self.0[1..].iter().all(|e| *e)
    }

    /// Index, middle, ring and pinky all folded.
    pub fn fingers_folded(&self) -> bool {
        self.0[1..].iter().all(|e| !*e)
    }
}

/// Scale-normalized geometry of one landmark set.
#[derive(Debug, Clone)]
pub struct HandMetrics {
    /// Image-plane wrist to middle MCP distance, in normalized image units.
    pub scale: f32,
    /// Mean of the wrist and the five finger bases.
    pub palm_center: Point3<f32>,
    /// Tip to palm-center distance per finger (thumb first), in hand scales.
    pub fingertip_distances: Array1<f32>,
    /// Mean of `fingertip_distances`; small for a fist, large for an open hand.
    pub openness: f32,
    /// Variance of the pairwise fingertip distances, in hand scales squared.
    pub spread: f32,
    pub extension: FingerExtension,
    /// Unit normal of the palm plane, `None` when the palm is degenerate.
    pub palm_normal: Option<Vector3<f32>>,
    /// Depth component of the palm normal with the handedness sign applied:
    /// positive when the palm faces the camera.
    pub facing: Option<f32>,
    /// Vertical component of the wrist to thumb-tip vector (positive = up).
    pub thumb_vertical: f32,
    /// Distance between the index and middle fingertips.
    pub index_middle_gap: f32,
}

impl HandMetrics {
    pub fn compute(set: &LandmarkSet, pose: &PoseConfig) -> Result<Self, LandmarkError> {
        set.validate()?;

        let wrist = set.point(index::WRIST);
        let scale = planar_distance(&wrist, &set.point(index::MIDDLE_MCP));
        if scale < MIN_SCALE {
            return Err(LandmarkError::DegenerateScale(scale));
        }

        let palm_center = palm_center(set);

        let fingertip_distances: Array1<f32> = Finger::ALL
            .iter()
            .map(|f| planar_distance(&set.point(f.tip()), &palm_center) / scale)
            .collect();
        let openness = fingertip_distances.mean().unwrap_or(0.0);

        let mut pairwise = Vec::with_capacity(10);
        for (i, a) in Finger::ALL.iter().enumerate() {
            for b in &Finger::ALL[i + 1..] {
                pairwise.push(planar_distance(&set.point(a.tip()), &set.point(b.tip())) / scale);
            }
        }
        let spread = Array1::from(pairwise).var(0.0);

        let extension = finger_extension(set, scale, pose);

        let across_palm = set.point(index::INDEX_MCP) - wrist;
        let along_pinky = set.point(index::PINKY_MCP) - wrist;
        let palm_normal = across_palm.cross(&along_pinky).try_normalize(f32::EPSILON);
        let facing = palm_normal.map(|n| n.z * set.handedness().sign());

        let thumb_vertical = (wrist.y - set.point(index::THUMB_TIP).y) / scale;
        let index_middle_gap =
            planar_distance(&set.point(index::INDEX_TIP), &set.point(index::MIDDLE_TIP)) / scale;

        Ok(Self {
            scale,
            palm_center,
            fingertip_distances,
            openness,
            spread,
            extension,
            palm_normal,
            facing,
            thumb_vertical,
            index_middle_gap,
        })
    }
}

/// Distance between two keypoints projected onto the image plane.
#[inline]
pub fn planar_distance(a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    nalgebra::distance(&a.xy(), &b.xy())
}

pub fn palm_center(set: &LandmarkSet) -> Point3<f32> {
    let sum = index::PALM
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + set.point(i).coords);
    Point3::from(sum / index::PALM.len() as f32)
}

fn finger_extension(set: &LandmarkSet, scale: f32, pose: &PoseConfig) -> FingerExtension {
    let wrist = set.point(index::WRIST);
    let mut flags = [false; 5];

    for (flag, finger) in flags.iter_mut().zip(Finger::ALL) {
        let tip = set.point(finger.tip());
        let pip = set.point(finger.pip());
        let tip_to_wrist = planar_distance(&tip, &wrist);
        // A folded finger brings its tip back towards the wrist past its own middle joint.
        let reaching_out = tip_to_wrist > planar_distance(&pip, &wrist);

        *flag = match finger {
            Finger::Thumb => {
                let clearance = planar_distance(&tip, &set.point(index::INDEX_MCP)) / scale;
                reaching_out && clearance > pose.thumb_extension_ratio
            }
            _ => reaching_out && tip_to_wrist / scale > pose.finger_extension_ratio,
        };
    }

    FingerExtension(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Handedness;
    use crate::integration::{HandPose, LandmarkSetBuilder, PalmFacing};

    fn metrics(builder: LandmarkSetBuilder) -> HandMetrics {
        HandMetrics::compute(&builder.build(), &PoseConfig::default()).unwrap()
    }

    #[test]
    fn test_scale_matches_wrist_to_middle_base() {
        let m = metrics(LandmarkSetBuilder::new("h").scale(0.2));
        assert!((m.scale - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_open_hand_extension() {
        let m = metrics(LandmarkSetBuilder::new("h").pose(HandPose::Open));
        assert_eq!(m.extension, FingerExtension::new(true, true, true, true, true));
        assert!(m.openness > 1.0);
    }

    #[test]
    fn test_fist_extension() {
        let m = metrics(LandmarkSetBuilder::new("h").pose(HandPose::Fist));
        assert_eq!(m.extension.count(), 0);
        assert!(m.openness < 0.3);
    }

    #[test]
    fn test_metrics_are_scale_invariant() {
        let small = metrics(LandmarkSetBuilder::new("h").pose(HandPose::Open).scale(0.08));
        let large = metrics(LandmarkSetBuilder::new("h").pose(HandPose::Open).scale(0.3));
        assert!((small.openness - large.openness).abs() < 1e-3);
        assert!((small.spread - large.spread).abs() < 1e-3);
        assert_eq!(small.extension, large.extension);
    }

    #[test]
    fn test_extension_survives_rotation() {
        let upright = metrics(LandmarkSetBuilder::new("h").pose(HandPose::Two));
        let tilted = metrics(
            LandmarkSetBuilder::new("h")
                .pose(HandPose::Two)
                .rotation(std::f32::consts::FRAC_PI_3),
        );
        assert_eq!(upright.extension, tilted.extension);
    }

    #[test]
    fn test_facing_sign_follows_palm_side() {
        let front = metrics(LandmarkSetBuilder::new("h"));
        let back = metrics(LandmarkSetBuilder::new("h").facing(PalmFacing::Back));
        assert!(front.facing.unwrap() > 0.9);
        assert!(back.facing.unwrap() < -0.9);
    }

    #[test]
    fn test_left_hand_shares_facing_convention() {
        let left = metrics(LandmarkSetBuilder::new("h").handedness(Handedness::Left));
        assert!(left.facing.unwrap() > 0.9);
    }

    #[test]
    fn test_collapsed_hand_is_rejected() {
        let set = LandmarkSet::new(
            "h",
            Handedness::Right,
            0.9,
            vec![Point3::new(0.5, 0.5, 0.0); crate::geometry::LANDMARK_COUNT],
        );
        assert!(matches!(
            HandMetrics::compute(&set, &PoseConfig::default()),
            Err(LandmarkError::DegenerateScale(_))
        ));
    }
}
