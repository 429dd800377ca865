//! Builder for synthetic landmark sets with known geometry.

use nalgebra::{Point3, Rotation2, Vector2};

use crate::geometry::{FingerExtension, HandId, Handedness, LANDMARK_COUNT, LandmarkSet, index};
use crate::gesture::PalmFacing;

/// Named hand shapes understood by [`LandmarkSetBuilder::pose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    Open,
    Fist,
    One,
    Two,
    Three,
    /// Thumb out, other fingers folded.
    Thumb,
}

impl HandPose {
    pub fn extension(self) -> FingerExtension {
        match self {
            Self::Open => FingerExtension::new(true, true, true, true, true),
            Self::Fist => FingerExtension::new(false, false, false, false, false),
            Self::One => FingerExtension::new(false, true, false, false, false),
            Self::Two => FingerExtension::new(false, true, true, false, false),
            Self::Three => FingerExtension::new(false, true, true, true, false),
            Self::Thumb => FingerExtension::new(true, false, false, false, false),
        }
    }
}

/// Hand-unit template (wrist at the origin, middle-finger base at unit
/// distance, y up) for a right hand with the palm towards the camera.
const THUMB_CMC: [f32; 2] = [-0.35, 0.25];
const THUMB_MCP: [f32; 2] = [-0.6, 0.45];
const THUMB_OUT: [[f32; 2]; 2] = [[-0.82, 0.62], [-1.05, 0.8]];
const THUMB_IN: [[f32; 2]; 2] = [[-0.4, 0.55], [-0.1, 0.6]];
/// Finger bases, index to pinky.
const FINGER_MCP: [[f32; 2]; 4] = [[-0.3, 0.95], [0.0, 1.0], [0.25, 0.95], [0.48, 0.85]];
/// PIP, DIP and tip offsets above the base.
const FINGER_OUT: [f32; 3] = [0.4, 0.65, 0.85];
const FINGER_IN: [f32; 3] = [0.3, 0.05, -0.35];

/// Builds a [`LandmarkSet`] from a pose, position, size and orientation.
///
/// # Example
///
/// ```ignore
/// let fist = LandmarkSetBuilder::new("0")
///     .pose(HandPose::Fist)
///     .wrist(0.4, 0.7)
///     .scale(0.12)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LandmarkSetBuilder {
    hand_id: HandId,
    handedness: Handedness,
    confidence: f32,
    extension: FingerExtension,
    wrist: Vector2<f32>,
    scale: f32,
    rotation: f32,
    facing: PalmFacing,
    depth: f32,
    nudges: Vec<(usize, Vector2<f32>)>,
}

impl LandmarkSetBuilder {
    pub fn new(hand_id: impl Into<HandId>) -> Self {
        Self {
            hand_id: hand_id.into(),
            handedness: Handedness::Right,
            confidence: 0.95,
            extension: HandPose::Open.extension(),
            wrist: Vector2::new(0.5, 0.75),
            scale: 0.15,
            rotation: 0.0,
            facing: PalmFacing::Front,
            depth: 0.0,
            nudges: Vec::new(),
        }
    }

    pub fn pose(mut self, pose: HandPose) -> Self {
        self.extension = pose.extension();
        self
    }

    /// Arbitrary extended/folded combination.
    pub fn fingers(mut self, extension: FingerExtension) -> Self {
        self.extension = extension;
        self
    }

    pub fn handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Wrist position in normalized image coordinates.
    pub fn wrist(mut self, x: f32, y: f32) -> Self {
        self.wrist = Vector2::new(x, y);
        self
    }

    /// Wrist to middle-finger-base distance in normalized image units.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Counter-clockwise tilt around the wrist, in radians, as seen by the camera.
    pub fn rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    pub fn facing(mut self, facing: PalmFacing) -> Self {
        self.facing = facing;
        self
    }

    /// Constant relative depth applied to every keypoint.
    pub fn depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    /// Move one keypoint by an offset in hand units.
    pub fn nudge(mut self, keypoint: usize, dx: f32, dy: f32) -> Self {
        self.nudges.push((keypoint, Vector2::new(dx, dy)));
        self
    }

    fn template(&self) -> Vec<Vector2<f32>> {
        let mut points = vec![Vector2::zeros(); LANDMARK_COUNT];
        points[index::THUMB_CMC] = Vector2::from(THUMB_CMC);
        points[index::THUMB_MCP] = Vector2::from(THUMB_MCP);
        let thumb = if self.extension.0[0] { THUMB_OUT } else { THUMB_IN };
        points[index::THUMB_IP] = Vector2::from(thumb[0]);
        points[index::THUMB_TIP] = Vector2::from(thumb[1]);

        for (finger, base) in FINGER_MCP.iter().enumerate() {
            let mcp = index::INDEX_MCP + finger * 4;
            let base = Vector2::from(*base);
            let offsets = if self.extension.0[finger + 1] {
                FINGER_OUT
            } else {
                FINGER_IN
            };
            points[mcp] = base;
            for (joint, dy) in offsets.iter().enumerate() {
                points[mcp + 1 + joint] = base + Vector2::new(0.0, *dy);
            }
        }

        for (keypoint, offset) in &self.nudges {
            if let Some(p) = points.get_mut(*keypoint) {
                *p += offset;
            }
        }
        points
    }

    pub fn build(self) -> LandmarkSet {
        // A left hand and a turned-around right hand are both mirror images.
        let mirrored = (self.handedness == Handedness::Left) != (self.facing == PalmFacing::Back);
        let rotation = Rotation2::new(self.rotation);

        let points = self
            .template()
            .into_iter()
            .map(|p| {
                let p = if mirrored { Vector2::new(-p.x, p.y) } else { p };
                let p = rotation * p * self.scale;
                // Image y points down.
                Point3::new(self.wrist.x + p.x, self.wrist.y - p.y, self.depth)
            })
            .collect();

        LandmarkSet::new(self.hand_id, self.handedness, self.confidence, points)
    }
}
