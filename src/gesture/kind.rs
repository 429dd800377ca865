//! Gesture kinds and the per-frame result every classifier produces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::HandId;

/// Every gesture the crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    HandClose,
    HandOpen,
    HandSwipe,
    TwoFingerSwipe,
    PalmFlip,
    FingerCountOne,
    FingerCountTwo,
    FingerCountThree,
    ThumbsUp,
    ThumbsDown,
}

impl GestureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandClose => "hand_close",
            Self::HandOpen => "hand_open",
            Self::HandSwipe => "hand_swipe",
            Self::TwoFingerSwipe => "two_finger_swipe",
            Self::PalmFlip => "palm_flip",
            Self::FingerCountOne => "finger_count_one",
            Self::FingerCountTwo => "finger_count_two",
            Self::FingerCountThree => "finger_count_three",
            Self::ThumbsUp => "thumbs_up",
            Self::ThumbsDown => "thumbs_down",
        }
    }

    /// Dynamic gestures carry temporal state and report one-shot triggers.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Self::HandClose | Self::HandOpen | Self::HandSwipe | Self::TwoFingerSwipe | Self::PalmFlip
        )
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Which side of the hand is turned towards the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PalmFacing {
    #[default]
    Front,
    Back,
}

impl PalmFacing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbDirection {
    Up,
    Down,
}

/// Gesture-specific details attached to a result and forwarded as event
/// metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    FingerCount {
        count: u8,
    },
    Thumb {
        direction: ThumbDirection,
        vertical: f32,
    },
    Fist {
        openness: f32,
        spread: f32,
        frames: u32,
    },
    Swipe {
        direction: SwipeDirection,
        /// Horizontal palm travel in hand scales.
        displacement: f32,
        /// Hand scales per second across the window, 0 when timestamps do not advance.
        velocity: f32,
    },
    Flip {
        from: PalmFacing,
        to: PalmFacing,
    },
    #[default]
    None,
}

impl Payload {
    /// Compact `key=value` rendering used by the simple line format.
    pub fn summary(&self) -> String {
        match self {
            Self::FingerCount { count } => format!("count={count}"),
            Self::Thumb { vertical, .. } => format!("vertical={vertical:.2}"),
            Self::Fist {
                openness,
                spread,
                frames,
            } => format!("openness={openness:.2} spread={spread:.3} frames={frames}"),
            Self::Swipe {
                direction,
                displacement,
                velocity,
            } => format!(
                "direction={} displacement={displacement:.2} velocity={velocity:.2}",
                direction.as_str()
            ),
            Self::Flip { from, to } => format!("from={} to={}", from.as_str(), to.as_str()),
            Self::None => String::new(),
        }
    }
}

/// Output of one classifier for one hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub kind: GestureKind,
    pub hand_id: HandId,
    /// Rising edge: true on exactly one frame per continuous activation.
    pub triggered: bool,
    /// The gesture is currently held (fist closed, static pose matched).
    pub engaged: bool,
    pub confidence: f32,
    pub payload: Payload,
}

impl DetectionResult {
    /// Nothing recognized this frame.
    pub fn inactive(kind: GestureKind, hand_id: &HandId) -> Self {
        Self {
            kind,
            hand_id: hand_id.clone(),
            triggered: false,
            engaged: false,
            confidence: 0.0,
            payload: Payload::None,
        }
    }
}
