//! Single-frame pose classifiers.

use crate::config::PoseConfig;
use crate::error::ClassifierError;
use crate::geometry::{Finger, FingerExtension};

use super::{DetectionResult, GestureClassifier, GestureKind, HandObservation, Payload, ThumbDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerCount {
    One,
    Two,
    Three,
}

impl FingerCount {
    /// Exact extension vector, thumb first.
    pub fn pattern(self) -> FingerExtension {
        match self {
            Self::One => FingerExtension::new(false, true, false, false, false),
            Self::Two => FingerExtension::new(false, true, true, false, false),
            Self::Three => FingerExtension::new(false, true, true, true, false),
        }
    }

    fn kind(self) -> GestureKind {
        match self {
            Self::One => GestureKind::FingerCountOne,
            Self::Two => GestureKind::FingerCountTwo,
            Self::Three => GestureKind::FingerCountThree,
        }
    }

    fn value(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Matches one, two or three raised fingers counted from the index finger.
/// Exact patterns keep the counts mutually exclusive.
#[derive(Debug, Clone)]
pub struct FingerCountClassifier {
    count: FingerCount,
}

impl FingerCountClassifier {
    pub fn new(count: FingerCount) -> Self {
        Self { count }
    }
}

impl GestureClassifier for FingerCountClassifier {
    fn kind(&self) -> GestureKind {
        self.count.kind()
    }

    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
        let hand_id = obs.landmarks.hand_id();
        if obs.metrics.extension != self.count.pattern() {
            return Ok(DetectionResult::inactive(self.kind(), hand_id));
        }
        Ok(DetectionResult {
            kind: self.kind(),
            hand_id: hand_id.clone(),
            triggered: false,
            engaged: true,
            confidence: obs.landmarks.confidence(),
            payload: Payload::FingerCount {
                count: self.count.value(),
            },
        })
    }

    fn reset(&mut self) {}

    fn spawn(&self) -> Box<dyn GestureClassifier> {
        Box::new(self.clone())
    }
}

/// Thumbs up or down: thumb out, the other four folded, and the thumb
/// clearly above or below the wrist. A sideways thumb matches neither.
#[derive(Debug, Clone)]
pub struct ThumbClassifier {
    direction: ThumbDirection,
    pose: PoseConfig,
}

impl ThumbClassifier {
    pub fn new(direction: ThumbDirection, pose: PoseConfig) -> Self {
        Self { direction, pose }
    }
}

impl GestureClassifier for ThumbClassifier {
    fn kind(&self) -> GestureKind {
        match self.direction {
            ThumbDirection::Up => GestureKind::ThumbsUp,
            ThumbDirection::Down => GestureKind::ThumbsDown,
        }
    }

    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
        let metrics = obs.metrics;
        let vertical = metrics.thumb_vertical;
        if !vertical.is_finite() {
            return Err(ClassifierError::NonFiniteMetric("thumb_vertical"));
        }

        let shape = metrics.extension.is_extended(Finger::Thumb) && metrics.extension.fingers_folded();
        let pointing = match self.direction {
            ThumbDirection::Up => vertical > self.pose.thumb_vertical_min,
            ThumbDirection::Down => vertical < -self.pose.thumb_vertical_min,
        };

        if !(shape && pointing) {
            return Ok(DetectionResult::inactive(self.kind(), obs.landmarks.hand_id()));
        }
        Ok(DetectionResult {
            kind: self.kind(),
            hand_id: obs.landmarks.hand_id().clone(),
            triggered: false,
            engaged: true,
            confidence: obs.landmarks.confidence(),
            payload: Payload::Thumb {
                direction: self.direction,
                vertical,
            },
        })
    }

    fn reset(&mut self) {}

    fn spawn(&self) -> Box<dyn GestureClassifier> {
        Box::new(self.clone())
    }
}
