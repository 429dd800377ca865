//! Horizontal swipe detection over a sliding window of palm positions.

use nalgebra::Point2;
use tracing::debug;

use crate::config::{PoseConfig, SwipeConfig};
use crate::error::ClassifierError;
use crate::geometry::{FingerExtension, HandMetrics};

use super::{
    DetectionResult, GestureClassifier, GestureKind, HandObservation, Payload, SampleWindow,
    SwipeDirection,
};

const TWO_FINGERS: FingerExtension = FingerExtension::new(false, true, true, false, false);

/// Hand shape that must be held for the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePosture {
    /// Index through pinky extended.
    OpenHand,
    /// Only index and middle extended, held together.
    TwoFingers,
}

impl SwipePosture {
    fn holds(self, metrics: &HandMetrics, pose: &PoseConfig) -> bool {
        match self {
            Self::OpenHand => metrics.extension.fingers_extended(),
            Self::TwoFingers => {
                metrics.extension == TWO_FINGERS && metrics.index_middle_gap <= pose.two_finger_gap_max
            }
        }
    }
}

/// Lifecycle shared by the one-shot motion gestures. The active state lasts
/// for the triggering frame only, so it is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPhase {
    #[default]
    Idle,
    Cooldown { remaining: u32 },
}

impl MotionPhase {
    /// Advance one frame. Returns true while the cooldown is still running.
    pub(crate) fn tick(&mut self) -> bool {
        match *self {
            Self::Idle => false,
            Self::Cooldown { remaining: 0 } => {
                *self = Self::Idle;
                false
            }
            Self::Cooldown { remaining } => {
                *self = Self::Cooldown {
                    remaining: remaining - 1,
                };
                true
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PalmSample {
    timestamp: f64,
    center: Point2<f32>,
}

#[derive(Debug, Clone)]
pub struct SwipeClassifier {
    posture: SwipePosture,
    config: SwipeConfig,
    pose: PoseConfig,
    window: SampleWindow<PalmSample>,
    phase: MotionPhase,
}

impl SwipeClassifier {
    pub fn new(posture: SwipePosture, config: SwipeConfig, pose: PoseConfig) -> Self {
        Self {
            posture,
            config,
            pose,
            window: SampleWindow::new(config.window_frames),
            phase: MotionPhase::Idle,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }
}

impl GestureClassifier for SwipeClassifier {
    fn kind(&self) -> GestureKind {
        match self.posture {
            SwipePosture::OpenHand => GestureKind::HandSwipe,
            SwipePosture::TwoFingers => GestureKind::TwoFingerSwipe,
        }
    }

    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
        let hand_id = obs.landmarks.hand_id();
        let inactive = DetectionResult::inactive(self.kind(), hand_id);

        if self.phase.tick() || !self.posture.holds(obs.metrics, &self.pose) {
            self.window.clear();
            return Ok(inactive);
        }

        self.window.push(PalmSample {
            timestamp: obs.timestamp,
            center: obs.metrics.palm_center.xy(),
        });
        if !self.window.is_full() {
            return Ok(inactive);
        }

        let (Some(first), Some(last)) = (self.window.oldest(), self.window.newest()) else {
            return Ok(inactive);
        };
        let delta = last.center - first.center;
        let scale = obs.metrics.scale;
        let displacement = delta.x.abs() / scale;
        if !displacement.is_finite() {
            return Err(ClassifierError::NonFiniteMetric("swipe displacement"));
        }
        if displacement < self.config.min_displacement || delta.x.abs() <= delta.y.abs() {
            return Ok(inactive);
        }

        let elapsed = (last.timestamp - first.timestamp) as f32;
        let velocity = if elapsed > 0.0 { displacement / elapsed } else { 0.0 };
        let direction = if delta.x < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        };

        debug!(
            hand_id = %hand_id,
            gesture = %self.kind(),
            direction = direction.as_str(),
            displacement,
            "swipe triggered"
        );
        self.window.clear();
        self.phase = MotionPhase::Cooldown {
            remaining: self.config.cooldown_frames,
        };

        Ok(DetectionResult {
            kind: self.kind(),
            hand_id: hand_id.clone(),
            triggered: true,
            engaged: true,
            confidence: obs.landmarks.confidence(),
            payload: Payload::Swipe {
                direction,
                displacement,
                velocity,
            },
        })
    }

    fn reset(&mut self) {
        self.window.clear();
        self.phase = MotionPhase::Idle;
    }

    fn spawn(&self) -> Box<dyn GestureClassifier> {
        Box::new(Self::new(self.posture, self.config, self.pose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LandmarkSet;
    use crate::integration::{HandPose, LandmarkSetBuilder};

    const SCALE: f32 = 0.1;

    fn hand(pose: HandPose, x: f32) -> LandmarkSet {
        LandmarkSetBuilder::new("h")
            .pose(pose)
            .scale(SCALE)
            .wrist(x, 0.7)
            .build()
    }

    fn feed(classifier: &mut SwipeClassifier, set: &LandmarkSet, frame: usize) -> DetectionResult {
        let metrics = HandMetrics::compute(set, &PoseConfig::default()).unwrap();
        classifier
            .process(&HandObservation {
                timestamp: frame as f64 / 30.0,
                landmarks: set,
                metrics: &metrics,
            })
            .unwrap()
    }

    fn swipe(posture: SwipePosture) -> SwipeClassifier {
        SwipeClassifier::new(posture, SwipeConfig::default(), PoseConfig::default())
    }

    /// Moves the wrist by `step` per frame and returns the triggering frames.
    fn sweep(classifier: &mut SwipeClassifier, pose: HandPose, step: f32, frames: usize) -> Vec<(usize, Payload)> {
        (0..frames)
            .filter_map(|i| {
                let result = feed(classifier, &hand(pose, 0.2 + step * i as f32), i);
                result.triggered.then_some((i, result.payload))
            })
            .collect()
    }

    #[test]
    fn test_open_hand_swipe_right() {
        let mut classifier = swipe(SwipePosture::OpenHand);
        // Five steps of 0.3 scales across a six-sample window.
        let hits = sweep(&mut classifier, HandPose::Open, 0.03, 6);
        assert_eq!(hits.len(), 1);
        let (frame, payload) = &hits[0];
        assert_eq!(*frame, 5);
        assert!(matches!(
            payload,
            Payload::Swipe {
                direction: SwipeDirection::Right,
                ..
            }
        ));
    }

    #[test]
    fn test_swipe_left() {
        let mut classifier = swipe(SwipePosture::OpenHand);
        let hits = sweep(&mut classifier, HandPose::Open, -0.03, 6);
        assert!(matches!(
            hits[0].1,
            Payload::Swipe {
                direction: SwipeDirection::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_slow_drift_does_not_trigger() {
        let mut classifier = swipe(SwipePosture::OpenHand);
        assert!(sweep(&mut classifier, HandPose::Open, 0.005, 40).is_empty());
    }

    #[test]
    fn test_cooldown_limits_continuous_motion() {
        let mut classifier = swipe(SwipePosture::OpenHand);
        // Trigger at frame 5, cooldown covers frames 6..=20, window refills by 26.
        let hits = sweep(&mut classifier, HandPose::Open, 0.025, 27);
        let frames: Vec<usize> = hits.iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![5, 26]);
    }

    #[test]
    fn test_posture_loss_clears_window() {
        let mut classifier = swipe(SwipePosture::OpenHand);
        for i in 0..5 {
            feed(&mut classifier, &hand(HandPose::Open, 0.2 + 0.03 * i as f32), i);
        }
        feed(&mut classifier, &hand(HandPose::Fist, 0.35), 5);
        let result = feed(&mut classifier, &hand(HandPose::Open, 0.38), 6);
        assert!(!result.triggered);
    }

    #[test]
    fn test_open_hand_does_not_two_finger_swipe() {
        let mut two = swipe(SwipePosture::TwoFingers);
        assert!(sweep(&mut two, HandPose::Open, 0.03, 12).is_empty());

        let mut two = swipe(SwipePosture::TwoFingers);
        assert_eq!(sweep(&mut two, HandPose::Two, 0.03, 6).len(), 1);

        let mut open = swipe(SwipePosture::OpenHand);
        assert!(sweep(&mut open, HandPose::Two, 0.03, 12).is_empty());
    }

    #[test]
    fn test_cooldown_phase_counts_down() {
        let mut phase = MotionPhase::Cooldown { remaining: 2 };
        assert!(phase.tick());
        assert!(phase.tick());
        assert!(!phase.tick());
        assert_eq!(phase, MotionPhase::Idle);
    }
}
