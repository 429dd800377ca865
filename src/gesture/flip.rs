//! Palm flip: the hand turns from palm-facing to back-facing (or back)
//! while staying roughly in place.

use nalgebra::Point2;
use tracing::debug;

use crate::config::FlipConfig;
use crate::error::ClassifierError;

use super::{
    DetectionResult, GestureClassifier, GestureKind, HandObservation, MotionPhase, PalmFacing,
    Payload, SampleWindow,
};

#[derive(Debug, Clone)]
pub struct FlipClassifier {
    config: FlipConfig,
    /// Last facing observed outside the hysteresis band.
    stable: Option<PalmFacing>,
    centers: SampleWindow<Point2<f32>>,
    phase: MotionPhase,
}

impl FlipClassifier {
    pub fn new(config: FlipConfig) -> Self {
        Self {
            config,
            stable: None,
            centers: SampleWindow::new(config.window_frames),
            phase: MotionPhase::Idle,
        }
    }

    pub fn stable_facing(&self) -> Option<PalmFacing> {
        self.stable
    }

    fn classify(&self, facing: f32) -> Option<PalmFacing> {
        let band = self.config.hysteresis_band;
        if facing > band {
            Some(PalmFacing::Front)
        } else if facing < -band {
            Some(PalmFacing::Back)
        } else {
            None
        }
    }
}

impl GestureClassifier for FlipClassifier {
    fn kind(&self) -> GestureKind {
        GestureKind::PalmFlip
    }

    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
        let metrics = obs.metrics;
        let hand_id = obs.landmarks.hand_id();
        let facing = metrics
            .facing
            .ok_or(ClassifierError::DegenerateGeometry("palm normal"))?;

        self.centers.push(metrics.palm_center.xy());
        let previous = self.stable;
        let observed = self.classify(facing);
        if observed.is_some() {
            self.stable = observed;
        }

        // Facing keeps updating during cooldown so a flip-back is not
        // reported against a stale side.
        if self.phase.tick() {
            return Ok(DetectionResult::inactive(self.kind(), hand_id));
        }

        let (from, to) = match (previous, observed) {
            (Some(from), Some(to)) if from != to => (from, to),
            _ => return Ok(DetectionResult::inactive(self.kind(), hand_id)),
        };

        let travel = match (self.centers.oldest(), self.centers.newest()) {
            (Some(first), Some(last)) => nalgebra::distance(first, last) / metrics.scale,
            _ => 0.0,
        };
        let open_ok = !self.config.require_open_hand || metrics.extension.fingers_extended();
        if travel > self.config.max_travel || !open_ok {
            debug!(hand_id = %hand_id, travel, open_ok, "facing change ignored");
            return Ok(DetectionResult::inactive(self.kind(), hand_id));
        }

        debug!(hand_id = %hand_id, from = from.as_str(), to = to.as_str(), "palm flip triggered");
        self.phase = MotionPhase::Cooldown {
            remaining: self.config.cooldown_frames,
        };

        Ok(DetectionResult {
            kind: self.kind(),
            hand_id: hand_id.clone(),
            triggered: true,
            engaged: true,
            confidence: obs.landmarks.confidence(),
            payload: Payload::Flip { from, to },
        })
    }

    fn reset(&mut self) {
        self.stable = None;
        self.centers.clear();
        self.phase = MotionPhase::Idle;
    }

    fn spawn(&self) -> Box<dyn GestureClassifier> {
        Box::new(Self::new(self.config))
    }
}
