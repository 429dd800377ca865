//! The capability every gesture classifier exposes to the manager.

use crate::config::GestureConfig;
use crate::error::ClassifierError;
use crate::geometry::{HandMetrics, LandmarkSet};

use super::{
    DetectionResult, FingerCount, FingerCountClassifier, FistClassifier, FistMode, FlipClassifier,
    GestureKind, SwipeClassifier, SwipePosture, ThumbClassifier, ThumbDirection,
};

/// One validated hand in one frame, with its metrics computed once.
#[derive(Debug, Clone, Copy)]
pub struct HandObservation<'a> {
    pub timestamp: f64,
    pub landmarks: &'a LandmarkSet,
    pub metrics: &'a HandMetrics,
}

/// A per-hand gesture recognizer.
///
/// The manager keeps one registered prototype per gesture and calls
/// [`spawn`](GestureClassifier::spawn) for every newly tracked hand, so an
/// instance only ever sees frames of a single `hand_id`.
///
/// # Example
///
/// ```ignore
/// struct AlwaysIdle;
///
/// impl GestureClassifier for AlwaysIdle {
///     fn kind(&self) -> GestureKind {
///         GestureKind::PalmFlip
///     }
///
///     fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
///         Ok(DetectionResult::inactive(self.kind(), obs.landmarks.hand_id()))
///     }
///
///     fn reset(&mut self) {}
///
///     fn spawn(&self) -> Box<dyn GestureClassifier> {
///         Box::new(AlwaysIdle)
///     }
/// }
/// ```
pub trait GestureClassifier: Send {
    fn kind(&self) -> GestureKind;

    /// Consume one frame and report this gesture's state for it.
    ///
    /// An error isolates the classifier for the frame; the manager resets it
    /// before the next one.
    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError>;

    /// Drop all temporal state.
    fn reset(&mut self);

    /// Fresh instance with the same configuration and no history.
    fn spawn(&self) -> Box<dyn GestureClassifier>;
}

/// Prototypes for every built-in gesture, dynamic ones first.
pub fn default_classifiers(config: &GestureConfig) -> Vec<Box<dyn GestureClassifier>> {
    vec![
        Box::new(FistClassifier::new(FistMode::Close, config.fist)),
        Box::new(FistClassifier::new(FistMode::Open, config.fist)),
        Box::new(SwipeClassifier::new(SwipePosture::OpenHand, config.swipe, config.pose)),
        Box::new(FlipClassifier::new(config.flip)),
        Box::new(SwipeClassifier::new(
            SwipePosture::TwoFingers,
            config.two_finger_swipe,
            config.pose,
        )),
        Box::new(FingerCountClassifier::new(FingerCount::One)),
        Box::new(FingerCountClassifier::new(FingerCount::Two)),
        Box::new(FingerCountClassifier::new(FingerCount::Three)),
        Box::new(ThumbClassifier::new(ThumbDirection::Up, config.pose)),
        Box::new(ThumbClassifier::new(ThumbDirection::Down, config.pose)),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_default_classifiers_cover_every_kind_once() {
        let classifiers = default_classifiers(&GestureConfig::default());
        let kinds: HashSet<GestureKind> = classifiers.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds.len(), classifiers.len());
        assert_eq!(kinds.len(), 10);
    }

    #[test]
    fn test_spawn_keeps_kind() {
        for prototype in default_classifiers(&GestureConfig::default()) {
            assert_eq!(prototype.spawn().kind(), prototype.kind());
        }
    }
}
