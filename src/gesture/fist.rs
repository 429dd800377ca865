//! Fist close / release state machine driven by hand openness.

use tracing::debug;

use crate::config::FistConfig;
use crate::error::ClassifierError;

use super::{DetectionResult, GestureClassifier, GestureKind, HandObservation, Payload, SampleWindow};

/// Which transition the machine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FistMode {
    /// Open hand closing into a fist.
    Close,
    /// Fist opening back up.
    Open,
}

impl FistMode {
    /// The hand is in this mode's target state.
    fn is_active(self, openness: f32, config: &FistConfig) -> bool {
        match self {
            Self::Close => openness < config.close_threshold,
            Self::Open => openness > config.open_threshold,
        }
    }

    /// The sample shows the opposite state, which must precede a trigger.
    fn primes(self, openness: f32, config: &FistConfig) -> bool {
        match self {
            Self::Close => openness >= config.open_threshold,
            Self::Open => openness <= config.close_threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FistPhase {
    #[default]
    Idle,
    /// Consecutive active frames seen so far.
    Entering(u32),
    /// Trigger frame.
    Entered,
    Holding,
    /// Consecutive inactive frames seen so far.
    Exiting(u32),
}

impl FistPhase {
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Entered | Self::Holding | Self::Exiting(_))
    }
}

#[derive(Debug, Clone)]
pub struct FistClassifier {
    mode: FistMode,
    config: FistConfig,
    phase: FistPhase,
    history: SampleWindow<f32>,
    held_frames: u32,
}

impl FistClassifier {
    pub fn new(mode: FistMode, config: FistConfig) -> Self {
        Self {
            mode,
            config,
            phase: FistPhase::Idle,
            history: SampleWindow::new(config.history_frames),
            held_frames: 0,
        }
    }

    pub fn phase(&self) -> FistPhase {
        self.phase
    }

    fn step(&self, active: bool, primed: bool) -> FistPhase {
        let confirm = self.config.confirm_frames.max(1);
        match self.phase {
            FistPhase::Idle if active && primed => {
                if confirm == 1 {
                    FistPhase::Entered
                } else {
                    FistPhase::Entering(1)
                }
            }
            FistPhase::Idle => FistPhase::Idle,
            FistPhase::Entering(n) if active => {
                if n + 1 >= confirm {
                    FistPhase::Entered
                } else {
                    FistPhase::Entering(n + 1)
                }
            }
            FistPhase::Entering(_) => FistPhase::Idle,
            FistPhase::Entered | FistPhase::Holding if active => FistPhase::Holding,
            FistPhase::Entered | FistPhase::Holding => {
                if confirm == 1 {
                    FistPhase::Idle
                } else {
                    FistPhase::Exiting(1)
                }
            }
            FistPhase::Exiting(_) if active => FistPhase::Holding,
            FistPhase::Exiting(n) => {
                if n + 1 >= confirm {
                    FistPhase::Idle
                } else {
                    FistPhase::Exiting(n + 1)
                }
            }
        }
    }
}

impl GestureClassifier for FistClassifier {
    fn kind(&self) -> GestureKind {
        match self.mode {
            FistMode::Close => GestureKind::HandClose,
            FistMode::Open => GestureKind::HandOpen,
        }
    }

    fn process(&mut self, obs: &HandObservation<'_>) -> Result<DetectionResult, ClassifierError> {
        let openness = obs.metrics.openness;
        if !openness.is_finite() {
            return Err(ClassifierError::NonFiniteMetric("openness"));
        }

        let active = self.mode.is_active(openness, &self.config);
        let primed = self
            .history
            .iter()
            .any(|v| self.mode.primes(*v, &self.config));
        self.history.push(openness);

        let next = self.step(active, primed);
        if next != self.phase {
            debug!(
                hand_id = %obs.landmarks.hand_id(),
                gesture = %self.kind(),
                from = ?self.phase,
                to = ?next,
                openness,
                "fist phase change"
            );
        }
        self.phase = next;

        if !self.phase.is_engaged() {
            self.held_frames = 0;
            return Ok(DetectionResult::inactive(self.kind(), obs.landmarks.hand_id()));
        }

        self.held_frames += 1;
        Ok(DetectionResult {
            kind: self.kind(),
            hand_id: obs.landmarks.hand_id().clone(),
            triggered: self.phase == FistPhase::Entered,
            engaged: true,
            confidence: obs.landmarks.confidence(),
            payload: Payload::Fist {
                openness,
                spread: obs.metrics.spread,
                frames: self.held_frames,
            },
        })
    }

    fn reset(&mut self) {
        self.phase = FistPhase::Idle;
        self.history.clear();
        self.held_frames = 0;
    }

    fn spawn(&self) -> Box<dyn GestureClassifier> {
        Box::new(Self::new(self.mode, self.config))
    }
}
