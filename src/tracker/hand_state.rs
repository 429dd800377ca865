//! Everything remembered about one tracked hand.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::GestureConfig;
use crate::geometry::{HandId, Handedness};
use crate::gesture::{DebounceCounter, DetectionResult, Edge, GestureClassifier, GestureKind, HandObservation};
use crate::output::{ClearReason, GestureEvent, PipelineEvent};

use super::{FrameStats, HandPresence, TrajectoryBuffer, TrajectoryTracker};

struct ClassifierSlot {
    classifier: Box<dyn GestureClassifier>,
    /// Failed on the previous frame; reset before the next one.
    faulted: bool,
}

/// Per-hand classifier instances, static-pose gates, trail and presence.
pub struct HandState {
    hand_id: HandId,
    handedness: Handedness,
    presence: HandPresence,
    slots: Vec<ClassifierSlot>,
    static_gates: HashMap<GestureKind, DebounceCounter>,
    static_confirm_frames: u32,
    static_release_frames: u32,
    cross_cooldown_frames: u32,
    /// Kind and observation number of the last reported dynamic gesture.
    last_trigger: Option<(GestureKind, u64)>,
    trajectory: TrajectoryTracker,
    missing_frames: u32,
    frames_seen: u64,
}

impl HandState {
    /// `prototypes` must already be in evaluation order.
    pub(crate) fn new(
        hand_id: HandId,
        handedness: Handedness,
        prototypes: &[Box<dyn GestureClassifier>],
        config: &GestureConfig,
    ) -> Self {
        Self {
            hand_id,
            handedness,
            presence: HandPresence::New,
            slots: prototypes
                .iter()
                .map(|p| ClassifierSlot {
                    classifier: p.spawn(),
                    faulted: false,
                })
                .collect(),
            static_gates: HashMap::new(),
            static_confirm_frames: config.pose.static_confirm_frames,
            static_release_frames: config.pose.static_release_frames,
            cross_cooldown_frames: config.cross_cooldown_frames,
            last_trigger: None,
            trajectory: TrajectoryTracker::new(config.trajectory, config.frame),
            missing_frames: 0,
            frames_seen: 0,
        }
    }

    /// Get the id this state is keyed by.
    pub fn hand_id(&self) -> &HandId {
        &self.hand_id
    }

    /// Get the handedness reported by the latest accepted set.
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Get the current presence of the hand.
    pub fn presence(&self) -> HandPresence {
        self.presence
    }

    /// Get the number of consecutive frames the hand has been absent.
    pub fn missing_frames(&self) -> u32 {
        self.missing_frames
    }

    /// Get the number of frames in which the hand was accepted.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Get the in-progress fist trail, if any.
    pub fn trail(&self) -> Option<&TrajectoryBuffer> {
        self.trajectory.trail()
    }

    /// Run every classifier and the trail tracker on one accepted set.
    pub(crate) fn observe(
        &mut self,
        obs: &HandObservation<'_>,
        stats: &mut FrameStats,
    ) -> Vec<PipelineEvent> {
        if self.frames_seen > 0 {
            self.presence = HandPresence::Tracked;
        }
        self.frames_seen += 1;
        self.missing_frames = 0;
        self.handedness = obs.landmarks.handedness();

        let mut winner: Option<DetectionResult> = None;
        let mut fist_engaged: Option<bool> = None;
        let mut statics = Vec::new();

        for slot in &mut self.slots {
            if slot.faulted {
                slot.classifier.reset();
                slot.faulted = false;
            }
            let result = match slot.classifier.process(obs) {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        hand_id = %self.hand_id,
                        gesture = %slot.classifier.kind(),
                        error = %err,
                        "classifier skipped for this frame"
                    );
                    slot.faulted = true;
                    stats.classifier_faults += 1;
                    continue;
                }
            };

            if result.kind == GestureKind::HandClose {
                fist_engaged = Some(result.engaged);
            }
            if !result.kind.is_dynamic() {
                statics.push(result);
            } else if result.triggered {
                if let Some(first) = &winner {
                    debug!(
                        hand_id = %self.hand_id,
                        kept = %first.kind,
                        dropped = %result.kind,
                        "lower-priority trigger suppressed"
                    );
                } else if let Some(previous) = cooling_down(
                    self.last_trigger,
                    result.kind,
                    self.frames_seen,
                    self.cross_cooldown_frames,
                ) {
                    debug!(
                        hand_id = %self.hand_id,
                        previous = %previous,
                        dropped = %result.kind,
                        "trigger suppressed by cross-gesture cooldown"
                    );
                } else {
                    winner = Some(result);
                }
            }
        }

        let mut events = Vec::new();
        let suppress_static = winner.is_some() || fist_engaged == Some(true);

        if let Some(result) = winner {
            self.last_trigger = Some((result.kind, self.frames_seen));
            info!(hand_id = %self.hand_id, gesture = %result.kind, "gesture detected");
            events.push(PipelineEvent::Gesture(GestureEvent::from_result(
                obs.timestamp,
                self.handedness,
                result,
            )));
        }

        for result in statics {
            let (confirm, release) = (self.static_confirm_frames, self.static_release_frames);
            let gate = self
                .static_gates
                .entry(result.kind)
                .or_insert_with(|| DebounceCounter::new(confirm, release));
            if gate.update(result.engaged && !suppress_static) == Some(Edge::Rising) {
                info!(hand_id = %self.hand_id, gesture = %result.kind, "pose detected");
                events.push(PipelineEvent::Gesture(GestureEvent::from_result(
                    obs.timestamp,
                    self.handedness,
                    result,
                )));
            }
        }

        // The trail only follows frames where the fist classifier reported.
        if let Some(engaged) = fist_engaged {
            let center = obs.metrics.palm_center.xy();
            if let Some(event) =
                self.trajectory
                    .update(obs.timestamp, &self.hand_id, self.handedness, engaged, center)
            {
                events.push(event);
            }
        }

        events
    }

    /// Count one more absent frame and return the running total.
    pub(crate) fn mark_missing(&mut self) -> u32 {
        self.presence = HandPresence::Lost;
        self.missing_frames = self.missing_frames.saturating_add(1);
        self.missing_frames
    }

    /// Discard any in-progress trail, reporting it.
    pub(crate) fn flush_trail(&mut self, timestamp: f64, reason: ClearReason) -> Option<PipelineEvent> {
        self.trajectory
            .clear(timestamp, &self.hand_id, self.handedness, reason)
    }
}

/// The previously reported kind when `kind` falls inside its cross-gesture
/// cooldown at observation `frame`.
fn cooling_down(
    last: Option<(GestureKind, u64)>,
    kind: GestureKind,
    frame: u64,
    window: u32,
) -> Option<GestureKind> {
    let (previous, at) = last?;
    (previous != kind && frame.saturating_sub(at) <= u64::from(window)).then_some(previous)
}
