//! Frame-level orchestration over all tracked hands.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::GestureConfig;
use crate::error::ConfigError;
use crate::geometry::{HandId, HandMetrics, LandmarkSet};
use crate::gesture::{GestureClassifier, HandObservation, default_classifiers};
use crate::output::{ClearReason, PipelineEvent};

use super::{FrameStats, HandState, TrajectoryBuffer};

/// Owns the per-hand state arena and turns landmark frames into events.
pub struct GestureManager {
    config: GestureConfig,
    /// Evaluation order: dynamic gestures by priority, then static ones.
    prototypes: Vec<Box<dyn GestureClassifier>>,
    hands: HashMap<HandId, HandState>,
    stats: FrameStats,
}

impl GestureManager {
    /// Manager with every built-in classifier registered.
    pub fn new(config: GestureConfig) -> Result<Self, ConfigError> {
        let prototypes = default_classifiers(&config);
        Self::with_classifiers(config, prototypes)
    }

    /// Manager over a custom set of classifier prototypes. Each tracked hand
    /// gets its own spawned instance of every prototype.
    pub fn with_classifiers(
        config: GestureConfig,
        mut prototypes: Vec<Box<dyn GestureClassifier>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rank = |c: &Box<dyn GestureClassifier>| {
            let kind = c.kind();
            if !kind.is_dynamic() {
                return (1, 0);
            }
            let position = config
                .priority
                .iter()
                .position(|k| *k == kind)
                .unwrap_or(config.priority.len());
            (0, position)
        };
        prototypes.sort_by_key(rank);
        debug!(
            classifiers = ?prototypes.iter().map(|c| c.kind()).collect::<Vec<_>>(),
            "classifier order"
        );

        Ok(Self {
            config,
            prototypes,
            hands: HashMap::new(),
            stats: FrameStats::default(),
        })
    }

    /// Process one frame of landmark sets and return its events in order.
    pub fn process_frame(&mut self, timestamp: f64, hands: &[LandmarkSet]) -> Vec<PipelineEvent> {
        self.stats.frames += 1;
        let accepted = self.admit(hands);
        let mut events = Vec::new();
        let mut seen = HashSet::with_capacity(accepted.len());

        for (set, metrics) in &accepted {
            let hand_id = set.hand_id();
            seen.insert(hand_id.clone());

            let state = match self.hands.entry(hand_id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    info!(hand_id = %hand_id, handedness = %set.handedness(), "hand acquired");
                    self.stats.hands_acquired += 1;
                    entry.insert(HandState::new(
                        hand_id.clone(),
                        set.handedness(),
                        &self.prototypes,
                        &self.config,
                    ))
                }
            };

            let obs = HandObservation {
                timestamp,
                landmarks: set,
                metrics,
            };
            events.extend(state.observe(&obs, &mut self.stats));
        }

        let grace = self.config.detection.grace_period_frames;
        let mut expired: Vec<HandId> = self
            .hands
            .iter_mut()
            .filter(|(id, _)| !seen.contains(*id))
            .filter_map(|(id, state)| (state.mark_missing() > grace).then(|| id.clone()))
            .collect();
        expired.sort();

        for hand_id in expired {
            if let Some(mut state) = self.hands.remove(&hand_id) {
                info!(hand_id = %hand_id, missing = state.missing_frames(), "hand lost");
                self.stats.hands_lost += 1;
                if let Some(event) = state.flush_trail(timestamp, ClearReason::HandLost) {
                    events.push(event);
                }
            }
        }

        self.count(&events);
        events
    }

    /// Validate, deduplicate and confidence-filter the frame's sets.
    fn admit<'a>(&mut self, hands: &'a [LandmarkSet]) -> Vec<(&'a LandmarkSet, HandMetrics)> {
        let detection = &self.config.detection;
        let mut ids = HashSet::with_capacity(hands.len());
        let mut accepted = Vec::with_capacity(hands.len());

        for set in hands {
            self.stats.hands_observed += 1;
            let hand_id = set.hand_id();

            if !ids.insert(hand_id) {
                warn!(hand_id = %hand_id, "duplicate hand id in frame, keeping the first");
                self.stats.hands_rejected += 1;
                continue;
            }

            let metrics = match HandMetrics::compute(set, &self.config.pose) {
                Ok(metrics) => metrics,
                Err(err) => {
                    warn!(hand_id = %hand_id, error = %err, "rejecting malformed landmark set");
                    self.stats.hands_rejected += 1;
                    continue;
                }
            };

            let threshold = if self.hands.contains_key(hand_id) {
                detection.min_tracking_confidence
            } else {
                detection.detection_confidence
            };
            if set.confidence() < threshold {
                debug!(
                    hand_id = %hand_id,
                    confidence = set.confidence(),
                    threshold,
                    "hand below confidence threshold"
                );
                self.stats.hands_rejected += 1;
                continue;
            }

            accepted.push((set, metrics));
        }

        if accepted.len() > detection.max_hands {
            let mut order: Vec<usize> = (0..accepted.len()).collect();
            order.sort_by(|&a, &b| {
                accepted[b]
                    .0
                    .confidence()
                    .total_cmp(&accepted[a].0.confidence())
            });
            let keep: HashSet<usize> = order[..detection.max_hands].iter().copied().collect();
            let dropped = accepted.len() - keep.len();
            warn!(dropped, max_hands = detection.max_hands, "too many hands, keeping the most confident");
            self.stats.hands_rejected += dropped as u64;

            let mut index = 0;
            accepted.retain(|_| {
                let kept = keep.contains(&index);
                index += 1;
                kept
            });
        }

        accepted
    }

    fn count(&mut self, events: &[PipelineEvent]) {
        for event in events {
            match event {
                PipelineEvent::Gesture(_) => self.stats.gestures += 1,
                PipelineEvent::Trajectory(_) => self.stats.trail_updates += 1,
                PipelineEvent::TrailCleared(_) => self.stats.trails_cleared += 1,
            }
        }
    }

    /// Discard every in-progress trail, reporting each, while keeping the
    /// hands and their classifier state.
    pub fn flush_trails(&mut self, timestamp: f64) -> Vec<PipelineEvent> {
        let mut ids: Vec<HandId> = self.hands.keys().cloned().collect();
        ids.sort();

        let mut events = Vec::new();
        for hand_id in ids {
            if let Some(event) = self
                .hands
                .get_mut(&hand_id)
                .and_then(|state| state.flush_trail(timestamp, ClearReason::Reset))
            {
                events.push(event);
            }
        }
        self.count(&events);
        events
    }

    /// Drop all hand state without reporting anything.
    pub fn reset(&mut self) {
        debug!(hands = self.hands.len(), "manager reset");
        self.hands.clear();
    }

    /// Get a reference to the validated configuration.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Get a snapshot of the running counters.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Get the number of hands currently tracked, including ones within
    /// their grace period.
    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    /// Get the state of one tracked hand.
    pub fn hand_state(&self, hand_id: &HandId) -> Option<&HandState> {
        self.hands.get(hand_id)
    }

    /// Get the in-progress fist trail of one hand.
    pub fn trail(&self, hand_id: &HandId) -> Option<&TrajectoryBuffer> {
        self.hands.get(hand_id).and_then(HandState::trail)
    }
}
