//! Fist trail tracking: debounce, EMA smoothing, movement gating and a
//! bounded point buffer.

use nalgebra::Point2;
use tracing::debug;

use crate::config::{FrameConfig, TrajectoryConfig};
use crate::geometry::{HandId, Handedness};
use crate::gesture::{DebounceCounter, Edge, SampleWindow};
use crate::output::{ClearReason, Movement, PipelineEvent, Position, TrailCleared, TrajectoryUpdate};

/// A smoothed trail sample in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub x: i32,
    pub y: i32,
    pub timestamp: f64,
}

impl TrajectoryPoint {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Capacity-bounded FIFO of trail points; the oldest point is evicted first.
#[derive(Debug, Clone)]
pub struct TrajectoryBuffer {
    points: SampleWindow<TrajectoryPoint>,
}

impl TrajectoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: SampleWindow::new(capacity),
        }
    }

    pub fn push(&mut self, point: TrajectoryPoint) -> Option<TrajectoryPoint> {
        self.points.push(point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.oldest()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.newest()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter()
    }
}

/// Per-hand trail lifecycle driven by the fist-close engaged signal.
#[derive(Debug, Clone)]
pub struct TrajectoryTracker {
    config: TrajectoryConfig,
    frame: FrameConfig,
    gate: DebounceCounter,
    trail: Option<TrajectoryBuffer>,
    smoothed: Option<Point2<f32>>,
    frames_since_append: u32,
}

impl TrajectoryTracker {
    pub fn new(config: TrajectoryConfig, frame: FrameConfig) -> Self {
        Self {
            config,
            frame,
            gate: DebounceCounter::new(config.debounce_frames, config.clear_frames),
            trail: None,
            smoothed: None,
            frames_since_append: 0,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.trail.is_some()
    }

    pub fn trail(&self) -> Option<&TrajectoryBuffer> {
        self.trail.as_ref()
    }

    /// Feed one frame. `palm_center` is in normalized image coordinates.
    pub fn update(
        &mut self,
        timestamp: f64,
        hand_id: &HandId,
        handedness: Handedness,
        engaged: bool,
        palm_center: Point2<f32>,
    ) -> Option<PipelineEvent> {
        if !self.config.enabled {
            return None;
        }

        match self.gate.update(engaged) {
            Some(Edge::Rising) => {
                debug!(hand_id = %hand_id, "trail started");
                self.trail = Some(TrajectoryBuffer::new(self.config.max_trail_points));
                self.smoothed = None;
                self.frames_since_append = 0;
            }
            Some(Edge::Falling) => {
                return self.clear(timestamp, hand_id, handedness, ClearReason::Released);
            }
            None => {}
        }

        if !engaged {
            return None;
        }
        let trail = self.trail.as_mut()?;

        let pixel = Point2::new(
            palm_center.x * self.frame.width as f32,
            palm_center.y * self.frame.height as f32,
        );
        let alpha = self.config.ema_smoothing_factor;
        let smoothed = match self.smoothed {
            Some(previous) => previous + (pixel - previous) * alpha,
            None => pixel,
        };
        self.smoothed = Some(smoothed);
        self.frames_since_append = self.frames_since_append.saturating_add(1);

        let candidate = TrajectoryPoint {
            x: smoothed.x.round() as i32,
            y: smoothed.y.round() as i32,
            timestamp,
        };

        let Some(last) = trail.last().copied() else {
            // Anchor point, nothing to report yet.
            trail.push(candidate);
            self.frames_since_append = 0;
            return None;
        };

        if self.frames_since_append < self.config.output_interval_frames {
            return None;
        }
        let movement = Movement::between(last.position(), candidate.position());
        if movement.distance <= self.config.movement_threshold {
            return None;
        }

        trail.push(candidate);
        self.frames_since_append = 0;
        Some(PipelineEvent::Trajectory(TrajectoryUpdate {
            timestamp,
            hand_id: hand_id.clone(),
            handedness,
            position: candidate.position(),
            movement,
            previous_position: last.position(),
        }))
    }

    /// Discard the trail, reporting it if one existed.
    pub fn clear(
        &mut self,
        timestamp: f64,
        hand_id: &HandId,
        handedness: Handedness,
        reason: ClearReason,
    ) -> Option<PipelineEvent> {
        self.gate.reset();
        self.smoothed = None;
        self.frames_since_append = 0;
        let trail = self.trail.take()?;
        debug!(hand_id = %hand_id, points = trail.len(), reason = reason.as_str(), "trail cleared");
        Some(PipelineEvent::TrailCleared(TrailCleared {
            timestamp,
            hand_id: hand_id.clone(),
            handedness,
            points: trail.len(),
            reason,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TrajectoryConfig {
        TrajectoryConfig {
            ema_smoothing_factor: 1.0,
            ..TrajectoryConfig::default()
        }
    }

    fn frame() -> FrameConfig {
        FrameConfig {
            width: 1000,
            height: 1000,
        }
    }

    struct Driver {
        tracker: TrajectoryTracker,
        id: HandId,
        t: f64,
    }

    impl Driver {
        fn new(config: TrajectoryConfig) -> Self {
            Self {
                tracker: TrajectoryTracker::new(config, frame()),
                id: HandId::from("0"),
                t: 0.0,
            }
        }

        fn step(&mut self, engaged: bool, x: f32, y: f32) -> Option<PipelineEvent> {
            self.t += 1.0 / 30.0;
            self.tracker
                .update(self.t, &self.id, Handedness::Right, engaged, Point2::new(x, y))
        }
    }

    #[test]
    fn test_buffer_evicts_oldest_at_capacity() {
        let mut buffer = TrajectoryBuffer::new(3);
        for i in 0..5 {
            buffer.push(TrajectoryPoint {
                x: i,
                y: 0,
                timestamp: i as f64,
            });
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.first().map(|p| p.x), Some(2));
        assert_eq!(buffer.last().map(|p| p.x), Some(4));
    }

    #[test]
    fn test_trail_starts_after_debounce() {
        let mut driver = Driver::new(config());
        driver.step(true, 0.1, 0.1);
        driver.step(true, 0.1, 0.1);
        assert!(!driver.tracker.is_tracking());
        assert!(driver.step(true, 0.1, 0.1).is_none());
        assert!(driver.tracker.is_tracking());
        assert_eq!(driver.tracker.trail().map(TrajectoryBuffer::len), Some(1));
    }

    #[test]
    fn test_flapping_never_starts_trail() {
        let mut driver = Driver::new(config());
        for i in 0..40 {
            driver.step(i % 3 != 2, 0.1, 0.1);
        }
        assert!(!driver.tracker.is_tracking());
    }

    #[test]
    fn test_movement_below_threshold_is_gated() {
        let mut driver = Driver::new(config());
        for _ in 0..3 {
            driver.step(true, 0.100, 0.1);
        }
        // 4 px and then exactly 5 px from the anchor.
        assert!(driver.step(true, 0.104, 0.1).is_none());
        assert!(driver.step(true, 0.105, 0.1).is_none());
        let event = driver.step(true, 0.106, 0.1).unwrap();
        let update = event.as_trajectory().unwrap();
        assert_eq!(update.previous_position, Position::new(100, 100));
        assert_eq!(update.position, Position::new(106, 100));
        assert_eq!(update.movement.dx, 6);
    }

    #[test]
    fn test_trail_length_is_bounded() {
        let mut driver = Driver::new(TrajectoryConfig {
            max_trail_points: 4,
            ..config()
        });
        let mut updates = 0;
        for i in 0..30 {
            if driver.step(true, 0.1 + 0.01 * i as f32, 0.5).is_some() {
                updates += 1;
            }
            assert!(driver.tracker.trail().map_or(0, TrajectoryBuffer::len) <= 4);
        }
        assert_eq!(updates, 27);
        let trail = driver.tracker.trail().unwrap();
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.last().map(|p| p.x), Some(390));
    }

    #[test]
    fn test_release_clears_after_clear_frames() {
        let mut driver = Driver::new(config());
        for _ in 0..3 {
            driver.step(true, 0.1, 0.1);
        }
        for _ in 0..4 {
            assert!(driver.step(false, 0.1, 0.1).is_none());
        }
        let event = driver.step(false, 0.1, 0.1).unwrap();
        let cleared = event.as_trail_cleared().unwrap();
        assert_eq!(cleared.reason, ClearReason::Released);
        assert_eq!(cleared.points, 1);
        assert!(!driver.tracker.is_tracking());
    }

    #[test]
    fn test_brief_release_keeps_trail() {
        let mut driver = Driver::new(config());
        for _ in 0..3 {
            driver.step(true, 0.1, 0.1);
        }
        for _ in 0..4 {
            driver.step(false, 0.1, 0.1);
        }
        driver.step(true, 0.1, 0.1);
        for _ in 0..4 {
            assert!(driver.step(false, 0.1, 0.1).is_none());
        }
        assert!(driver.tracker.is_tracking());
    }

    #[test]
    fn test_ema_smooths_jumps() {
        let mut driver = Driver::new(TrajectoryConfig {
            ema_smoothing_factor: 0.5,
            ..TrajectoryConfig::default()
        });
        for _ in 0..3 {
            driver.step(true, 0.1, 0.1);
        }
        let event = driver.step(true, 0.2, 0.1).unwrap();
        assert_eq!(event.as_trajectory().unwrap().position, Position::new(150, 100));
    }

    #[test]
    fn test_output_interval_spaces_points() {
        let mut driver = Driver::new(TrajectoryConfig {
            output_interval_frames: 3,
            ..config()
        });
        let mut emitted = Vec::new();
        for i in 0..12 {
            emitted.push(driver.step(true, 0.1 + 0.02 * i as f32, 0.5).is_some());
        }
        let frames: Vec<usize> = emitted.iter().enumerate().filter(|(_, e)| **e).map(|(i, _)| i).collect();
        assert_eq!(frames, vec![5, 8, 11]);
    }

    #[test]
    fn test_disabled_tracker_never_starts() {
        let mut driver = Driver::new(TrajectoryConfig {
            enabled: false,
            ..config()
        });
        for _ in 0..10 {
            assert!(driver.step(true, 0.1, 0.1).is_none());
        }
        assert!(!driver.tracker.is_tracking());
    }
}
