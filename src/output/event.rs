use serde::Serialize;

use crate::geometry::{HandId, Handedness};
use crate::gesture::{DetectionResult, GestureKind, Payload};

/// Pixel position in the configured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Displacement between two consecutive trail points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Movement {
    pub dx: i32,
    pub dy: i32,
    pub distance: f32,
}

impl Movement {
    pub fn between(from: Position, to: Position) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        Self {
            dx,
            dy,
            distance: (dx as f32).hypot(dy as f32),
        }
    }
}

/// A recognized gesture, one per continuous activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureEvent {
    pub timestamp: f64,
    pub hand_id: HandId,
    #[serde(rename = "hand_type")]
    pub handedness: Handedness,
    pub gesture: GestureKind,
    pub confidence: f32,
    pub metadata: Payload,
}

impl GestureEvent {
    pub fn from_result(timestamp: f64, handedness: Handedness, result: DetectionResult) -> Self {
        Self {
            timestamp,
            hand_id: result.hand_id,
            handedness,
            gesture: result.kind,
            confidence: result.confidence,
            metadata: result.payload,
        }
    }
}

/// A point appended to a fist trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryUpdate {
    pub timestamp: f64,
    pub hand_id: HandId,
    #[serde(rename = "hand_type")]
    pub handedness: Handedness,
    pub position: Position,
    pub movement: Movement,
    pub previous_position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// The fist was released.
    Released,
    /// The hand stayed missing past the grace period.
    HandLost,
    /// The pipeline was flushed or reset.
    Reset,
}

impl ClearReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Released => "released",
            Self::HandLost => "hand_lost",
            Self::Reset => "reset",
        }
    }
}

/// A trail was discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailCleared {
    pub timestamp: f64,
    pub hand_id: HandId,
    #[serde(rename = "hand_type")]
    pub handedness: Handedness,
    /// Points held by the trail when it was discarded.
    pub points: usize,
    pub reason: ClearReason,
}

/// Everything the manager reports for a frame, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Gesture(GestureEvent),
    Trajectory(TrajectoryUpdate),
    TrailCleared(TrailCleared),
}

impl PipelineEvent {
    pub fn hand_id(&self) -> &HandId {
        match self {
            Self::Gesture(e) => &e.hand_id,
            Self::Trajectory(e) => &e.hand_id,
            Self::TrailCleared(e) => &e.hand_id,
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            Self::Gesture(e) => e.timestamp,
            Self::Trajectory(e) => e.timestamp,
            Self::TrailCleared(e) => e.timestamp,
        }
    }

    pub fn as_gesture(&self) -> Option<&GestureEvent> {
        match self {
            Self::Gesture(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_trajectory(&self) -> Option<&TrajectoryUpdate> {
        match self {
            Self::Trajectory(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_trail_cleared(&self) -> Option<&TrailCleared> {
        match self {
            Self::TrailCleared(e) => Some(e),
            _ => None,
        }
    }
}
