//! Line encodings for the console / socket consumers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::geometry::{HandId, Handedness};

use super::{PipelineEvent, TrailCleared};

pub const TRAIL_UPDATE_MARKER: &str = "[TRAIL_UPDATE]";
pub const GESTURE_MARKER: &str = "[GESTURE_DETECTED]";
pub const TRAIL_CLEARED_MARKER: &str = "[TRAIL_CLEARED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    #[default]
    Simple,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "simple" => Ok(Self::Simple),
            other => Err(format!("unknown output format `{other}` (expected json or simple)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Simple => "simple",
        })
    }
}

/// Renders one event per line, prefixed with its marker token.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEncoder {
    format: OutputFormat,
}

impl LineEncoder {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn encode(&self, event: &PipelineEvent) -> Result<String, SinkError> {
        let marker = match event {
            PipelineEvent::Gesture(_) => GESTURE_MARKER,
            PipelineEvent::Trajectory(_) => TRAIL_UPDATE_MARKER,
            PipelineEvent::TrailCleared(_) => TRAIL_CLEARED_MARKER,
        };
        let body = match self.format {
            OutputFormat::Json => match event {
                PipelineEvent::Gesture(e) => serde_json::to_string(e)?,
                PipelineEvent::Trajectory(e) => serde_json::to_string(e)?,
                PipelineEvent::TrailCleared(e) => serde_json::to_string(e)?,
            },
            OutputFormat::Simple => simple(event),
        };
        Ok(format!("{marker} {body}"))
    }
}

fn label(handedness: Handedness, hand_id: &HandId) -> String {
    format!("{handedness}_{hand_id}")
}

fn simple(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::Trajectory(e) => format!(
            "{}: pos=({},{}) move=({:+},{:+}) dist={:.2}",
            label(e.handedness, &e.hand_id),
            e.position.x,
            e.position.y,
            e.movement.dx,
            e.movement.dy,
            e.movement.distance
        ),
        PipelineEvent::Gesture(e) => {
            let summary = e.metadata.summary();
            let head = format!("{}: {}", label(e.handedness, &e.hand_id), e.gesture);
            if summary.is_empty() {
                head
            } else {
                format!("{head} {summary}")
            }
        }
        PipelineEvent::TrailCleared(TrailCleared {
            hand_id,
            handedness,
            points,
            reason,
            ..
        }) => format!(
            "{}: reason={} points={points}",
            label(*handedness, hand_id),
            reason.as_str()
        ),
    }
}
