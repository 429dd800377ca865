//! Landmark frame sources.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::geometry::{HandId, Handedness, LandmarkSet};

/// All hands detected in one video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Capture time in seconds.
    pub timestamp: f64,
    pub hands: Vec<LandmarkSet>,
}

impl LandmarkFrame {
    pub fn new(timestamp: f64, hands: Vec<LandmarkSet>) -> Self {
        Self { timestamp, hands }
    }

    /// One-line JSON record in the format read by [`JsonLinesSource`].
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&FrameRecord::from(self))
    }
}

/// Trait for anything that delivers landmark frames in capture order.
///
/// Implement this to connect a live landmark extractor to the pipeline.
///
/// # Example
///
/// ```ignore
/// struct Replay(std::vec::IntoIter<LandmarkFrame>);
///
/// impl LandmarkSource for Replay {
///     type Error = std::convert::Infallible;
///
///     fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, Self::Error> {
///         Ok(self.0.next())
///     }
/// }
/// ```
pub trait LandmarkSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, Self::Error>;
}

#[derive(Debug, Serialize, Deserialize)]
struct FrameRecord {
    timestamp: f64,
    #[serde(default)]
    hands: Vec<HandRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HandRecord {
    hand_id: HandId,
    handedness: Handedness,
    confidence: f32,
    landmarks: Vec<[f32; 3]>,
}

impl From<FrameRecord> for LandmarkFrame {
    fn from(record: FrameRecord) -> Self {
        let hands = record
            .hands
            .into_iter()
            .map(|h| {
                let points = h
                    .landmarks
                    .into_iter()
                    .map(|[x, y, z]| Point3::new(x, y, z))
                    .collect();
                LandmarkSet::new(h.hand_id, h.handedness, h.confidence, points)
            })
            .collect();
        Self {
            timestamp: record.timestamp,
            hands,
        }
    }
}

impl From<&LandmarkFrame> for FrameRecord {
    fn from(frame: &LandmarkFrame) -> Self {
        Self {
            timestamp: frame.timestamp,
            hands: frame
                .hands
                .iter()
                .map(|set| HandRecord {
                    hand_id: set.hand_id().clone(),
                    handedness: set.handedness(),
                    confidence: set.confidence(),
                    landmarks: set.points().iter().map(|p| [p.x, p.y, p.z]).collect(),
                })
                .collect(),
        }
    }
}

/// Reads one JSON frame record per line; blank lines are skipped.
///
/// Landmark sets are not validated here; malformed hands are rejected by the
/// manager for their frame only.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    type Error = SourceError;

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let record = self.buf.trim();
            if record.is_empty() {
                continue;
            }
            let record: FrameRecord = serde_json::from_str(record).map_err(|source| SourceError::Parse {
                line: self.line,
                source,
            })?;
            return Ok(Some(record.into()));
        }
    }
}
