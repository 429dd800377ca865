//! GesturePipeline for combining a landmark source with the gesture manager.

use tracing::{info, warn};

use crate::config::GestureConfig;
use crate::error::{ConfigError, PipelineError};
use crate::output::{EventSink, PipelineEvent};
use crate::tracker::GestureManager;

use super::LandmarkSource;

/// Bundles any [`LandmarkSource`] with a [`GestureManager`] and drives
/// frames through it one at a time.
pub struct GesturePipeline<S: LandmarkSource> {
    source: S,
    manager: GestureManager,
    last_timestamp: Option<f64>,
    frames: u64,
}

impl<S: LandmarkSource> GesturePipeline<S> {
    /// Create a pipeline with the built-in classifiers.
    pub fn new(source: S, config: GestureConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_manager(source, GestureManager::new(config)?))
    }

    /// Create a pipeline around an already configured manager.
    pub fn with_manager(source: S, manager: GestureManager) -> Self {
        Self {
            source,
            manager,
            last_timestamp: None,
            frames: 0,
        }
    }

    /// Pull and process a single frame.
    ///
    /// Returns `None` once the source is exhausted.
    pub fn process_next(&mut self) -> Result<Option<Vec<PipelineEvent>>, S::Error> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        if self.last_timestamp.is_some_and(|last| frame.timestamp < last) {
            warn!(
                timestamp = frame.timestamp,
                previous = ?self.last_timestamp,
                "frame timestamp went backwards"
            );
        }
        self.last_timestamp = Some(frame.timestamp);
        self.frames += 1;
        Ok(Some(self.manager.process_frame(frame.timestamp, &frame.hands)))
    }

    /// Process frames until the source ends, delivering every event to
    /// `sink`. Trails still open at the end are flushed and reported.
    ///
    /// Returns the number of frames processed by this call.
    pub fn run<K: EventSink>(&mut self, sink: &mut K) -> Result<u64, PipelineError<S::Error>> {
        let start = self.frames;
        while let Some(events) = self.process_next().map_err(PipelineError::Source)? {
            for event in &events {
                sink.emit(event)?;
            }
        }

        if let Some(timestamp) = self.last_timestamp {
            for event in &self.manager.flush_trails(timestamp) {
                sink.emit(event)?;
            }
        }
        sink.flush()?;

        let processed = self.frames - start;
        info!(frames = processed, stats = ?self.manager.stats(), "landmark stream finished");
        Ok(processed)
    }

    /// Drop all per-hand state; the source is left untouched.
    pub fn reset(&mut self) {
        self.manager.reset();
        self.last_timestamp = None;
    }

    /// Get a reference to the underlying landmark source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying landmark source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying gesture manager.
    pub fn manager(&self) -> &GestureManager {
        &self.manager
    }

    /// Get a mutable reference to the underlying gesture manager.
    pub fn manager_mut(&mut self) -> &mut GestureManager {
        &mut self.manager
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::integration::{HandPose, LandmarkFrame, LandmarkSetBuilder};
    use crate::output::ClearReason;

    struct MockSource {
        frames: std::vec::IntoIter<LandmarkFrame>,
    }

    impl LandmarkSource for MockSource {
        type Error = Infallible;

        fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, Self::Error> {
            Ok(self.frames.next())
        }
    }

    fn source(poses: &[HandPose]) -> MockSource {
        let frames: Vec<LandmarkFrame> = poses
            .iter()
            .enumerate()
            .map(|(i, pose)| {
                LandmarkFrame::new(
                    i as f64 / 30.0,
                    vec![
                        LandmarkSetBuilder::new("0")
                            .pose(*pose)
                            .wrist(0.3 + 0.01 * i as f32, 0.7)
                            .build(),
                    ],
                )
            })
            .collect();
        MockSource {
            frames: frames.into_iter(),
        }
    }

    #[test]
    fn test_pipeline_runs_to_end() {
        let mut pipeline = GesturePipeline::new(source(&[HandPose::Open; 5]), GestureConfig::default()).unwrap();
        let mut events: Vec<PipelineEvent> = Vec::new();
        assert_eq!(pipeline.run(&mut events).unwrap(), 5);
        assert!(events.is_empty());
        assert_eq!(pipeline.manager().stats().frames, 5);
    }

    #[test]
    fn test_open_trail_is_flushed_at_end() {
        let mut poses = vec![HandPose::Open; 3];
        poses.extend([HandPose::Fist; 12]);
        let mut pipeline = GesturePipeline::new(source(&poses), GestureConfig::default()).unwrap();
        let mut events: Vec<PipelineEvent> = Vec::new();
        pipeline.run(&mut events).unwrap();

        let last = events.last().and_then(PipelineEvent::as_trail_cleared).unwrap();
        assert_eq!(last.reason, ClearReason::Reset);
        assert!(events.iter().any(|e| e.as_trajectory().is_some()));
    }
}
