//! Hand gesture classification over per-frame hand landmarks.
//!
//! A [`GestureManager`] receives the landmark sets of each frame, runs the
//! static and dynamic classifiers of every tracked hand, follows fist trails
//! and returns the frame's [`PipelineEvent`]s in order.
//!
//! ```ignore
//! use handgesture_rs::{GestureConfig, GestureManager};
//!
//! let mut manager = GestureManager::new(GestureConfig::default())?;
//! for frame in frames {
//!     for event in manager.process_frame(frame.timestamp, &frame.hands) {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod integration;
pub mod output;
pub mod tracker;

pub use config::GestureConfig;
pub use error::{ClassifierError, ConfigError, LandmarkError, PipelineError, SinkError, SourceError};
pub use geometry::{HandId, HandMetrics, Handedness, LandmarkSet};
pub use gesture::{DetectionResult, GestureClassifier, GestureKind, HandObservation, Payload};
pub use integration::{GesturePipeline, JsonLinesSource, LandmarkFrame, LandmarkSetBuilder, LandmarkSource};
pub use output::{EventSink, GestureEvent, LineEncoder, OutputFormat, PipelineEvent, TrajectoryUpdate};
pub use tracker::{FrameStats, GestureManager, TrajectoryBuffer};
