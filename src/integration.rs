//! Integration module for connecting landmark extractors and consumers with
//! the gesture manager.
//!
//! This module provides the source trait, a recorded-stream reader, a
//! capture-thread hand-off and a builder for synthetic hands.

mod builder;
mod handoff;
mod pipeline;
mod source;

pub use builder::{HandPose, LandmarkSetBuilder};
pub use handoff::{FrameSlot, SlotSource};
pub use pipeline::GesturePipeline;
pub use source::{JsonLinesSource, LandmarkFrame, LandmarkSource};

pub use crate::gesture::PalmFacing;
