//! Typed output records and the adapters that deliver them.
//!
//! [`PipelineEvent`] is the primary contract; [`LineEncoder`] and the
//! [`EventSink`] implementations turn it into text lines or channel messages.

mod encoder;
mod event;
mod sink;

pub use encoder::{LineEncoder, OutputFormat};
pub use event::{ClearReason, GestureEvent, Movement, PipelineEvent, Position, TrailCleared, TrajectoryUpdate};
pub use sink::{ChannelSink, EventSink, LineSink};
