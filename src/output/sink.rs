//! Destinations for pipeline events.

use std::io::Write;
use std::sync::mpsc::SyncSender;

use crate::error::SinkError;

use super::{LineEncoder, PipelineEvent};

/// Receives the ordered events of every frame.
pub trait EventSink {
    fn emit(&mut self, event: &PipelineEvent) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl EventSink for Vec<PipelineEvent> {
    fn emit(&mut self, event: &PipelineEvent) -> Result<(), SinkError> {
        self.push(event.clone());
        Ok(())
    }
}

/// Forwards events over a bounded channel; blocks while the receiver is
/// behind.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: SyncSender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new(sender: SyncSender<PipelineEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: &PipelineEvent) -> Result<(), SinkError> {
        self.sender
            .send(event.clone())
            .map_err(|_| SinkError::Disconnected)
    }
}

/// Writes each event as one encoded line.
pub struct LineSink<W: Write> {
    writer: W,
    encoder: LineEncoder,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W, encoder: LineEncoder) -> Self {
        Self { writer, encoder }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for LineSink<W> {
    fn emit(&mut self, event: &PipelineEvent) -> Result<(), SinkError> {
        let line = self.encoder.encode(event)?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
