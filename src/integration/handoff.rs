//! Single-frame hand-off between a capture thread and the processing thread.

use std::convert::Infallible;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::{LandmarkFrame, LandmarkSource};

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<LandmarkFrame>,
    closed: bool,
    dropped: u64,
}

/// Holds at most one pending frame. A new frame overwrites an unconsumed
/// one, so a slow consumer always sees the latest capture.
#[derive(Debug, Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a frame. Returns true when an unconsumed frame was dropped.
    /// Frames offered after [`close`](Self::close) are discarded.
    pub fn offer(&self, frame: LandmarkFrame) -> bool {
        let mut state = self.lock();
        if state.closed {
            debug!(timestamp = frame.timestamp, "frame offered after close");
            return false;
        }
        let dropped = state.pending.replace(frame).is_some();
        if dropped {
            state.dropped += 1;
            warn!(total = state.dropped, "processing behind capture, dropped oldest frame");
        }
        self.ready.notify_one();
        dropped
    }

    /// Wait for the next frame. Returns `None` once closed and drained.
    pub fn take(&self) -> Option<LandmarkFrame> {
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.pending.take() {
                return Some(frame);
            }
            if state.closed {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn try_take(&self) -> Option<LandmarkFrame> {
        self.lock().pending.take()
    }

    /// Stop accepting frames and wake any waiting consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Frames overwritten before they were consumed.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

/// Consumer side of a shared [`FrameSlot`].
#[derive(Debug, Clone)]
pub struct SlotSource {
    slot: Arc<FrameSlot>,
}

impl SlotSource {
    pub fn new(slot: Arc<FrameSlot>) -> Self {
        Self { slot }
    }
}

impl LandmarkSource for SlotSource {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, Infallible> {
        Ok(self.slot.take())
    }
}
