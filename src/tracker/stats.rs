use serde::Serialize;

/// Cumulative counters kept by the manager since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameStats {
    pub frames: u64,
    /// Landmark sets received, accepted or not.
    pub hands_observed: u64,
    /// Sets rejected as malformed, duplicate, low-confidence or over the hand limit.
    pub hands_rejected: u64,
    pub hands_acquired: u64,
    pub hands_lost: u64,
    pub gestures: u64,
    pub trail_updates: u64,
    pub trails_cleared: u64,
    pub classifier_faults: u64,
}
