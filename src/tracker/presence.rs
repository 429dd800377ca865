/// Presence lifecycle of a tracked hand. Past the grace period the state
/// is dropped from the manager altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandPresence {
    /// First frame the hand was seen
    #[default]
    New,
    /// Seen in the latest frame
    Tracked,
    /// Missing, still within the grace period
    Lost,
}
