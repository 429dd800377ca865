mod hand_state;
mod manager;
mod presence;
mod stats;
mod trajectory;

pub use hand_state::HandState;
pub use manager::GestureManager;
pub use presence::HandPresence;
pub use stats::FrameStats;
pub use trajectory::{TrajectoryBuffer, TrajectoryPoint, TrajectoryTracker};
