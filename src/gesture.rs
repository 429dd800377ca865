//! Gesture vocabulary and the per-hand classifiers that recognize it.
//!
//! Static classifiers judge a single frame. Dynamic classifiers own bounded
//! sample windows and small state machines that turn noisy per-frame signals
//! into one-shot triggers.

mod classifier;
mod fist;
mod flip;
mod kind;
mod static_pose;
mod swipe;
mod window;

pub use classifier::{GestureClassifier, HandObservation, default_classifiers};
pub use fist::{FistClassifier, FistMode, FistPhase};
pub use flip::FlipClassifier;
pub use kind::{DetectionResult, GestureKind, PalmFacing, Payload, SwipeDirection, ThumbDirection};
pub use static_pose::{FingerCount, FingerCountClassifier, ThumbClassifier};
pub use swipe::{MotionPhase, SwipeClassifier, SwipePosture};
pub use window::{DebounceCounter, Edge, SampleWindow};
