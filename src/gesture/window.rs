//! Bounded sample windows and the hysteresis counter shared by the
//! classifiers and the trajectory tracker.

use std::collections::VecDeque;

/// Fixed-capacity FIFO of recent samples; pushing into a full window evicts
/// the oldest sample.
#[derive(Debug, Clone)]
pub struct SampleWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> SampleWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted one when the window was full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&T> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Transition reported by a [`DebounceCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Hysteresis gate over a boolean signal.
///
/// The latched state flips to active after `rise_frames` consecutive active
/// samples and back after `fall_frames` consecutive inactive ones. Any sample
/// agreeing with the latched state resets the pending streak, so a signal
/// flapping faster than the thresholds never changes the output.
#[derive(Debug, Clone)]
pub struct DebounceCounter {
    rise_frames: u32,
    fall_frames: u32,
    latched: bool,
    streak: u32,
}

impl DebounceCounter {
    pub fn new(rise_frames: u32, fall_frames: u32) -> Self {
        Self {
            rise_frames: rise_frames.max(1),
            fall_frames: fall_frames.max(1),
            latched: false,
            streak: 0,
        }
    }

    pub fn update(&mut self, active: bool) -> Option<Edge> {
        if active == self.latched {
            self.streak = 0;
            return None;
        }

        self.streak += 1;
        let needed = if self.latched {
            self.fall_frames
        } else {
            self.rise_frames
        };
        if self.streak < needed {
            return None;
        }

        self.latched = active;
        self.streak = 0;
        Some(if active { Edge::Rising } else { Edge::Falling })
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn reset(&mut self) {
        self.latched = false;
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = SampleWindow::new(3);
        assert_eq!(window.push(1), None);
        window.push(2);
        window.push(3);
        assert!(window.is_full());
        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.oldest(), Some(&2));
        assert_eq!(window.newest(), Some(&4));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_zero_capacity_window_holds_one() {
        let mut window = SampleWindow::new(0);
        window.push('a');
        assert_eq!(window.push('b'), Some('a'));
        assert_eq!(window.capacity(), 1);
    }

    #[test]
    fn test_debounce_rises_after_streak() {
        let mut gate = DebounceCounter::new(3, 2);
        assert_eq!(gate.update(true), None);
        assert_eq!(gate.update(true), None);
        assert_eq!(gate.update(true), Some(Edge::Rising));
        assert_eq!(gate.update(true), None);
        assert!(gate.is_latched());
    }

    #[test]
    fn test_debounce_suppresses_flapping() {
        let mut gate = DebounceCounter::new(3, 3);
        for active in [true, true, false, true, true, false, true] {
            assert_eq!(gate.update(active), None);
        }
        assert!(!gate.is_latched());

        for _ in 0..3 {
            gate.update(true);
        }
        assert!(gate.is_latched());
        for active in [false, false, true, false, false, true] {
            assert_eq!(gate.update(active), None);
        }
        assert!(gate.is_latched());
    }

    #[test]
    fn test_debounce_falls_after_streak() {
        let mut gate = DebounceCounter::new(1, 2);
        assert_eq!(gate.update(true), Some(Edge::Rising));
        assert_eq!(gate.update(false), None);
        assert_eq!(gate.update(false), Some(Edge::Falling));
        gate.update(true);
        gate.reset();
        assert!(!gate.is_latched());
    }
}
