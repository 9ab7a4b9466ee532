//! Fixed-capacity sample history for one metric channel

use std::collections::VecDeque;

use serde::Serialize;

pub const DEFAULT_HISTORY_LEN: usize = 20; // ~20 seconds at 1s sampling

/// One observation: synthetic tick index plus the sampled value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub tick: u64,
    pub value: f64,
}

/// Sliding window of the last `capacity` samples, oldest first.
///
/// Ticks are strictly increasing by one between adjacent entries; the
/// oldest entry is evicted when a sample is appended to a full window.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    /// A capacity of 0 is raised to 1 so the tick sequence never resets.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, value: f64) {
        let tick = self.samples.back().map(|s| s.tick + 1).unwrap_or(0);
        push_with_cap(&mut self.samples, Sample { tick, value }, self.capacity);
    }

    pub fn current_window(&self) -> impl ExactSizeIterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<Sample> {
        self.samples.back().copied()
    }

    /// Tick bounds of the live window
    pub fn tick_range(&self) -> Option<(u64, u64)> {
        // Ticks are sorted, so the ends of the deque are the bounds.
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => Some((first.tick, last.tick)),
            _ => None,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn ticks(&self) -> Vec<u64> {
        self.samples.iter().map(|s| s.tick).collect()
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

pub(crate) fn push_with_cap<T>(deque: &mut VecDeque<T>, value: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while deque.len() >= cap {
        deque.pop_front();
    }
    deque.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(window: &SampleWindow) -> Vec<(u64, f64)> {
        window.current_window().map(|s| (s.tick, s.value)).collect()
    }

    #[test]
    fn first_append_starts_at_tick_zero() {
        let mut w = SampleWindow::new(5);
        assert!(w.is_empty());
        w.append(42.0);
        assert_eq!(pairs(&w), vec![(0, 42.0)]);
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut w = SampleWindow::new(3);
        for v in [10.0, 20.0, 30.0, 40.0] {
            w.append(v);
        }
        assert_eq!(pairs(&w), vec![(1, 20.0), (2, 30.0), (3, 40.0)]);
    }

    #[test]
    fn keeps_last_n_values_in_order() {
        let cap = 20;
        for extra in [0usize, 1, 7, 45] {
            let mut w = SampleWindow::new(cap);
            let total = cap + extra;
            for i in 0..total {
                w.append(i as f64);
            }
            assert_eq!(w.len(), cap);
            let expected: Vec<f64> = (extra..total).map(|i| i as f64).collect();
            assert_eq!(w.values(), expected);
        }
    }

    #[test]
    fn ticks_increase_by_one() {
        let mut w = SampleWindow::new(4);
        for i in 0..11 {
            w.append(i as f64 * 1.5);
            let ticks = w.ticks();
            assert!(ticks.windows(2).all(|p| p[1] == p[0] + 1));
            assert!(w.len() <= w.capacity());
        }
        assert_eq!(w.tick_range(), Some((7, 10)));
    }

    #[test]
    fn values_pass_through_unvalidated() {
        let mut w = SampleWindow::new(3);
        w.append(f64::NAN);
        w.append(-5.0);
        w.append(250.0);
        let values = w.values();
        assert!(values[0].is_nan());
        assert_eq!(&values[1..], &[-5.0, 250.0]);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut w = SampleWindow::new(0);
        assert_eq!(w.capacity(), 1);
        w.append(1.0);
        w.append(2.0);
        assert_eq!(pairs(&w), vec![(1, 2.0)]);
    }

    #[test]
    fn default_capacity_is_twenty() {
        assert_eq!(SampleWindow::default().capacity(), DEFAULT_HISTORY_LEN);
        assert_eq!(DEFAULT_HISTORY_LEN, 20);
    }

    #[test]
    fn push_with_cap_zero_is_noop() {
        let mut dq = VecDeque::new();
        push_with_cap(&mut dq, 1, 0);
        assert!(dq.is_empty());
    }
}
