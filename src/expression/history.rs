use std::collections::VecDeque;

/// Fixed-capacity boolean history; the oldest sample is evicted on overflow
#[derive(Debug, Clone)]
pub struct StateHistory {
    samples: VecDeque<bool>,
    capacity: usize,
}

impl StateHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: bool) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<bool> {
        self.samples.back().copied()
    }

    /// Number of `true` samples among the most recent `window`
    pub fn count_recent(&self, window: usize) -> usize {
        self.samples.iter().rev().take(window).filter(|v| **v).count()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
