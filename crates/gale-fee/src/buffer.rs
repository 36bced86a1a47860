//! Fixed-capacity circular window of recent prices.
//!
//! The window is always full: it is pre-filled with the pool's initial price
//! and every push overwrites the oldest slot. The canonical read order starts
//! at the write cursor (the oldest sample) and wraps around to the newest.

use serde::{Deserialize, Serialize};

use gale_types::Price;

/// Default number of samples kept per pool.
pub const DEFAULT_WINDOW_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSampleBuffer {
    samples: Vec<Price>,
    /// Next slot to overwrite; always `< samples.len()`.
    write_cursor: usize,
}

impl PriceSampleBuffer {
    /// Create a window of `capacity` slots, all holding `initial_price`.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, initial_price: Price) -> Self {
        Self {
            samples: vec![initial_price; capacity.max(1)],
            write_cursor: 0,
        }
    }

    /// Overwrite the oldest sample with `price`.
    pub fn push(&mut self, price: Price) {
        self.samples[self.write_cursor] = price;
        self.write_cursor = (self.write_cursor + 1) % self.samples.len();
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Price> + '_ {
        let (newer, older) = self.samples.split_at(self.write_cursor);
        older.iter().chain(newer.iter())
    }

    /// Copy of the samples from oldest to newest.
    pub fn snapshot(&self) -> Vec<Price> {
        self.iter().copied().collect()
    }

    /// The most recently pushed sample.
    pub fn latest(&self) -> Price {
        let len = self.samples.len();
        self.samples[(self.write_cursor + len - 1) % len]
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_with_initial_price() {
        let buf = PriceSampleBuffer::new(DEFAULT_WINDOW_SIZE, 500);
        assert_eq!(buf.capacity(), DEFAULT_WINDOW_SIZE);
        assert!(buf.iter().all(|p| *p == 500));
        assert_eq!(buf.write_cursor(), 0);
    }

    #[test]
    fn test_full_cycle_returns_insertion_order() {
        let mut buf = PriceSampleBuffer::new(4, 0);
        for p in [10, 20, 30, 40] {
            buf.push(p);
        }
        assert_eq!(buf.snapshot(), vec![10, 20, 30, 40]);
        assert_eq!(buf.write_cursor(), 0);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut buf = PriceSampleBuffer::new(4, 0);
        for p in [10, 20, 30, 40, 50] {
            buf.push(p);
        }
        let snap = buf.snapshot();
        assert!(!snap.contains(&10));
        assert_eq!(snap, vec![20, 30, 40, 50]);
    }

    #[test]
    fn test_partial_fill_keeps_initial_samples_oldest() {
        let mut buf = PriceSampleBuffer::new(3, 7);
        buf.push(8);
        assert_eq!(buf.snapshot(), vec![7, 7, 8]);
        assert_eq!(buf.latest(), 8);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut buf = PriceSampleBuffer::new(2, 1);
        buf.push(2);
        assert_eq!(buf.write_cursor(), 1);
        buf.push(3);
        assert_eq!(buf.write_cursor(), 0);
        assert_eq!(buf.latest(), 3);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut buf = PriceSampleBuffer::new(0, 9);
        assert_eq!(buf.capacity(), 1);
        buf.push(4);
        assert_eq!(buf.snapshot(), vec![4]);
    }
}
