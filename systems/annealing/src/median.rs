//! Streaming median over the score deltas observed during a run.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample(f64);

impl Eq for Sample {}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Median maintained with a max-heap of the lower half and a min-heap of the
/// upper half. The lower half holds the extra sample when the count is odd.
#[derive(Clone, Debug, Default)]
pub(crate) struct OnlineMedian {
    lower: BinaryHeap<Sample>,
    upper: BinaryHeap<Reverse<Sample>>,
}

impl OnlineMedian {
    pub(crate) fn push(&mut self, value: f64) {
        let sample = Sample(value);
        match self.lower.peek() {
            Some(&top) if sample > top => self.upper.push(Reverse(sample)),
            _ => self.lower.push(sample),
        }

        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                self.upper.push(Reverse(moved));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(moved)) = self.upper.pop() {
                self.lower.push(moved);
            }
        }
    }

    pub(crate) fn median(&self) -> Option<f64> {
        let low = self.lower.peek()?.0;
        if self.lower.len() > self.upper.len() {
            return Some(low);
        }
        let high = self.upper.peek().map_or(low, |Reverse(sample)| sample.0);
        Some((low + high) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream_has_no_median() {
        assert_eq!(OnlineMedian::default().median(), None);
    }

    #[test]
    fn odd_and_even_counts() {
        let mut median = OnlineMedian::default();
        for value in [5.0, 1.0, 9.0] {
            median.push(value);
        }
        assert_eq!(median.median(), Some(5.0));

        median.push(7.0);
        assert_eq!(median.median(), Some(6.0));
    }

    #[test]
    fn tracks_a_shifting_stream() {
        let mut median = OnlineMedian::default();
        for value in (1..=100).rev() {
            median.push(f64::from(value));
        }
        assert_eq!(median.median(), Some(50.5));

        for _ in 0..10 {
            median.push(1_000.0);
        }
        assert_eq!(median.median(), Some(55.5));
    }
}
