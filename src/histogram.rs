//! Threshold histogram
//!
//! Counts how often each given name was seen and reports the single
//! increment at which a name becomes frequent enough to be emitted.

use ahash::RandomState;
use hashbrown::HashMap;

/// Name frequency table owned by the producer.
///
/// Keys are compared byte for byte, so "Otto" and "otto" are separate
/// entries. Counts only ever grow and entries are never evicted.
#[derive(Debug)]
pub struct Histogram {
    counts: HashMap<String, u64, RandomState>,
    threshold: u64,
    eligible: usize,
}

impl Histogram {
    /// A threshold of 0 can never be reached, so nothing would ever fire.
    /// `PipelineConfig::validate` rejects it before a run starts.
    pub fn new(threshold: u64) -> Self {
        Self {
            counts: HashMap::with_hasher(RandomState::new()),
            threshold,
            eligible: 0,
        }
    }

    /// Count one occurrence of `name`.
    ///
    /// Returns true exactly once per name: on the increment that makes its
    /// count equal to the threshold.
    pub fn observe(&mut self, name: &str) -> bool {
        let count = match self.counts.get_mut(name) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.counts.insert(name.to_owned(), 1);
                1
            }
        };

        let crossed = count == self.threshold;
        if crossed {
            self.eligible += 1;
        }
        crossed
    }

    /// Current count of `name`, 0 if never seen.
    pub fn count(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Number of distinct names seen so far
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of names that have reached the threshold.
    pub fn eligible(&self) -> usize {
        self.eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_at_threshold() {
        let mut hist = Histogram::new(2);
        assert_eq!(hist.threshold(), 2);

        assert!(!hist.observe("Otto"));
        assert!(hist.observe("Otto"));
        assert!(!hist.observe("Otto"));
        assert!(!hist.observe("Otto"));

        assert_eq!(hist.count("Otto"), 4);
        assert_eq!(hist.eligible(), 1);
    }

    #[test]
    fn test_threshold_one_fires_on_first_sight() {
        let mut hist = Histogram::new(1);

        assert!(hist.observe("Anna"));
        assert!(hist.observe("Fritz"));
        assert!(!hist.observe("Anna"));
        assert_eq!(hist.eligible(), 2);
    }

    #[test]
    fn test_below_threshold_never_fires() {
        let mut hist = Histogram::new(3);

        assert!(!hist.observe("Anna"));
        assert!(!hist.observe("Anna"));
        assert!(!hist.observe("Fritz"));

        assert_eq!(hist.len(), 2);
        assert_eq!(hist.eligible(), 0);
        assert_eq!(hist.count("Karl"), 0);
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut hist = Histogram::new(2);

        assert!(!hist.observe("Otto"));
        assert!(!hist.observe("otto"));
        assert_eq!(hist.len(), 2);
        assert!(hist.observe("otto"));
    }

    #[test]
    fn test_zero_threshold_never_fires() {
        let mut hist = Histogram::new(0);

        assert!(!hist.observe("Otto"));
        assert!(!hist.observe("Otto"));
        assert!(!hist.is_empty());
    }
}
