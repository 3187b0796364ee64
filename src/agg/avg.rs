use crate::Value;

/// Running arithmetic mean over a stream of values.
///
/// Keeps no history, only the current mean and how many values went into it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunningAverage<F: Value> {
    mean: F,
    count: u64,
}

impl<F: Value> Default for RunningAverage<F> {
    fn default() -> Self {
        Self {
            mean: F::zero(),
            count: 0,
        }
    }
}

impl<F: Value> RunningAverage<F> {
    /// Adds a value to the mean.
    ///
    /// Uses the incremental update `mean += (x - mean) / n` instead of
    /// `sum / n`, which keeps the magnitude of the intermediate close to
    /// the data and avoids the error a growing sum picks up.
    pub fn push(&mut self, value: F) {
        self.count += 1;
        self.mean = self.mean + (value - self.mean) / F::from_count(self.count);
    }

    /// Current mean, `0` if nothing was pushed.
    #[must_use]
    pub fn mean(&self) -> F {
        self.mean
    }

    /// Number of values pushed so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}
