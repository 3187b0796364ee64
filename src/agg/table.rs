use super::avg::RunningAverage;
use crate::Value;

/// Per-key running means.
///
/// Memory grows with the number of distinct keys, never with the number of
/// folded values.
#[derive(Debug)]
pub struct MeanTable<F: Value> {
    averages: crate::HashMap<String, RunningAverage<F>>,
}

impl<F: Value> Default for MeanTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Value> MeanTable<F> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            averages: crate::HashMap::default(),
        }
    }

    /// Folds a value into the mean of `key`.
    pub fn fold(&mut self, key: &str, value: F) {
        // NOTE: Only allocate the key on first sight
        if let Some(avg) = self.averages.get_mut(key) {
            avg.push(value);
        } else {
            let mut avg = RunningAverage::default();
            avg.push(value);
            self.averages.insert(key.to_owned(), avg);
        }
    }

    /// Returns the running average of `key`, if it was ever folded.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RunningAverage<F>> {
        self.averages.get(key)
    }

    /// Iterates over `(key, mean)` pairs in no particular order.
    pub fn snapshot(&self) -> impl Iterator<Item = (&str, F)> + '_ {
        self.averages
            .iter()
            .map(|(key, avg)| (key.as_str(), avg.mean()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.averages.len()
    }

    /// Returns `true` if nothing was folded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use test_log::test;

    #[test]
    fn empty_table() {
        let table = MeanTable::<f64>::new();
        assert!(table.is_empty());
        assert_eq!(0, table.snapshot().count());
    }

    #[test]
    fn fold_by_key() {
        let mut table = MeanTable::<f64>::new();
        table.fold("A", 10.0);
        table.fold("B", 20.0);
        table.fold("A", 30.0);

        assert_eq!(2, table.len());

        let a = table.get("A").expect("should exist");
        assert_eq!(2, a.count());
        assert_eq!(20.0, a.mean());

        let b = table.get("B").expect("should exist");
        assert_eq!(1, b.count());
        assert_eq!(20.0, b.mean());

        assert!(table.get("C").is_none());
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut table = MeanTable::<f32>::new();
        table.fold("x", 1.0);
        table.fold("y", 2.0);

        let mut first = table.snapshot().collect::<Vec<_>>();
        let mut second = table.snapshot().collect::<Vec<_>>();
        first.sort_by(|a, b| a.0.cmp(b.0));
        second.sort_by(|a, b| a.0.cmp(b.0));

        assert_eq!(first, second);
        assert_eq!(vec![("x", 1.0), ("y", 2.0)], first);
        assert_eq!(1, table.get("x").expect("should exist").count());
    }

    #[test]
    fn order_independent_mean() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        let mut records = (0..10_000)
            .map(|idx| {
                let key = format!("s-{}", idx % 13);
                let value: f64 = rng.gen_range(-99.9..99.9);
                (key, value)
            })
            .collect::<Vec<_>>();

        let mut forward = MeanTable::<f64>::new();
        for (key, value) in &records {
            forward.fold(key, *value);
        }

        records.shuffle(&mut rng);

        let mut shuffled = MeanTable::<f64>::new();
        for (key, value) in &records {
            shuffled.fold(key, *value);
        }

        assert_eq!(13, forward.len());

        for (key, mean) in forward.snapshot() {
            let values = records
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| *v)
                .collect::<Vec<_>>();
            let exact = values.iter().sum::<f64>() / values.len() as f64;

            let other = shuffled.get(key).expect("should exist").mean();
            assert!((mean - other).abs() < 1e-9, "{key}: {mean} != {other}");
            assert!((mean - exact).abs() < 1e-9, "{key}: {mean} != {exact}");
        }
    }

    #[test]
    fn bounded_by_distinct_keys() {
        let mut table = MeanTable::<f32>::new();
        for idx in 0..250_000_u32 {
            #[allow(clippy::cast_precision_loss)]
            table.fold(["a", "b", "c", "d"][(idx % 4) as usize], (idx % 10) as f32);
        }

        assert_eq!(4, table.len());
        assert_eq!(62_500, table.get("a").expect("should exist").count());
    }
}
