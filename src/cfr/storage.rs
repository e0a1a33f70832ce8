//! Storage for per-information-set statistics.
//!
//! The table maps each information set discovered during training to its
//! [`DecisionPoint`]. Entries are created lazily on first visit and never
//! removed while training; the table is owned by exactly one trainer.

use std::hash::Hash;

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::cfr::algorithm::Algorithm;
use crate::cfr::node::{uniform, DecisionPoint};

/// Information-set table: key -> statistics.
#[derive(Debug, Clone)]
pub struct InfoSetTable<K: Eq + Hash> {
    nodes: FxHashMap<K, DecisionPoint>,
    algorithm: Algorithm,
}

impl<K: Eq + Hash + Clone> InfoSetTable<K> {
    /// Create an empty table whose nodes run `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            nodes: FxHashMap::default(),
            algorithm,
        }
    }

    /// Get the node for `key`, creating it with `num_actions` actions on first visit.
    pub fn get_or_insert(&mut self, key: &K, num_actions: usize) -> &mut DecisionPoint {
        let algorithm = self.algorithm;
        let node = self
            .nodes
            .entry(key.clone())
            .or_insert_with(|| DecisionPoint::new(algorithm, num_actions));
        debug_assert_eq!(node.num_actions(), num_actions, "action count mismatch");
        node
    }

    /// Read access to a node, if it has been visited.
    pub fn get(&self, key: &K) -> Option<&DecisionPoint> {
        self.nodes.get(key)
    }

    /// Mutable access to a node, if it has been visited.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut DecisionPoint> {
        self.nodes.get_mut(key)
    }

    /// Average strategy at `key`; uniform over `num_actions` for unseen keys.
    pub fn average_strategy(&self, key: &K, num_actions: usize) -> Vec<f64> {
        match self.nodes.get(key) {
            Some(node) => node.average_strategy(),
            None => uniform(num_actions),
        }
    }

    /// Strategy cached at `key` by the last visit; uniform for unseen keys.
    pub fn current_strategy(&self, key: &K, num_actions: usize) -> Vec<f64> {
        match self.nodes.get(key) {
            Some(node) => node.cached_strategy().to_vec(),
            None => uniform(num_actions),
        }
    }

    /// Sample an action index from the average strategy at `key`.
    ///
    /// Unseen keys fall back to a uniform random choice.
    pub fn sample_average<R: Rng>(&self, key: &K, num_actions: usize, rng: &mut R) -> usize {
        let strategy = self.average_strategy(key, num_actions);
        sample_index(&strategy, rng)
    }

    /// Number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `key` has been visited.
    pub fn contains(&self, key: &K) -> bool {
        self.nodes.contains_key(key)
    }

    /// Iterate over all discovered information sets.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &DecisionPoint)> {
        self.nodes.iter()
    }

    /// Clear all stored data.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// Sample an index according to a probability distribution.
pub fn sample_index<R: Rng>(strategy: &[f64], rng: &mut R) -> usize {
    let r: f64 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &prob) in strategy.iter().enumerate() {
        cumsum += prob;
        if r < cumsum {
            return i;
        }
    }

    // Floating point imprecision
    strategy.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lazy_creation() {
        let mut table: InfoSetTable<&'static str> = InfoSetTable::new(Algorithm::Cfr);
        assert_eq!(table.num_info_sets(), 0);
        assert!(!table.contains(&"Kb"));

        table.get_or_insert(&"Kb", 2).accumulate_regret(1, 1.0);
        table.get_or_insert(&"Kb", 2).accumulate_regret(1, 1.0);
        table.get_or_insert(&"J", 2);

        assert_eq!(table.num_info_sets(), 2);
        assert_eq!(table.get(&"Kb").map(|n| n.regret_sum()[1]), Some(2.0));
    }

    #[test]
    fn test_unseen_keys_are_uniform() {
        let table: InfoSetTable<&'static str> = InfoSetTable::new(Algorithm::CfrPlus);
        assert_eq!(table.average_strategy(&"Q", 2), vec![0.5, 0.5]);
        assert_eq!(table.current_strategy(&"Q", 4), vec![0.25; 4]);
    }

    #[test]
    fn test_sample_average_follows_strategy() {
        let mut table: InfoSetTable<&'static str> = InfoSetTable::new(Algorithm::Cfr);
        let node = table.get_or_insert(&"K", 2);
        node.accumulate_regret(1, 1.0);
        node.current_strategy();
        node.accumulate_strategy_mass(1.0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(table.sample_average(&"K", 2, &mut rng), 1);
        }

        // Unseen key: both actions eventually drawn.
        let draws: Vec<usize> = (0..200).map(|_| table.sample_average(&"J", 2, &mut rng)).collect();
        assert!(draws.contains(&0) && draws.contains(&1));
    }

    #[test]
    fn test_sample_index_edges() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_index(&[0.0, 0.0, 1.0], &mut rng), 2);
        assert_eq!(sample_index(&[1.0, 0.0], &mut rng), 0);
    }
}
