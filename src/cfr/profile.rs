//! Exported strategy profiles.
//!
//! A [`StrategyProfile`] maps information-set keys (their display form, e.g.
//! `"Kcb"`) to a mapping from action name to probability. It is the boundary
//! format consumed by the CLI, JSON dumps and distance computations, so it
//! uses ordered maps to keep output stable.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cfr::game::{Game, InfoState};
use crate::cfr::node::uniform;

/// Information-set key -> action name -> probability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyProfile {
    entries: BTreeMap<String, BTreeMap<String, f64>>,
}

impl StrategyProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distribution at `key`, replacing any previous entry.
    pub fn insert<K, A, I>(&mut self, key: K, probabilities: I)
    where
        K: Into<String>,
        A: Into<String>,
        I: IntoIterator<Item = (A, f64)>,
    {
        let actions = probabilities
            .into_iter()
            .map(|(action, p)| (action.into(), p))
            .collect();
        self.entries.insert(key.into(), actions);
    }

    /// Distribution at `key`, if present.
    pub fn get(&self, key: &str) -> Option<&BTreeMap<String, f64>> {
        self.entries.get(key)
    }

    /// Probability of `action` at `key`, if both are present.
    pub fn probability(&self, key: &str, action: &str) -> Option<f64> {
        self.entries.get(key).and_then(|a| a.get(action)).copied()
    }

    /// Number of information sets in the profile.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, distribution)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, f64>)> {
        self.entries.iter()
    }

    /// Behavioral strategy at `info` as a vector ordered like
    /// `game.info_set_actions(info)`.
    ///
    /// Missing keys or actions fall back to uniform, so any profile can be
    /// handed to the exact evaluators.
    pub fn distribution<G: Game>(&self, game: &G, info: &G::InfoState) -> Vec<f64> {
        let actions = game.info_set_actions(info);
        let Some(entry) = self.entries.get(&info.key()) else {
            return uniform(actions.len());
        };

        let probabilities: Option<Vec<f64>> = actions
            .iter()
            .map(|action| entry.get(&game.action_name(action)).copied())
            .collect();
        probabilities.unwrap_or_else(|| uniform(actions.len()))
    }

    /// Root-mean-square difference over every `(key, action)` pair present
    /// in both profiles. Returns 0.0 when the profiles share no pair.
    pub fn distance(&self, reference: &StrategyProfile) -> f64 {
        let mut squared = 0.0;
        let mut count = 0usize;

        for (key, actions) in &self.entries {
            let Some(other) = reference.entries.get(key) else {
                continue;
            };
            for (action, p) in actions {
                if let Some(q) = other.get(action) {
                    squared += (p - q).powi(2);
                    count += 1;
                }
            }
        }

        if count == 0 {
            0.0
        } else {
            (squared / count as f64).sqrt()
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a profile from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save the profile to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self
            .to_json_pretty()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
