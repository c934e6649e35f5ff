/// Runtime world state — one snapshot per step of a playthrough.
///
/// A snapshot is an owned value: `Clone` is the deep-copy operation, and
/// all mutation happens crate-internally in the effect applicator, which
/// always produces a fresh snapshot. Everything externally visible is
/// therefore immutable, which makes undo, replay, and parallel simulation
/// safe without synchronization.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::scene::InitialState;

/// The value read for a fact that has never been set.
pub const UNKNOWN_FACT: &str = "unknown";

/// Tags, stats, goals, and facts for one playthrough.
///
/// Stats and goals share numeric semantics but are distinct namespaces;
/// both default to 0 when unset. Facts default to [`UNKNOWN_FACT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    #[serde(default)]
    pub tags: FxHashSet<String>,
    #[serde(default)]
    pub stats: FxHashMap<String, f64>,
    #[serde(default)]
    pub goals: FxHashMap<String, f64>,
    #[serde(default)]
    pub facts: FxHashMap<String, String>,
}

impl WorldState {
    /// Build the first snapshot of a playthrough from a scene's optional
    /// initial state. Absent fields seed empty.
    pub fn seed(initial: Option<&InitialState>) -> WorldState {
        let mut state = WorldState::default();
        if let Some(init) = initial {
            for tag in &init.tags {
                state.tags.insert(tag.clone());
            }
            for (key, value) in &init.stats {
                state.stats.insert(key.clone(), *value);
            }
            for (key, value) in &init.goals {
                state.goals.insert(key.clone(), *value);
            }
            for (key, value) in &init.facts {
                state.facts.insert(key.clone(), value.clone());
            }
        }
        state
    }

    /// Returns true if the tag is present.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    /// Current value of a stat, 0 when unset.
    pub fn stat(&self, key: &str) -> f64 {
        self.stats.get(key).copied().unwrap_or(0.0)
    }

    /// Current value of a goal, 0 when unset.
    pub fn goal(&self, key: &str) -> f64 {
        self.goals.get(key).copied().unwrap_or(0.0)
    }

    /// Current value of a fact, [`UNKNOWN_FACT`] when unset.
    pub fn fact(&self, key: &str) -> &str {
        self.facts.get(key).map(String::as_str).unwrap_or(UNKNOWN_FACT)
    }

    pub(crate) fn add_tag(&mut self, name: &str) {
        self.tags.insert(name.to_string());
    }

    pub(crate) fn remove_tag(&mut self, name: &str) {
        self.tags.remove(name);
    }

    pub(crate) fn set_stat(&mut self, key: &str, value: f64) {
        self.stats.insert(key.to_string(), value);
    }

    pub(crate) fn set_goal(&mut self, key: &str, value: f64) {
        self.goals.insert(key.to_string(), value);
    }

    pub(crate) fn set_fact(&mut self, key: &str, value: &str) {
        self.facts.insert(key.to_string(), value.to_string());
    }
}
