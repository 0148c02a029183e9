//! Per-group candidate selection state.
//!
//! The store remembers which candidate is chosen for each condition key.
//! User-chosen indices survive recomputes until the key leaves the active
//! set; an index invalidated by a shrinking group is repaired to 0 with a
//! warning rather than an error.

use crate::resolver::groups::ModelGroup;
use log::warn;
use std::collections::HashMap;

/// Recoverable warning: a stored index outlived its group's size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub condition_key: String,
    pub stored: usize,
    pub len: usize,
}

/// Keyed store of selected candidate indices, one per condition key.
#[derive(Debug, Default, Clone)]
pub struct GroupSelections {
    indices: HashMap<String, usize>,
}

impl GroupSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default candidate index for a group: 0, or for weighted groups the
    /// first candidate with a weight above zero (0 when none qualifies).
    pub fn default_index_for(group: &ModelGroup) -> usize {
        if group.is_weighted {
            group
                .models
                .iter()
                .position(|m| m.weight.map(|w| w > 0).unwrap_or(false))
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Resolve the candidate index for a group.
    ///
    /// A stored in-bounds index is kept as-is. A stored index left out of
    /// bounds by a shrunken group resets to 0 and reports one
    /// [`IndexOutOfRange`]. An unknown key gets the group default, stored for
    /// subsequent cycles.
    pub fn resolve(&mut self, group: &ModelGroup) -> (usize, Option<IndexOutOfRange>) {
        let key = group.selection_key().to_string();

        match self.indices.get(&key).copied() {
            Some(stored) if stored < group.models.len() => (stored, None),
            Some(stored) => {
                warn!(
                    "Selected candidate {} for group {:?} no longer exists ({} models); resetting",
                    stored,
                    key,
                    group.models.len()
                );
                self.indices.insert(key.clone(), 0);
                (
                    0,
                    Some(IndexOutOfRange {
                        condition_key: key,
                        stored,
                        len: group.models.len(),
                    }),
                )
            }
            None => {
                let default = Self::default_index_for(group);
                self.indices.insert(key, default);
                (default, None)
            }
        }
    }

    /// Record an explicit user choice for a condition key.
    pub fn set(&mut self, condition_key: &str, index: usize) {
        self.indices.insert(condition_key.to_string(), index);
    }

    /// Get the stored index for a condition key, if any.
    pub fn get(&self, condition_key: &str) -> Option<usize> {
        self.indices.get(condition_key).copied()
    }

    /// Drop entries for condition keys no longer in the active set.
    pub fn prune(&mut self, active: &[ModelGroup]) {
        self.indices
            .retain(|key, _| active.iter().any(|g| g.selection_key() == key));
    }

    /// Forget everything, e.g. when the block changes.
    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockstate::ModelCandidate;

    fn candidate(model: &str, weight: Option<u32>) -> ModelCandidate {
        ModelCandidate {
            model: model.to_string(),
            x: 0,
            y: 0,
            uvlock: false,
            weight,
        }
    }

    fn weighted_group(key: &str, weights: &[Option<u32>]) -> ModelGroup {
        ModelGroup {
            condition_key: Some(key.to_string()),
            models: weights
                .iter()
                .enumerate()
                .map(|(i, w)| candidate(&format!("block/m{}", i), *w))
                .collect(),
            is_weighted: true,
        }
    }

    #[test]
    fn test_default_index_skips_zero_weights() {
        let group = weighted_group("", &[Some(0), Some(0), Some(5)]);
        assert_eq!(GroupSelections::default_index_for(&group), 2);
    }

    #[test]
    fn test_default_index_all_zero_or_absent() {
        let group = weighted_group("", &[Some(0), None, Some(0)]);
        assert_eq!(GroupSelections::default_index_for(&group), 0);

        let unweighted = ModelGroup {
            condition_key: None,
            models: vec![candidate("block/stone", None)],
            is_weighted: false,
        };
        assert_eq!(GroupSelections::default_index_for(&unweighted), 0);
    }

    #[test]
    fn test_resolve_stores_default_for_new_key() {
        let mut selections = GroupSelections::new();
        let group = weighted_group("lit=true", &[Some(0), Some(3)]);

        let (index, warning) = selections.resolve(&group);
        assert_eq!(index, 1);
        assert!(warning.is_none());
        assert_eq!(selections.get("lit=true"), Some(1));
    }

    #[test]
    fn test_resolve_preserves_user_choice() {
        let mut selections = GroupSelections::new();
        let group = weighted_group("lit=true", &[None, None, None]);

        selections.set("lit=true", 2);
        let (index, warning) = selections.resolve(&group);
        assert_eq!(index, 2);
        assert!(warning.is_none());
    }

    #[test]
    fn test_shrunken_group_resets_with_one_warning() {
        let mut selections = GroupSelections::new();
        selections.set("lit=true", 5);

        let group = weighted_group("lit=true", &[None, None]);
        let (index, warning) = selections.resolve(&group);
        assert_eq!(index, 0);
        assert_eq!(
            warning,
            Some(IndexOutOfRange {
                condition_key: "lit=true".to_string(),
                stored: 5,
                len: 2,
            })
        );

        // The repair is persisted: the next resolve is clean.
        let (index, warning) = selections.resolve(&group);
        assert_eq!(index, 0);
        assert!(warning.is_none());
    }

    #[test]
    fn test_prune_drops_stale_keys() {
        let mut selections = GroupSelections::new();
        selections.set("north=true", 1);
        selections.set("south=true", 1);

        let active = vec![weighted_group("north=true", &[None, None])];
        selections.prune(&active);

        assert_eq!(selections.get("north=true"), Some(1));
        assert_eq!(selections.get("south=true"), None);
    }
}
