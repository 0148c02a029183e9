//! Resource pack stacking and merged asset views.
//!
//! Packs are held in an explicit priority order. Internal storage is lowest
//! priority first; the UI-facing listing is highest priority first. Merged
//! lookups walk packs from highest to lowest priority so later-loaded packs
//! shadow earlier ones.

pub mod loader;

use crate::error::{PreviewError, Result};
use std::collections::{HashMap, HashSet};

/// The blockstate assets contributed by a single pack.
///
/// Raw JSON text is stored as loaded; parsing into a
/// [`BlockstateDefinition`](crate::blockstate::BlockstateDefinition) happens
/// per recompute so a later pack edit never leaves half-parsed state behind.
#[derive(Debug, Default, Clone)]
pub struct PackAssets {
    /// Raw blockstate JSON by namespace and block id.
    blockstates: HashMap<String, HashMap<String, String>>,
}

impl PackAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw blockstate JSON document.
    pub fn add_blockstate(&mut self, namespace: &str, block_id: &str, raw_json: String) {
        self.blockstates
            .entry(namespace.to_string())
            .or_default()
            .insert(block_id.to_string(), raw_json);
    }

    /// Get the raw blockstate JSON for a block, if this pack defines one.
    pub fn raw_blockstate(&self, namespace: &str, block_id: &str) -> Option<&str> {
        self.blockstates
            .get(namespace)
            .and_then(|ns| ns.get(block_id))
            .map(String::as_str)
    }

    /// Total number of blockstate definitions in this pack.
    pub fn blockstate_count(&self) -> usize {
        self.blockstates.values().map(|m| m.len()).sum()
    }

    fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.blockstates.keys().map(String::as_str)
    }

    fn block_ids(&self, namespace: &str) -> impl Iterator<Item = &str> {
        self.blockstates
            .get(namespace)
            .into_iter()
            .flat_map(|ns| ns.keys().map(String::as_str))
    }
}

/// A loaded resource pack with a stable id and display name.
#[derive(Debug, Clone)]
pub struct PackEntry {
    /// Unique, stable identifier within one stack instance.
    pub id: String,
    /// Human-readable name for pack listings.
    pub display_name: String,
    /// The pack's blockstate assets.
    pub assets: PackAssets,
}

impl PackEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, assets: PackAssets) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            assets,
        }
    }
}

/// An ordered, re-orderable stack of resource packs.
#[derive(Debug, Default)]
pub struct ResourcePackStack {
    /// Lowest priority first; the last entry wins lookups.
    packs: Vec<PackEntry>,
}

impl ResourcePackStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Append a pack at the highest priority.
    ///
    /// Fails with [`PreviewError::DuplicatePackId`] if the id is taken; the
    /// stack is left unchanged.
    pub fn add(&mut self, entry: PackEntry) -> Result<()> {
        if self.packs.iter().any(|p| p.id == entry.id) {
            return Err(PreviewError::DuplicatePackId(entry.id));
        }
        self.packs.push(entry);
        Ok(())
    }

    /// Remove a pack by id, returning it.
    pub fn remove(&mut self, id: &str) -> Result<PackEntry> {
        match self.packs.iter().position(|p| p.id == id) {
            Some(pos) => Ok(self.packs.remove(pos)),
            None => Err(PreviewError::PackNotFound(id.to_string())),
        }
    }

    /// Replace the whole order. `order_highest_first` must be a permutation
    /// of the loaded pack ids; anything else fails with
    /// [`PreviewError::InvalidPermutation`] and the stack is left unchanged.
    pub fn reorder(&mut self, order_highest_first: &[&str]) -> Result<()> {
        if order_highest_first.len() != self.packs.len() {
            return Err(PreviewError::InvalidPermutation(format!(
                "expected {} ids, got {}",
                self.packs.len(),
                order_highest_first.len()
            )));
        }

        let unique: HashSet<&str> = order_highest_first.iter().copied().collect();
        if unique.len() != order_highest_first.len() {
            return Err(PreviewError::InvalidPermutation(
                "duplicate ids in reorder request".to_string(),
            ));
        }

        for id in order_highest_first {
            if !self.packs.iter().any(|p| p.id == *id) {
                return Err(PreviewError::InvalidPermutation(format!(
                    "unknown pack id {:?}",
                    id
                )));
            }
        }

        // Requested order is highest first; internal storage is lowest first.
        let mut reordered = Vec::with_capacity(self.packs.len());
        for id in order_highest_first.iter().rev() {
            let pos = self
                .packs
                .iter()
                .position(|p| p.id == *id)
                .expect("id verified above");
            reordered.push(self.packs.remove(pos));
        }
        self.packs = reordered;
        Ok(())
    }

    /// List packs for display, highest priority first.
    pub fn list_highest_first(&self) -> Vec<&PackEntry> {
        self.packs.iter().rev().collect()
    }

    /// All namespaces across the stack, sorted and deduplicated.
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self
            .packs
            .iter()
            .flat_map(|p| p.assets.namespaces())
            .map(str::to_string)
            .collect();
        namespaces.sort();
        namespaces.dedup();
        namespaces
    }

    /// All block ids in a namespace across the stack, sorted and deduplicated.
    pub fn block_ids(&self, namespace: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .packs
            .iter()
            .flat_map(|p| p.assets.block_ids(namespace))
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Raw blockstate JSON for a block; the highest-priority pack that
    /// defines the block wins.
    pub fn raw_blockstate(&self, namespace: &str, block_id: &str) -> Option<&str> {
        self.packs
            .iter()
            .rev()
            .find_map(|p| p.assets.raw_blockstate(namespace, block_id))
    }
}
