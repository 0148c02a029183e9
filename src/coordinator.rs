//! The selection state machine.
//!
//! `SelectionCoordinator` owns the pack stack and the current namespace,
//! block, property, and per-group candidate selections. Every external
//! trigger re-derives dependent state in a fixed order and ends by handing a
//! fresh render list to the sink:
//!
//! 1. pack stack changed  -> namespaces, namespace validity
//! 2. namespace changed   -> block list, block-selection policy
//! 3. block resolved      -> blockstate definition
//! 4. definition parsed   -> property domain, visible default selection
//! 5. selection changed   -> active model groups
//! 6. groups resolved     -> per-group candidate indices, render list
//!
//! Property changes re-run steps 5-6 only and group-index changes step 6
//! only; pack and namespace/block changes cascade fully.

use crate::blockstate::{BlockstateDefinition, ModelCandidate};
use crate::error::{PreviewError, Result};
use crate::pack::{PackEntry, ResourcePackStack};
use crate::resolver::{
    active_model_groups, resolve_domain, GroupSelections, IndexOutOfRange, ModelGroup,
    PropertyDomain,
};
use log::{debug, warn};
use std::collections::{BTreeMap, VecDeque};

/// Consumer of the final render list.
pub trait RenderSink {
    /// Replace the rendered models with the given list.
    fn set_render_list(&mut self, list: &[ModelCandidate]);
    /// Nothing to render.
    fn clear(&mut self);
}

/// Non-fatal, user-visible conditions raised during recomputes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No pack in the stack defines a blockstate for the selected block.
    BlockstateNotFound { namespace: String, block: String },
    /// The selected namespace has no blocks to select.
    NoBlockAvailable { namespace: String },
    /// A full resolve produced an empty render list.
    NoVisibleModel,
    /// A stored candidate index outlived its group and was reset.
    IndexOutOfRange(IndexOutOfRange),
}

/// Coordinator configuration.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    /// Block id preferred by the block-selection policy when the previously
    /// displayed block is gone (debug builds point this at a known block).
    pub debug_block: Option<String>,
}

/// Ticket for an in-flight blockstate fetch. The result is applied only if
/// no newer trigger advanced the coordinator's generation in the meantime.
#[derive(Debug)]
pub struct FetchTicket {
    generation: u64,
    pub namespace: String,
    pub block: String,
}

/// Internal trigger kinds, queued while a fetch is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    PacksChanged,
    NamespaceChanged,
    BlockChanged,
    PropertiesChanged,
    IndicesChanged,
}

/// Owns the selection state and keeps it render-ready across triggers.
pub struct SelectionCoordinator {
    packs: ResourcePackStack,
    sink: Box<dyn RenderSink>,
    config: CoordinatorConfig,

    namespaces: Vec<String>,
    namespace: Option<String>,
    blocks: Vec<String>,
    block: Option<String>,
    /// Last block that successfully resolved to a definition.
    displayed_block: Option<String>,
    /// Identity of the block the cached definition belongs to.
    resolved_for: Option<(String, String)>,

    definition: Option<BlockstateDefinition>,
    domain: PropertyDomain,
    selection: BTreeMap<String, String>,
    group_selections: GroupSelections,
    active_groups: Vec<ModelGroup>,
    render_list: Vec<ModelCandidate>,

    generation: u64,
    fetch_pending: bool,
    queued: VecDeque<Trigger>,
    notices: Vec<Notice>,
}

impl SelectionCoordinator {
    pub fn new(config: CoordinatorConfig, sink: Box<dyn RenderSink>) -> Self {
        Self {
            packs: ResourcePackStack::new(),
            sink,
            config,
            namespaces: Vec::new(),
            namespace: None,
            blocks: Vec::new(),
            block: None,
            displayed_block: None,
            resolved_for: None,
            definition: None,
            domain: PropertyDomain::default(),
            selection: BTreeMap::new(),
            group_selections: GroupSelections::new(),
            active_groups: Vec::new(),
            render_list: Vec::new(),
            generation: 0,
            fetch_pending: false,
            queued: VecDeque::new(),
            notices: Vec::new(),
        }
    }

    // --- pack stack operations (step 1 triggers) ---

    /// Load a pack at the highest priority.
    pub fn add_pack(&mut self, entry: PackEntry) -> Result<()> {
        self.packs.add(entry)?;
        self.trigger(Trigger::PacksChanged);
        Ok(())
    }

    /// Remove a pack by id.
    pub fn remove_pack(&mut self, id: &str) -> Result<PackEntry> {
        let entry = self.packs.remove(id)?;
        self.trigger(Trigger::PacksChanged);
        Ok(entry)
    }

    /// Reorder the whole stack; `order_highest_first` must be a permutation
    /// of the loaded pack ids.
    pub fn reorder_packs(&mut self, order_highest_first: &[&str]) -> Result<()> {
        self.packs.reorder(order_highest_first)?;
        self.trigger(Trigger::PacksChanged);
        Ok(())
    }

    pub fn packs(&self) -> &ResourcePackStack {
        &self.packs
    }

    // --- selection operations ---

    /// Switch to another namespace. Unknown namespaces are accepted; the
    /// recompute surfaces the resulting empty state as notices.
    pub fn select_namespace(&mut self, namespace: &str) {
        self.namespace = Some(namespace.to_string());
        self.trigger(Trigger::NamespaceChanged);
    }

    /// Switch to another block in the current namespace.
    pub fn select_block(&mut self, block: &str) {
        self.block = Some(block.to_string());
        self.trigger(Trigger::BlockChanged);
    }

    /// Set one property value. The name and value must belong to the current
    /// domain; rejected requests leave all state untouched.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<()> {
        let Some(info) = self.domain.get(name) else {
            return Err(PreviewError::UnknownProperty(name.to_string()));
        };
        if !info.values.iter().any(|v| v == value) {
            return Err(PreviewError::InvalidPropertyValue {
                property: name.to_string(),
                value: value.to_string(),
            });
        }

        self.selection.insert(name.to_string(), value.to_string());
        self.trigger(Trigger::PropertiesChanged);
        Ok(())
    }

    /// Choose a candidate index for an active group. The choice sticks across
    /// recomputes until the group's condition key leaves the active set.
    pub fn set_group_index(&mut self, condition_key: &str, index: usize) -> Result<()> {
        let Some(group) = self
            .active_groups
            .iter()
            .find(|g| g.selection_key() == condition_key)
        else {
            return Err(PreviewError::GroupNotActive(condition_key.to_string()));
        };
        if index >= group.models.len() {
            return Err(PreviewError::IndexOutOfBounds {
                condition: condition_key.to_string(),
                index,
                len: group.models.len(),
            });
        }

        self.group_selections.set(condition_key, index);
        self.trigger(Trigger::IndicesChanged);
        Ok(())
    }

    // --- asynchronous blockstate fetch ---

    /// Start an externally performed blockstate fetch for the current
    /// selection. Further triggers queue until [`Self::complete_blockstate_fetch`]
    /// runs, and advance the generation so a superseded result is discarded.
    ///
    /// Returns `None` when no namespace and block are selected.
    pub fn begin_blockstate_fetch(&mut self) -> Option<FetchTicket> {
        let namespace = self.namespace.clone()?;
        let block = self.block.clone()?;
        self.fetch_pending = true;
        Some(FetchTicket {
            generation: self.generation,
            namespace,
            block,
        })
    }

    /// Apply the result of a fetch started with [`Self::begin_blockstate_fetch`],
    /// then drain any triggers that queued up meanwhile. Stale results (the
    /// generation advanced since the ticket was issued) are dropped.
    pub fn complete_blockstate_fetch(&mut self, ticket: FetchTicket, raw: Option<&str>) {
        self.fetch_pending = false;

        if ticket.generation != self.generation {
            debug!(
                "Discarding stale blockstate fetch for {}:{}",
                ticket.namespace, ticket.block
            );
        } else {
            self.apply_raw_blockstate(raw.map(str::to_string));
        }

        self.drain();
    }

    // --- derived state accessors ---

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn current_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn current_block(&self) -> Option<&str> {
        self.block.as_deref()
    }

    pub fn domain(&self) -> &PropertyDomain {
        &self.domain
    }

    pub fn selected_properties(&self) -> &BTreeMap<String, String> {
        &self.selection
    }

    pub fn active_groups(&self) -> &[ModelGroup] {
        &self.active_groups
    }

    pub fn render_list(&self) -> &[ModelCandidate] {
        &self.render_list
    }

    /// Drain accumulated notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- trigger plumbing ---

    fn trigger(&mut self, trigger: Trigger) {
        // Every accepted trigger advances the generation, superseding any
        // fetch still in flight.
        self.generation += 1;
        self.queued.push_back(trigger);
        if !self.fetch_pending {
            self.drain();
        }
    }

    fn drain(&mut self) {
        while !self.fetch_pending {
            let Some(trigger) = self.queued.pop_front() else {
                break;
            };
            match trigger {
                Trigger::PacksChanged => self.recompute_from_packs(),
                Trigger::NamespaceChanged => self.recompute_block_list(false),
                Trigger::BlockChanged => self.recompute_block(),
                Trigger::PropertiesChanged => self.recompute_groups(),
                Trigger::IndicesChanged => self.recompute_render_list(),
            }
        }
    }

    // --- recompute chain ---

    /// Step 1: namespaces, then cascade.
    fn recompute_from_packs(&mut self) {
        let namespace_before = self.namespace.clone();
        self.namespaces = self.packs.namespaces();

        let current_ok = self
            .namespace
            .as_deref()
            .map(|ns| self.namespaces.iter().any(|n| n == ns))
            .unwrap_or(false);
        if !current_ok {
            self.namespace = self.namespaces.first().cloned();
        }

        // When the namespace survived the pack edit, a block dropping out of
        // the list means its only definition is gone; say so before the
        // policy replaces it.
        let lost_block_is_notable =
            namespace_before.is_some() && namespace_before == self.namespace;
        self.recompute_block_list(lost_block_is_notable);
    }

    /// Step 2: block list and block-selection policy, then cascade.
    fn recompute_block_list(&mut self, lost_block_is_notable: bool) {
        match self.namespace.as_deref() {
            Some(ns) => self.blocks = self.packs.block_ids(ns),
            None => self.blocks.clear(),
        }

        let current_ok = self
            .block
            .as_deref()
            .map(|b| self.blocks.iter().any(|x| x == b))
            .unwrap_or(false);
        if !current_ok {
            if lost_block_is_notable {
                if let (Some(ns), Some(block)) = (&self.namespace, &self.block) {
                    self.notices.push(Notice::BlockstateNotFound {
                        namespace: ns.clone(),
                        block: block.clone(),
                    });
                }
            }
            self.apply_block_policy();
        }

        self.recompute_block();
    }

    /// Block-selection policy: previously displayed block, then the debug
    /// target, then the first listed block, then nothing.
    fn apply_block_policy(&mut self) {
        self.block = self
            .displayed_block
            .iter()
            .chain(self.config.debug_block.iter())
            .find(|candidate| self.blocks.iter().any(|b| &b == candidate))
            .cloned()
            .or_else(|| self.blocks.first().cloned());

        if self.block.is_none() {
            if let Some(ns) = self.namespace.clone() {
                self.notices.push(Notice::NoBlockAvailable { namespace: ns });
            }
        }
    }

    /// Steps 3-4: fetch and parse the definition, derive the domain.
    fn recompute_block(&mut self) {
        let raw = match (self.namespace.as_deref(), self.block.as_deref()) {
            (Some(ns), Some(block)) => self.packs.raw_blockstate(ns, block).map(str::to_string),
            _ => None,
        };
        self.apply_raw_blockstate(raw);
    }

    fn apply_raw_blockstate(&mut self, raw: Option<String>) {
        let Some(block) = self.block.clone() else {
            self.clear_resolution();
            return;
        };
        let namespace = self.namespace.clone().unwrap_or_default();

        let Some(raw) = raw else {
            self.clear_resolution();
            self.notices.push(Notice::BlockstateNotFound {
                namespace,
                block,
            });
            return;
        };

        let definition: BlockstateDefinition = match serde_json::from_str(&raw) {
            Ok(def) => def,
            Err(e) => {
                warn!("Unparseable blockstate for {}:{}: {}", namespace, block, e);
                self.clear_resolution();
                self.notices.push(Notice::BlockstateNotFound {
                    namespace,
                    block,
                });
                return;
            }
        };

        // User choices belong to one block; forget them when it changes.
        let identity = (namespace, block.clone());
        let same_block = self.resolved_for.as_ref() == Some(&identity);
        if !same_block {
            self.group_selections.clear();
        }
        self.resolved_for = Some(identity);
        self.displayed_block = Some(block);

        let resolution = resolve_domain(&definition);
        self.domain = resolution.domain;
        let mut selection = resolution.selection;
        if same_block {
            // A pack edit re-derives the domain for the block being shown;
            // property values the user picked stay in force as long as the
            // new domain still allows them.
            for (name, value) in std::mem::take(&mut self.selection) {
                if self.domain.contains_value(&name, &value) {
                    selection.insert(name, value);
                }
            }
        }
        self.selection = selection;
        self.definition = Some(definition);

        self.recompute_groups();
    }

    /// Drop everything derived from a definition; prior packs and namespace
    /// state stay intact.
    fn clear_resolution(&mut self) {
        self.definition = None;
        self.resolved_for = None;
        self.domain = PropertyDomain::default();
        self.selection.clear();
        self.active_groups.clear();
        self.render_list.clear();
        self.sink.clear();
    }

    /// Step 5: active groups under the current selection.
    fn recompute_groups(&mut self) {
        match &self.definition {
            Some(def) => {
                self.active_groups = active_model_groups(def, &self.selection);
            }
            None => self.active_groups.clear(),
        }
        self.recompute_render_list();
    }

    /// Step 6: candidate per group, emit to the sink.
    fn recompute_render_list(&mut self) {
        self.group_selections.prune(&self.active_groups);

        let mut list = Vec::with_capacity(self.active_groups.len());
        for group in &self.active_groups {
            let (index, warning) = self.group_selections.resolve(group);
            if let Some(w) = warning {
                self.notices.push(Notice::IndexOutOfRange(w));
            }
            list.push(group.models[index].clone());
        }
        self.render_list = list;

        if self.render_list.is_empty() {
            if self.definition.is_some() {
                self.notices.push(Notice::NoVisibleModel);
            }
            self.sink.clear();
        } else {
            self.sink.set_render_list(&self.render_list);
        }
    }
}
