//! # Blockstate Preview
//!
//! A Rust library for previewing Minecraft block models from resource packs.
//!
//! ## Overview
//!
//! This library maintains the selection state behind a block-model preview
//! UI: an ordered stack of resource packs, the namespace/block/property
//! selection, and the per-group choice of model candidate. Every change is
//! re-derived in a fixed order and ends in a render list handed to a
//! [`RenderSink`], so the preview never shows a half-updated selection.
//!
//! ## Quick Start
//!
//! ```ignore
//! use blockstate_preview::{
//!     load_pack_from_path, CoordinatorConfig, SelectionCoordinator,
//! };
//!
//! // The sink receives the final list of model candidates to draw.
//! let mut coordinator = SelectionCoordinator::new(
//!     CoordinatorConfig::default(),
//!     Box::new(my_render_sink),
//! );
//!
//! // Load a resource pack (ZIP or directory) at the highest priority.
//! let pack = load_pack_from_path("vanilla", "Vanilla", "path/to/pack.zip")?;
//! coordinator.add_pack(pack)?;
//!
//! // Pick a block and a property value; the sink is updated on each change.
//! coordinator.select_block("furnace");
//! coordinator.set_property("lit", "true")?;
//! ```
//!
//! ## Asynchronous blockstate sources
//!
//! Packs held in memory resolve synchronously. When the blockstate text
//! comes from an async source instead, use
//! [`SelectionCoordinator::begin_blockstate_fetch`] /
//! [`SelectionCoordinator::complete_blockstate_fetch`]: triggers arriving
//! while the fetch is in flight are queued in order, and a completion that
//! was superseded by a newer trigger is discarded.

pub mod blockstate;
pub mod coordinator;
pub mod error;
pub mod pack;
pub mod resolver;

// Re-export main types for convenience
pub use blockstate::{BlockstateDefinition, ModelCandidate, MultipartCase, MultipartCondition};
pub use coordinator::{
    CoordinatorConfig, FetchTicket, Notice, RenderSink, SelectionCoordinator,
};
pub use error::{PreviewError, Result};
pub use pack::{PackAssets, PackEntry, ResourcePackStack};
pub use resolver::{
    active_model_groups, resolve_domain, GroupSelections, ModelGroup, PropertyDomain, PropertyInfo,
};

/// Load a pack from a file path (ZIP or directory).
pub fn load_pack_from_path<P: AsRef<std::path::Path>>(
    id: impl Into<String>,
    display_name: impl Into<String>,
    path: P,
) -> Result<PackEntry> {
    pack::loader::load_from_path(id, display_name, path)
}

/// Load a pack from ZIP bytes (for in-memory or browser-supplied archives).
pub fn load_pack_from_bytes(
    id: impl Into<String>,
    display_name: impl Into<String>,
    data: &[u8],
) -> Result<PackEntry> {
    pack::loader::load_from_bytes(id, display_name, data)
}
