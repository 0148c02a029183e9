//! Property domain and model group resolution.
//!
//! This module turns a parsed blockstate definition into the values the
//! selection state machine works with: the domain of selectable properties
//! with visible defaults, the model groups active under a selection, and the
//! per-group candidate index store.

pub mod domain;
pub mod groups;
pub mod selection;

pub use domain::{resolve_domain, DomainResolution, PropertyDomain, PropertyInfo};
pub use groups::{active_model_groups, ModelGroup};
pub use selection::{GroupSelections, IndexOutOfRange};
