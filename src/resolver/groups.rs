//! Active model group resolution.
//!
//! Given a parsed definition and a full property selection, produce the
//! ordered list of model groups to render. Variants files contribute at most
//! one group; multipart files contribute one group per matching case.

use crate::blockstate::{variant_key_matches, BlockstateDefinition, ModelCandidate};
use std::collections::BTreeMap;

/// A set of alternative model candidates active under one condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGroup {
    /// The condition that activated this group, or `None` for an
    /// unconditional group ("" variant key or condition-less multipart case).
    pub condition_key: Option<String>,
    /// Candidates in declared order; exactly one is rendered.
    pub models: Vec<ModelCandidate>,
    /// Whether the candidates are alternatives under random weighting.
    pub is_weighted: bool,
}

impl ModelGroup {
    /// The key under which per-group selection state is stored. Unconditional
    /// groups share the empty key.
    pub fn selection_key(&self) -> &str {
        self.condition_key.as_deref().unwrap_or("")
    }
}

/// Resolve the model groups active under a selection, in declared order.
///
/// Returns an empty list when nothing matches; the caller decides whether
/// that is a notice-worthy condition.
pub fn active_model_groups(
    def: &BlockstateDefinition,
    selection: &BTreeMap<String, String>,
) -> Vec<ModelGroup> {
    match def {
        BlockstateDefinition::Variants(variants) => resolve_variants(variants, selection),
        BlockstateDefinition::Multipart(cases) => cases
            .iter()
            .filter(|case| {
                case.when
                    .as_ref()
                    .map(|cond| cond.matches(selection))
                    .unwrap_or(true)
            })
            .filter_map(|case| {
                let models: Vec<ModelCandidate> =
                    case.apply.candidates().into_iter().cloned().collect();
                // A candidate-less case renders nothing; drop it.
                if models.is_empty() {
                    return None;
                }
                Some(group(case.when.as_ref().map(|c| c.key()), models))
            })
            .collect(),
    }
}

fn resolve_variants(
    variants: &BTreeMap<String, Vec<ModelCandidate>>,
    selection: &BTreeMap<String, String>,
) -> Vec<ModelGroup> {
    // First non-empty key fully satisfied by the selection wins. Keys with
    // an empty candidate array render nothing and are passed over.
    for (key, models) in variants {
        if key.is_empty() || models.is_empty() {
            continue;
        }
        if variant_key_matches(key, selection) {
            return vec![group(Some(key.clone()), models.clone())];
        }
    }

    // Fall back to the default ("") variant if present.
    if let Some(models) = variants.get("") {
        if !models.is_empty() {
            return vec![group(None, models.clone())];
        }
    }

    Vec::new()
}

fn group(condition_key: Option<String>, models: Vec<ModelCandidate>) -> ModelGroup {
    let is_weighted = models.len() > 1;
    ModelGroup {
        condition_key,
        models,
        is_weighted,
    }
}
