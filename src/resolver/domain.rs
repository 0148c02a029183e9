//! Property domain derivation and visible default selection.
//!
//! Blockstate JSON never declares property defaults, so the default for each
//! property is the allowed value with the highest default-likeness score
//! (power=0 over power=15, facing=north over facing=south, and so on).

use crate::blockstate::BlockstateDefinition;
use crate::resolver::groups::active_model_groups;
use std::collections::BTreeMap;

/// One selectable property: its allowed values in declared order and the
/// default chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub values: Vec<String>,
    pub default: String,
}

/// The full set of selectable properties for a block, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDomain {
    properties: Vec<PropertyInfo>,
}

impl PropertyDomain {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.get(name)
            .map(|p| p.values.iter().any(|v| v == value))
            .unwrap_or(false)
    }
}

/// A derived domain together with the guaranteed-visibility selection.
#[derive(Debug, Clone)]
pub struct DomainResolution {
    pub domain: PropertyDomain,
    pub selection: BTreeMap<String, String>,
}

/// Derive the property domain for a definition and pick a default selection
/// that yields a non-empty active-group set where possible.
///
/// The visibility guarantee is best-effort: defaults are seeded per property,
/// and if no group is active under them, exactly one property (the first) is
/// adjusted to its first differing allowed value. A block with no valid
/// combination keeps its defaults and resolves to an empty group set.
pub fn resolve_domain(def: &BlockstateDefinition) -> DomainResolution {
    let domain = property_domain(def);

    let mut selection: BTreeMap<String, String> = domain
        .properties()
        .iter()
        .map(|p| (p.name.clone(), p.default.clone()))
        .collect();

    if !active_model_groups(def, &selection).is_empty() {
        return DomainResolution { domain, selection };
    }

    if let Some(first) = domain.properties().first() {
        if let Some(alternative) = first.values.iter().find(|v| **v != first.default) {
            selection.insert(first.name.clone(), alternative.clone());
        }
    }

    DomainResolution { domain, selection }
}

/// Extract the property domain from a definition.
///
/// Variant keys are walked in `BTreeMap` order and multipart cases in file
/// order, so the declared order of properties and values is stable.
pub fn property_domain(def: &BlockstateDefinition) -> PropertyDomain {
    let mut order: Vec<String> = Vec::new();
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let mut record = |prop: &str, value: &str| {
        if !values.contains_key(prop) {
            order.push(prop.to_string());
            values.insert(prop.to_string(), Vec::new());
        }
        let list = values.get_mut(prop).expect("inserted above");
        if !list.iter().any(|v| v == value) {
            list.push(value.to_string());
        }
    };

    match def {
        BlockstateDefinition::Variants(variants) => {
            for key in variants.keys() {
                if key.is_empty() {
                    continue;
                }
                for pair in key.split(',') {
                    if let Some((prop, value)) = pair.split_once('=') {
                        record(prop, value);
                    }
                }
            }
        }
        BlockstateDefinition::Multipart(cases) => {
            for case in cases {
                if let Some(condition) = &case.when {
                    for (prop, expr) in condition.referenced_pairs() {
                        // Pipe expressions list alternatives, each a value.
                        for value in expr.split('|') {
                            record(prop, value);
                        }
                    }
                }
            }
        }
    }

    let properties = order
        .into_iter()
        .map(|name| {
            let vals = values.remove(&name).expect("recorded above");
            let default = default_value(&name, &vals);
            PropertyInfo {
                name,
                values: vals,
                default,
            }
        })
        .collect();

    PropertyDomain { properties }
}

/// Pick the most default-like value from an allowed set. Ties resolve to the
/// first-declared value.
fn default_value(property: &str, values: &[String]) -> String {
    values
        .iter()
        .max_by_key(|v| value_default_score(property, v))
        .cloned()
        .unwrap_or_default()
}

/// Score how "default-like" a property value is.
/// Higher scores indicate more default-like values.
fn value_default_score(property: &str, value: &str) -> i32 {
    // Numeric properties: lower is more default (power=0 > power=15)
    if let Ok(num) = value.parse::<i32>() {
        return -num * 10;
    }

    match property {
        "axis" => match value {
            "y" => return 50, // Y is default for logs, pillars
            _ => return 0,
        },
        "half" => match value {
            "bottom" | "lower" => return 50,
            "top" | "upper" => return -50,
            _ => return 0,
        },
        "type" => match value {
            "single" | "normal" | "bottom" => return 50,
            "double" | "top" => return -50,
            _ => return 0,
        },
        "facing" => match value {
            "north" => return 50,
            "south" => return 40,
            "east" => return 30,
            "west" => return 20,
            "up" => return 10,
            _ => return 0,
        },
        "shape" => match value {
            "straight" => return 50,
            _ => return 0,
        },
        // Connection properties (fences, walls, redstone)
        "north" | "south" | "east" | "west" => match value {
            "none" | "false" => return 50,
            "low" | "side" => return 0,
            "tall" | "up" => return -20,
            "true" => return -50,
            _ => return 0,
        },
        _ => {}
    }

    // Generic value defaults
    match value {
        "false" | "off" | "none" => 100,
        "true" | "on" => -100,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> BlockstateDefinition {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_domain_from_variants() {
        let def = parse(
            r#"{
            "variants": {
                "extended=false,facing=north": { "model": "block/piston" },
                "extended=false,facing=south": { "model": "block/piston", "y": 180 },
                "extended=true,facing=north": { "model": "block/piston_extended" },
                "extended=true,facing=south": { "model": "block/piston_extended", "y": 180 }
            }
        }"#,
        );

        let domain = property_domain(&def);
        let names: Vec<&str> = domain.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["extended", "facing"]);

        let extended = domain.get("extended").unwrap();
        assert_eq!(extended.values, vec!["false", "true"]);
        assert_eq!(extended.default, "false");

        let facing = domain.get("facing").unwrap();
        assert_eq!(facing.default, "north");
    }

    #[test]
    fn test_domain_from_multipart() {
        let def = parse(
            r#"{
            "multipart": [
                { "apply": { "model": "block/fence_post" } },
                { "when": { "north": "true" }, "apply": { "model": "block/fence_side" } },
                { "when": { "south": "true" }, "apply": { "model": "block/fence_side", "y": 180 } }
            ]
        }"#,
        );

        let domain = property_domain(&def);
        let names: Vec<&str> = domain.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["north", "south"]);
        assert_eq!(domain.get("north").unwrap().values, vec!["true"]);
    }

    #[test]
    fn test_domain_from_pipe_values() {
        let def = parse(
            r#"{
            "multipart": [
                { "when": { "facing": "north|south" }, "apply": { "model": "block/panel" } }
            ]
        }"#,
        );

        let domain = property_domain(&def);
        assert_eq!(domain.get("facing").unwrap().values, vec!["north", "south"]);
    }

    #[test]
    fn test_numeric_default_prefers_zero() {
        assert!(value_default_score("power", "0") > value_default_score("power", "15"));
        assert_eq!(default_value("power", &["15".into(), "0".into(), "7".into()]), "0");
    }

    #[test]
    fn test_resolve_domain_keeps_visible_defaults() {
        let def = parse(
            r#"{
            "variants": {
                "lit=false": { "model": "block/furnace" },
                "lit=true": { "model": "block/furnace_on" }
            }
        }"#,
        );

        let resolution = resolve_domain(&def);
        assert_eq!(resolution.selection.get("lit").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_resolve_domain_adjusts_first_property_once() {
        // Defaults seed lit=false, half=bottom, which no key declares. The
        // first property (lit) is bumped to its first alternative; half is
        // never touched.
        let def = parse(
            r#"{
            "variants": {
                "lit=false,half=top": { "model": "block/lamp_top" },
                "lit=true,half=bottom": { "model": "block/lamp_lit" }
            }
        }"#,
        );

        let resolution = resolve_domain(&def);
        assert_eq!(resolution.selection.get("lit").map(String::as_str), Some("true"));
        assert_eq!(resolution.selection.get("half").map(String::as_str), Some("bottom"));
        assert!(!active_model_groups(&def, &resolution.selection).is_empty());
    }

    #[test]
    fn test_resolve_domain_adjustment_is_shallow() {
        // Defaults seed level=1, layer=1 (no match). The single adjustment
        // tries level=2 (first differing value), which still matches nothing;
        // the heuristic stops there rather than searching further.
        let def = parse(
            r#"{
            "variants": {
                "level=1,layer=2": { "model": "block/odd_a" },
                "level=2,layer=9": { "model": "block/odd_b" },
                "level=3,layer=1": { "model": "block/odd_c" }
            }
        }"#,
        );

        let resolution = resolve_domain(&def);
        assert_eq!(resolution.selection.get("level").map(String::as_str), Some("2"));
        assert_eq!(resolution.selection.get("layer").map(String::as_str), Some("1"));
        assert!(active_model_groups(&def, &resolution.selection).is_empty());
    }

    #[test]
    fn test_empty_domain_for_single_variant_block() {
        let def = parse(r#"{"variants":{"":{"model":"block/stone"}}}"#);
        let resolution = resolve_domain(&def);
        assert!(resolution.domain.is_empty());
        assert!(resolution.selection.is_empty());
        assert!(!active_model_groups(&def, &resolution.selection).is_empty());
    }
}
