//! Blockstate definition parsing.
//!
//! Blockstates define how block properties map to model candidates.
//! There are two formats: "variants" and "multipart".

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A blockstate definition from blockstates/*.json.
///
/// Variant keys live in a `BTreeMap` so property-domain derivation iterates
/// them in a stable order regardless of JSON key order.
#[derive(Debug, Clone)]
pub enum BlockstateDefinition {
    /// Simple variants: property combinations map to candidate lists.
    Variants(BTreeMap<String, Vec<ModelCandidate>>),
    /// Multipart: conditional model application, in file order.
    Multipart(Vec<MultipartCase>),
}

impl<'de> Deserialize<'de> for BlockstateDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawBlockstate {
            variants: Option<BTreeMap<String, CandidateValue>>,
            multipart: Option<Vec<MultipartCase>>,
        }

        let raw = RawBlockstate::deserialize(deserializer)?;

        if let Some(variants) = raw.variants {
            let parsed: BTreeMap<String, Vec<ModelCandidate>> = variants
                .into_iter()
                .map(|(k, v)| (k, v.into_vec()))
                .collect();
            Ok(BlockstateDefinition::Variants(parsed))
        } else if let Some(multipart) = raw.multipart {
            Ok(BlockstateDefinition::Multipart(multipart))
        } else {
            // Empty blockstate (shouldn't happen but handle gracefully)
            Ok(BlockstateDefinition::Variants(BTreeMap::new()))
        }
    }
}

/// A variant value can be a single candidate or an array of weighted ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CandidateValue {
    Single(ModelCandidate),
    Multiple(Vec<ModelCandidate>),
}

impl CandidateValue {
    fn into_vec(self) -> Vec<ModelCandidate> {
        match self {
            CandidateValue::Single(v) => vec![v],
            CandidateValue::Multiple(v) => v,
        }
    }
}

/// A model candidate reference with optional rotation and weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCandidate {
    /// Model resource location (e.g., "block/stone" or "minecraft:block/stone").
    pub model: String,
    /// X rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub y: i32,
    /// If true, UV coordinates don't rotate with the block.
    #[serde(default)]
    pub uvlock: bool,
    /// Weight for random selection; absent means unweighted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl ModelCandidate {
    /// Get the full resource location for the model.
    pub fn model_location(&self) -> String {
        if self.model.contains(':') {
            self.model.clone()
        } else {
            format!("minecraft:{}", self.model)
        }
    }
}

/// A multipart case with optional condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipartCase {
    /// Condition for when this case applies.
    #[serde(default)]
    pub when: Option<MultipartCondition>,
    /// Model(s) to apply when the condition is met.
    pub apply: ApplyValue,
}

/// The apply value can be a single candidate or an array.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ApplyValue {
    Single(ModelCandidate),
    Multiple(Vec<ModelCandidate>),
}

impl ApplyValue {
    pub fn candidates(&self) -> Vec<&ModelCandidate> {
        match self {
            ApplyValue::Single(v) => vec![v],
            ApplyValue::Multiple(v) => v.iter().collect(),
        }
    }
}

/// Multipart condition for when a case applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultipartCondition {
    /// OR condition: any of the sub-conditions must match.
    Or { OR: Vec<HashMap<String, String>> },
    /// AND condition: all of the sub-conditions must match.
    And { AND: Vec<HashMap<String, String>> },
    /// Simple condition: all properties must match.
    Simple(HashMap<String, String>),
}

impl MultipartCondition {
    /// Check if the condition matches the given property selection.
    ///
    /// The selection is expected to carry a value for every domain property,
    /// so a property missing from the selection fails the condition.
    pub fn matches(&self, selection: &BTreeMap<String, String>) -> bool {
        match self {
            MultipartCondition::Or { OR } => {
                OR.iter().any(|cond| Self::matches_simple(cond, selection))
            }
            MultipartCondition::And { AND } => {
                AND.iter().all(|cond| Self::matches_simple(cond, selection))
            }
            MultipartCondition::Simple(cond) => Self::matches_simple(cond, selection),
        }
    }

    /// Check if a simple condition (property map) matches.
    fn matches_simple(
        condition: &HashMap<String, String>,
        selection: &BTreeMap<String, String>,
    ) -> bool {
        condition.iter().all(|(key, expected_value)| {
            let Some(value) = selection.get(key) else {
                return false;
            };
            // Handle pipe-separated values (e.g., "north|south")
            if expected_value.contains('|') {
                expected_value.split('|').any(|allowed| allowed == value)
            } else {
                value == expected_value
            }
        })
    }

    /// Canonical string form of this condition, used as a stable key for
    /// per-group selection state. Simple/AND conditions serialize to sorted
    /// `prop=value` pairs joined with commas; OR alternatives join with "||".
    pub fn key(&self) -> String {
        match self {
            MultipartCondition::Simple(cond) => serialize_pairs(cond.iter()),
            MultipartCondition::And { AND } => {
                serialize_pairs(AND.iter().flat_map(|c| c.iter()))
            }
            MultipartCondition::Or { OR } => OR
                .iter()
                .map(|c| serialize_pairs(c.iter()))
                .collect::<Vec<_>>()
                .join("||"),
        }
    }

    /// Iterate all `(property, value-expression)` pairs referenced by this
    /// condition, for property-domain derivation.
    pub fn referenced_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = match self {
            MultipartCondition::Simple(cond) => {
                cond.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
            }
            MultipartCondition::And { AND } => AND
                .iter()
                .flat_map(|c| c.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .collect(),
            MultipartCondition::Or { OR } => OR
                .iter()
                .flat_map(|c| c.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .collect(),
        };
        pairs.sort();
        pairs
    }
}

fn serialize_pairs<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    let mut pairs: Vec<_> = pairs.collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a property string from a selection for variant lookup.
/// Properties are sorted alphabetically and joined with commas.
/// e.g., {"facing": "north", "half": "bottom"} -> "facing=north,half=bottom"
pub fn build_property_string(selection: &BTreeMap<String, String>) -> String {
    selection
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Check whether every `prop=value` pair in a variant key agrees with the
/// current selection. The empty key matches any selection.
pub fn variant_key_matches(variant_key: &str, selection: &BTreeMap<String, String>) -> bool {
    if variant_key.is_empty() {
        return true;
    }

    variant_key.split(',').all(|pair| {
        match pair.split_once('=') {
            Some((prop, value)) => selection.get(prop).map(String::as_str) == Some(value),
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_simple_variants() {
        let json = r#"{
            "variants": {
                "": { "model": "block/stone" }
            }
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        match def {
            BlockstateDefinition::Variants(variants) => {
                assert!(variants.contains_key(""));
                assert_eq!(variants[""].len(), 1);
                assert_eq!(variants[""][0].model, "block/stone");
                assert_eq!(variants[""][0].weight, None);
            }
            _ => panic!("Expected Variants"),
        }
    }

    #[test]
    fn test_parse_variants_with_rotation() {
        let json = r#"{
            "variants": {
                "facing=north": { "model": "block/furnace", "y": 0 },
                "facing=east": { "model": "block/furnace", "y": 90 },
                "facing=south": { "model": "block/furnace", "y": 180 },
                "facing=west": { "model": "block/furnace", "y": 270 }
            }
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        match def {
            BlockstateDefinition::Variants(variants) => {
                assert_eq!(variants.len(), 4);
                assert_eq!(variants["facing=east"][0].y, 90);
            }
            _ => panic!("Expected Variants"),
        }
    }

    #[test]
    fn test_parse_weighted_variants() {
        let json = r#"{
            "variants": {
                "": [
                    { "model": "block/stone", "weight": 10 },
                    { "model": "block/stone_mirrored", "weight": 5 },
                    { "model": "block/stone_plain" }
                ]
            }
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        match def {
            BlockstateDefinition::Variants(variants) => {
                assert_eq!(variants[""].len(), 3);
                assert_eq!(variants[""][0].weight, Some(10));
                assert_eq!(variants[""][1].weight, Some(5));
                assert_eq!(variants[""][2].weight, None);
            }
            _ => panic!("Expected Variants"),
        }
    }

    #[test]
    fn test_parse_multipart() {
        let json = r#"{
            "multipart": [
                { "apply": { "model": "block/fence_post" } },
                { "when": { "north": "true" }, "apply": { "model": "block/fence_side" } }
            ]
        }"#;

        let def: BlockstateDefinition = serde_json::from_str(json).unwrap();
        match def {
            BlockstateDefinition::Multipart(cases) => {
                assert_eq!(cases.len(), 2);
                assert!(cases[0].when.is_none());
                assert!(cases[1].when.is_some());
            }
            _ => panic!("Expected Multipart"),
        }
    }

    #[test]
    fn test_multipart_condition_simple() {
        let cond = MultipartCondition::Simple(
            [("facing".to_string(), "north".to_string())]
                .into_iter()
                .collect(),
        );

        assert!(cond.matches(&selection(&[("facing", "north")])));
        assert!(!cond.matches(&selection(&[("facing", "south")])));
        // Missing property fails the condition.
        assert!(!cond.matches(&selection(&[])));
    }

    #[test]
    fn test_multipart_condition_or() {
        let json = r#"{ "OR": [{ "facing": "north" }, { "facing": "south" }] }"#;
        let cond: MultipartCondition = serde_json::from_str(json).unwrap();

        assert!(cond.matches(&selection(&[("facing", "north")])));
        assert!(cond.matches(&selection(&[("facing", "south")])));
        assert!(!cond.matches(&selection(&[("facing", "east")])));
    }

    #[test]
    fn test_multipart_condition_pipe_values() {
        let cond = MultipartCondition::Simple(
            [("facing".to_string(), "north|south".to_string())]
                .into_iter()
                .collect(),
        );

        assert!(cond.matches(&selection(&[("facing", "north")])));
        assert!(cond.matches(&selection(&[("facing", "south")])));
        assert!(!cond.matches(&selection(&[("facing", "east")])));
    }

    #[test]
    fn test_condition_key_is_sorted() {
        let cond = MultipartCondition::Simple(
            [
                ("west".to_string(), "true".to_string()),
                ("east".to_string(), "true".to_string()),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(cond.key(), "east=true,west=true");
    }

    #[test]
    fn test_condition_key_or() {
        let json = r#"{ "OR": [{ "north": "true" }, { "south": "true" }] }"#;
        let cond: MultipartCondition = serde_json::from_str(json).unwrap();
        assert_eq!(cond.key(), "north=true||south=true");
    }

    #[test]
    fn test_build_property_string() {
        let sel = selection(&[("facing", "north"), ("half", "bottom")]);
        assert_eq!(build_property_string(&sel), "facing=north,half=bottom");
        assert_eq!(build_property_string(&BTreeMap::new()), "");
    }

    #[test]
    fn test_variant_key_matches() {
        let sel = selection(&[("facing", "north"), ("waterlogged", "false")]);

        assert!(variant_key_matches("", &sel));
        assert!(variant_key_matches("facing=north", &sel));
        assert!(variant_key_matches("facing=north,waterlogged=false", &sel));
        assert!(!variant_key_matches("facing=south", &sel));
        assert!(!variant_key_matches("half=top", &sel));
    }
}
