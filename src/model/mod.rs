//! Network model document handling.
//!
//! The model is a JSON document with a top-level `elements` mapping. Only the
//! fields the sweep reads or rewrites are typed; everything else round-trips
//! untouched through flattened passthrough maps, so a variant submitted back to
//! the calculation service carries the full original document.

pub mod variant;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BREAKER_TYPE: &str = "breaker";
pub const SHORT_CIRCUIT_TYPE: &str = "short_circuit";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkModel {
    #[serde(default)]
    pub elements: BTreeMap<String, Element>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Switching state; breakers carry their phase flags in the first entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<SwitchState>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faults: Option<FaultSpec>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchState {
    #[serde(rename = "AisClosed", skip_serializing_if = "Option::is_none")]
    pub a_closed: Option<bool>,
    #[serde(rename = "BisClosed", skip_serializing_if = "Option::is_none")]
    pub b_closed: Option<bool>,
    #[serde(rename = "CisClosed", skip_serializing_if = "Option::is_none")]
    pub c_closed: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<FaultState>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A breaker known to the model, with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breaker {
    pub id: String,
    pub name: String,
}

impl Element {
    pub fn is_breaker(&self) -> bool {
        self.kind == BREAKER_TYPE
    }

    pub fn is_short_circuit(&self) -> bool {
        self.kind == SHORT_CIRCUIT_TYPE
    }
}

impl NetworkModel {
    /// Loads the base model from disk. A missing or malformed document is
    /// fatal: no sweep can run without a model.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read network model {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed network model {}", path.display()))
    }

    /// All breakers in element-ID order. The display name falls back to the ID
    /// when the element carries no `Name`. This ordering anchors the
    /// contingency enumeration order, so tie lists are reproducible.
    pub fn breakers(&self) -> Vec<Breaker> {
        self.elements
            .iter()
            .filter(|(_, el)| el.is_breaker())
            .map(|(id, el)| Breaker {
                id: id.clone(),
                name: el.name.clone().unwrap_or_else(|| id.clone()),
            })
            .collect()
    }
}
