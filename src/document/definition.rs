use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

/// The complete, canonical description of a visual flow, ready for IR construction.
/// This is the target structure for any custom editor-format conversion.
///
/// Every field except the node and edge lists is optional on the wire; missing
/// values are defaulted rather than rejected so that the analyzer can explain
/// what is wrong with a flow instead of the loader refusing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

impl FlowDocument {
    /// Parses a canonical flow document from JSON.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Defines a single block of the visual flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "type", alias = "name")]
    pub node_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Schema version of the node, either a number or a string on the wire.
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub inputs: Vec<AnchorDefinition>,
    #[serde(default)]
    pub outputs: Vec<AnchorDefinition>,
    #[serde(default)]
    pub position: Option<Position>,
}

/// A user-edited setting on a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, alias = "type")]
    pub declared_type: Option<String>,
}

/// A typed connection point on a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "type")]
    pub data_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub list: bool,
}

/// Canvas coordinates. Carried through, never used for code generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Defines a directed connection between two anchors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "sourceNodeId")]
    pub source: String,
    #[serde(default, alias = "sourceAnchorId")]
    pub source_handle: String,
    #[serde(alias = "targetNodeId")]
    pub target: String,
    #[serde(default, alias = "targetAnchorId")]
    pub target_handle: String,
}
