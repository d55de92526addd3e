//! Loader for the React-Flow style canvas export produced by visual LLM flow editors.
//!
//! The export nests node configuration under `data`, keeps parameter values in a
//! single `inputs` object and encodes connections twice: once as `edges` and once
//! as `{{nodeId.data.instance}}` placeholders inside `inputs`. The edge list is
//! authoritative; placeholders are dropped.

use super::conversion::IntoFlowDocument;
use super::definition::{
    AnchorDefinition, EdgeDefinition, FlowDocument, NodeDefinition, ParameterDefinition,
    Position,
};
use crate::error::DocumentError;
use serde::Deserialize;

/// Top-level canvas export.
#[derive(Debug, Deserialize)]
pub struct ReactFlowExport {
    #[serde(default)]
    pub nodes: Vec<UiNode>,
    #[serde(default)]
    pub edges: Vec<UiEdge>,
}

impl ReactFlowExport {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct UiNode {
    pub id: String,
    #[serde(default)]
    pub position: Option<Position>,
    pub data: UiNodeData,
}

/// Node configuration as the editor stores it.
#[derive(Debug, Deserialize)]
pub struct UiNodeData {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    #[serde(default, alias = "inputParams")]
    pub input_params: Vec<UiParam>,
    #[serde(default, alias = "inputAnchors")]
    pub input_anchors: Vec<UiAnchor>,
    #[serde(default)]
    pub inputs: serde_json::Map<String, serde_json::Value>,
    #[serde(default, alias = "outputAnchors")]
    pub output_anchors: Vec<UiAnchor>,
}

#[derive(Debug, Deserialize)]
pub struct UiParam {
    pub name: String,
    #[serde(default, rename = "type")]
    pub param_type: Option<String>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UiAnchor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub anchor_type: String,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(default)]
    pub list: Option<bool>,
    /// Output anchors of type `options` list their real anchors here.
    #[serde(default)]
    pub options: Vec<UiAnchor>,
}

#[derive(Debug, Deserialize)]
pub struct UiEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: String,
    pub target: String,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: String,
}

impl IntoFlowDocument for ReactFlowExport {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        let mut seen_ids = ahash::AHashSet::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for ui_node in self.nodes {
            if ui_node.id.trim().is_empty() {
                return Err(DocumentError::ValidationError(format!(
                    "node of type '{}' has an empty id",
                    ui_node.data.name
                )));
            }
            // Duplicates are left in place for the analyzer to report; only note them here.
            if !seen_ids.insert(ui_node.id.clone()) {
                tracing::debug!(node_id = %ui_node.id, "duplicate node id in canvas export");
            }
            nodes.push(convert_node(ui_node));
        }

        let edges = self
            .edges
            .into_iter()
            .map(|e| EdgeDefinition {
                id: e.id,
                source: e.source,
                source_handle: e.source_handle,
                target: e.target,
                target_handle: e.target_handle,
            })
            .collect();

        Ok(FlowDocument { nodes, edges })
    }
}

fn convert_node(ui_node: UiNode) -> NodeDefinition {
    let UiNode { id, position, data } = ui_node;
    let UiNodeData {
        name,
        label,
        category,
        version,
        input_params,
        input_anchors,
        mut inputs,
        output_anchors,
    } = data;

    let anchor_names: Vec<&str> = input_anchors.iter().map(|a| a.name.as_str()).collect();
    let mut parameters = Vec::new();

    // Declared parameters first, in declaration order.
    for param in &input_params {
        let value = inputs
            .remove(&param.name)
            .filter(|v| !is_placeholder(v))
            .or_else(|| param.default.clone())
            .unwrap_or(serde_json::Value::Null);
        parameters.push(ParameterDefinition {
            name: param.name.clone(),
            value,
            declared_type: param.param_type.clone(),
        });
    }
    // Then any undeclared values that are neither anchors nor connection placeholders.
    for (key, value) in inputs {
        if anchor_names.contains(&key.as_str()) || is_placeholder(&value) {
            continue;
        }
        parameters.push(ParameterDefinition {
            name: key,
            value,
            declared_type: None,
        });
    }

    let inputs = input_anchors
        .into_iter()
        .map(|a| AnchorDefinition {
            id: a.id,
            name: a.name,
            data_type: a.anchor_type,
            required: !a.optional.unwrap_or(false),
            list: a.list.unwrap_or(false),
        })
        .collect();

    let outputs = output_anchors
        .into_iter()
        .flat_map(|a| {
            if a.options.is_empty() {
                vec![a]
            } else {
                a.options
            }
        })
        .map(|a| AnchorDefinition {
            id: a.id,
            name: a.name,
            data_type: a.anchor_type,
            required: false,
            list: false,
        })
        .collect();

    NodeDefinition {
        id,
        node_type: name,
        category,
        label,
        version,
        parameters,
        inputs,
        outputs,
        position,
    }
}

/// `true` for `"{{node.data.instance}}"` strings, or arrays made only of them.
fn is_placeholder(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.starts_with("{{") && s.ends_with("}}")
        }
        serde_json::Value::Array(items) => !items.is_empty() && items.iter().all(is_placeholder),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_inputs_into_parameters_and_drops_placeholders() {
        let export: ReactFlowExport = serde_json::from_value(json!({
            "nodes": [{
                "id": "llmChain_0",
                "position": {"x": 10.0, "y": 20.0},
                "data": {
                    "name": "llmChain",
                    "label": "LLM Chain",
                    "version": 3,
                    "inputParams": [{"name": "chainName", "type": "string"}],
                    "inputAnchors": [
                        {"id": "llmChain_0-input-model", "name": "model", "type": "BaseLanguageModel"},
                        {"id": "llmChain_0-input-prompt", "name": "prompt", "type": "BasePromptTemplate", "optional": true}
                    ],
                    "inputs": {
                        "chainName": "qa",
                        "model": "{{chatOpenAI_0.data.instance}}",
                        "verbose": true
                    },
                    "outputAnchors": [{
                        "name": "output",
                        "type": "options",
                        "options": [{"id": "llmChain_0-output-llmChain", "name": "llmChain", "type": "LLMChain"}]
                    }]
                }
            }],
            "edges": []
        }))
        .expect("valid export");

        let doc = export.into_flow_document().expect("conversion succeeds");
        let node = &doc.nodes[0];
        assert_eq!(node.node_type, "llmChain");
        let names: Vec<_> = node.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["chainName", "verbose"]);
        assert!(node.inputs[0].required);
        assert!(!node.inputs[1].required);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.outputs[0].name, "llmChain");
    }

    #[test]
    fn rejects_empty_node_id() {
        let export: ReactFlowExport = serde_json::from_value(json!({
            "nodes": [{"id": " ", "data": {"name": "calculator"}}]
        }))
        .expect("valid export");
        assert!(matches!(
            export.into_flow_document(),
            Err(DocumentError::ValidationError(_))
        ));
    }
}
