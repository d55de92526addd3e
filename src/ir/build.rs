use super::graph::{Edge, FlowGraph};
use super::node::{Anchor, IrNode, ParamValue, Parameter};
use crate::document::{AnchorDefinition, FlowDocument, NodeDefinition};

impl FlowGraph {
    /// Builds the IR from a parsed document.
    ///
    /// Construction never fails: missing optional fields are defaulted and
    /// every validity judgement is left to the analyzer. Node order follows the
    /// document's node array.
    pub fn from_document(document: FlowDocument) -> Self {
        let nodes = document.nodes.into_iter().map(build_node).collect();
        let edges = document
            .edges
            .into_iter()
            .enumerate()
            .map(|(i, e)| Edge {
                id: if e.id.is_empty() {
                    format!("edge-{}", i)
                } else {
                    e.id
                },
                source_node_id: e.source,
                source_anchor_id: e.source_handle,
                target_node_id: e.target,
                target_anchor_id: e.target_handle,
            })
            .collect();
        FlowGraph::new(nodes, edges)
    }
}

impl From<FlowDocument> for FlowGraph {
    fn from(document: FlowDocument) -> Self {
        FlowGraph::from_document(document)
    }
}

fn build_node(definition: NodeDefinition) -> IrNode {
    let label = definition
        .label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| definition.node_type.clone());
    IrNode {
        id: definition.id,
        label,
        category: definition.category.unwrap_or_default(),
        version: definition.version.and_then(version_tag),
        parameters: definition
            .parameters
            .into_iter()
            .map(|p| Parameter {
                name: p.name,
                value: ParamValue::from(p.value),
                declared_type: p.declared_type,
            })
            .collect(),
        inputs: definition.inputs.into_iter().map(build_anchor).collect(),
        outputs: definition
            .outputs
            .into_iter()
            .map(|a| Anchor {
                required: false,
                ..build_anchor(a)
            })
            .collect(),
        position: definition.position,
        node_type: definition.node_type,
    }
}

fn build_anchor(definition: AnchorDefinition) -> Anchor {
    // Anchors without an id are addressed by name.
    let id = if definition.id.is_empty() {
        definition.name.clone()
    } else {
        definition.id
    };
    Anchor {
        id,
        name: definition.name,
        data_type: definition.data_type,
        required: definition.required,
        list: definition.list,
    }
}

/// Versions arrive as numbers or strings; both become a string tag.
fn version_tag(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{EdgeDefinition, ParameterDefinition};
    use serde_json::json;

    #[test]
    fn defaults_missing_fields_and_keeps_document_order() {
        let doc = FlowDocument {
            nodes: vec![
                NodeDefinition {
                    id: "b".to_string(),
                    node_type: "calculator".to_string(),
                    version: Some(json!(1)),
                    ..Default::default()
                },
                NodeDefinition {
                    id: "a".to_string(),
                    node_type: "chatOpenAI".to_string(),
                    label: Some("  ".to_string()),
                    parameters: vec![ParameterDefinition {
                        name: "temperature".to_string(),
                        value: json!(0.5),
                        declared_type: Some("number".to_string()),
                    }],
                    inputs: vec![AnchorDefinition {
                        name: "cache".to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
            edges: vec![EdgeDefinition {
                source: "b".to_string(),
                target: "a".to_string(),
                ..Default::default()
            }],
        };

        let graph = FlowGraph::from_document(doc);
        assert_eq!(graph.position("b"), Some(0));
        assert_eq!(graph.position("a"), Some(1));
        let a = graph.node("a").expect("node a");
        assert_eq!(a.label, "chatOpenAI");
        assert_eq!(a.inputs[0].id, "cache");
        assert_eq!(a.parameters[0].value, ParamValue::Number(0.5));
        assert_eq!(graph.node("b").and_then(|n| n.version.clone()), Some("1".to_string()));
        assert_eq!(graph.edges()[0].id, "edge-0");
    }
}
