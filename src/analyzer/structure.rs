use crate::error::StructuralError;
use crate::ir::{Edge, FlowGraph};
use crate::report::ConversionReport;
use ahash::{AHashMap, AHashSet};

/// Checks node-id uniqueness, edge endpoints, anchor existence and direction,
/// and input arity. Every violation is reported; any of them is fatal.
pub fn validate_structure(graph: &FlowGraph) -> ConversionReport {
    ConversionReport {
        errors: structural_errors(graph),
        ..ConversionReport::default()
    }
}

fn structural_errors(graph: &FlowGraph) -> Vec<StructuralError> {
    let mut errors = Vec::new();

    let mut seen = AHashSet::with_capacity(graph.node_count());
    let mut reported = AHashSet::new();
    for node in graph.nodes() {
        if !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
            errors.push(StructuralError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }

    for edge in graph.edges() {
        check_source(graph, edge, &mut errors);
        check_target(graph, edge, &mut errors);
    }

    errors.extend(check_arity(graph));
    errors
}

fn check_source(graph: &FlowGraph, edge: &Edge, errors: &mut Vec<StructuralError>) {
    let Some(node) = graph.node(&edge.source_node_id) else {
        errors.push(StructuralError::UnknownNode {
            edge_id: edge.id.clone(),
            node_id: edge.source_node_id.clone(),
        });
        return;
    };
    if node.output_anchor(&edge.source_anchor_id).is_some() {
        return;
    }
    errors.push(if node.input_anchor(&edge.source_anchor_id).is_some() {
        StructuralError::AnchorDirection {
            edge_id: edge.id.clone(),
            node_id: node.id.clone(),
            anchor_id: edge.source_anchor_id.clone(),
            message: "an input anchor cannot be the source of an edge".to_string(),
        }
    } else {
        StructuralError::UnknownAnchor {
            edge_id: edge.id.clone(),
            node_id: node.id.clone(),
            anchor_id: edge.source_anchor_id.clone(),
        }
    });
}

fn check_target(graph: &FlowGraph, edge: &Edge, errors: &mut Vec<StructuralError>) {
    let Some(node) = graph.node(&edge.target_node_id) else {
        errors.push(StructuralError::UnknownNode {
            edge_id: edge.id.clone(),
            node_id: edge.target_node_id.clone(),
        });
        return;
    };
    if node.input_anchor(&edge.target_anchor_id).is_some() {
        return;
    }
    errors.push(if node.output_anchor(&edge.target_anchor_id).is_some() {
        StructuralError::AnchorDirection {
            edge_id: edge.id.clone(),
            node_id: node.id.clone(),
            anchor_id: edge.target_anchor_id.clone(),
            message: "an output anchor cannot be the target of an edge".to_string(),
        }
    } else {
        StructuralError::UnknownAnchor {
            edge_id: edge.id.clone(),
            node_id: node.id.clone(),
            anchor_id: edge.target_anchor_id.clone(),
        }
    });
}

/// Non-list inputs accept at most one edge; list inputs accept any number.
fn check_arity(graph: &FlowGraph) -> Vec<StructuralError> {
    let mut incoming: AHashMap<(usize, &str), usize> = AHashMap::new();
    for resolved in graph.resolved_edges() {
        if !resolved.target_anchor.list {
            *incoming
                .entry((resolved.target, resolved.target_anchor.id.as_str()))
                .or_default() += 1;
        }
    }

    let mut errors = Vec::new();
    for (position, node) in graph.nodes().iter().enumerate() {
        for anchor in &node.inputs {
            match incoming.get(&(position, anchor.id.as_str())) {
                Some(&count) if count > 1 => errors.push(StructuralError::ArityViolation {
                    node_id: node.id.clone(),
                    anchor: anchor.name.clone(),
                    count,
                }),
                _ => {}
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Anchor, IrNode};

    fn tool(id: &str) -> IrNode {
        IrNode::new(id, "calculator").with_output(Anchor::new("tool", "tool", "Tool"))
    }

    #[test]
    fn list_anchor_accepts_many_edges_single_anchor_does_not() {
        let agent = IrNode::new("agent", "toolAgent")
            .with_input(Anchor::new("tools", "tools", "Tool").list())
            .with_input(Anchor::new("model", "model", "BaseChatModel"));
        let graph = FlowGraph::new(
            vec![tool("a"), tool("b"), agent],
            vec![
                Edge::new(("a", "tool"), ("agent", "tools")),
                Edge::new(("b", "tool"), ("agent", "tools")),
                Edge::new(("a", "tool"), ("agent", "model")),
                Edge::new(("b", "tool"), ("agent", "model")),
            ],
        );
        let errors = validate_structure(&graph).errors;
        assert_eq!(
            errors,
            vec![StructuralError::ArityViolation {
                node_id: "agent".to_string(),
                anchor: "model".to_string(),
                count: 2,
            }]
        );
    }

    #[test]
    fn reversed_edge_is_a_direction_error() {
        let chain = IrNode::new("chain", "llmChain")
            .with_input(Anchor::new("model", "model", "BaseLanguageModel"));
        let graph = FlowGraph::new(
            vec![tool("t"), chain],
            vec![Edge::new(("chain", "model"), ("t", "tool"))],
        );
        let errors = validate_structure(&graph).errors;
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, StructuralError::AnchorDirection { .. })));
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let graph = FlowGraph::new(vec![tool("x"), tool("x"), tool("x")], Vec::new());
        assert_eq!(
            validate_structure(&graph).errors,
            vec![StructuralError::DuplicateNodeId {
                node_id: "x".to_string()
            }]
        );
    }
}
