use crate::error::StructuralError;
use crate::ir::{FlowGraph, IrNode};
use crate::registry::ConverterRegistry;
use crate::report::{Coverage, Warning};
use ahash::AHashSet;
use itertools::Itertools;

/// Asks the registry about every node. Unsupported types are deduplicated and
/// kept in order of first appearance.
pub fn resolve_converters(graph: &FlowGraph, registry: &ConverterRegistry) -> Coverage {
    let (supported, unsupported): (Vec<&IrNode>, Vec<&IrNode>) = graph
        .nodes()
        .iter()
        .partition(|node| registry.resolve(node).is_some());

    Coverage {
        supported_types: supported
            .iter()
            .map(|n| n.node_type.clone())
            .sorted()
            .dedup()
            .collect(),
        unsupported_types: unsupported
            .iter()
            .map(|n| n.node_type.clone())
            .unique()
            .collect(),
        supported_nodes: supported.len(),
        total_nodes: graph.node_count(),
    }
}

/// One warning per unsupported type, listing the nodes of that type.
pub fn unsupported_type_warnings(graph: &FlowGraph, coverage: &Coverage) -> Vec<Warning> {
    coverage
        .unsupported_types
        .iter()
        .map(|type_name| Warning::UnsupportedType {
            type_name: type_name.clone(),
            node_ids: graph
                .nodes()
                .iter()
                .filter(|n| &n.node_type == type_name)
                .map(|n| n.id.clone())
                .collect(),
        })
        .collect()
}

/// Required inputs without an incoming edge, on nodes that have a converter.
/// Nodes without a converter contribute no code, so their inputs do not matter.
pub fn check_required_inputs(
    graph: &FlowGraph,
    registry: &ConverterRegistry,
) -> Vec<StructuralError> {
    let connected: AHashSet<(usize, &str)> = graph
        .resolved_edges()
        .into_iter()
        .map(|r| (r.target, r.target_anchor.id.as_str()))
        .collect();

    let mut errors = Vec::new();
    for (position, node) in graph.nodes().iter().enumerate() {
        if registry.resolve(node).is_none() {
            continue;
        }
        for anchor in node.inputs.iter().filter(|a| a.required) {
            if !connected.contains(&(position, anchor.id.as_str())) {
                errors.push(StructuralError::MissingRequiredInput {
                    node_id: node.id.clone(),
                    anchor: anchor.name.clone(),
                });
            }
        }
    }
    errors
}

/// Deprecation and schema-version findings for nodes with a converter.
pub fn check_versions(graph: &FlowGraph, registry: &ConverterRegistry) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for node in graph.nodes() {
        let Some(converter) = registry.resolve(node) else {
            continue;
        };
        if converter.is_deprecated() {
            warnings.push(Warning::Deprecated {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
                replacement: converter.replacement_type().map(str::to_string),
            });
        }
        let supported = converter.supported_versions();
        if let Some(version) = &node.version {
            if !supported.is_empty() && !supported.contains(&version.as_str()) {
                warnings.push(Warning::VersionMismatch {
                    node_id: node.id.clone(),
                    node_type: node.node_type.clone(),
                    version: version.clone(),
                    supported: supported.iter().map(|v| v.to_string()).collect(),
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Anchor, IrNode};

    #[test]
    fn unsupported_types_are_deduplicated_in_first_seen_order() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = FlowGraph::new(
            vec![
                IrNode::new("a", "mysteryTool"),
                IrNode::new("b", "chatOpenAI"),
                IrNode::new("c", "otherThing"),
                IrNode::new("d", "mysteryTool"),
            ],
            Vec::new(),
        );
        let coverage = resolve_converters(&graph, &registry);
        assert_eq!(coverage.unsupported_types, vec!["mysteryTool", "otherThing"]);
        assert_eq!(coverage.supported_nodes, 1);
        assert_eq!(coverage.ratio(), 0.25);

        let warnings = unsupported_type_warnings(&graph, &coverage);
        assert_eq!(
            warnings[0],
            Warning::UnsupportedType {
                type_name: "mysteryTool".to_string(),
                node_ids: vec!["a".to_string(), "d".to_string()],
            }
        );
    }

    #[test]
    fn required_inputs_only_matter_for_convertible_nodes() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = FlowGraph::new(
            vec![
                IrNode::new("chain", "llmChain")
                    .with_input(Anchor::new("model", "model", "BaseLanguageModel").required()),
                IrNode::new("odd", "mysteryTool")
                    .with_input(Anchor::new("x", "x", "any").required()),
            ],
            Vec::new(),
        );
        assert_eq!(
            check_required_inputs(&graph, &registry),
            vec![StructuralError::MissingRequiredInput {
                node_id: "chain".to_string(),
                anchor: "model".to_string(),
            }]
        );
    }

    #[test]
    fn deprecated_and_unknown_versions_are_flagged() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = FlowGraph::new(
            vec![
                IrNode::new("m", "mrklAgentChat"),
                IrNode::new("p", "promptTemplate").with_version("4"),
            ],
            Vec::new(),
        );
        let warnings = check_versions(&graph, &registry);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            Warning::Deprecated { replacement: Some(r), .. } if r == "toolAgent"
        ));
        assert!(matches!(&warnings[1], Warning::VersionMismatch { version, .. } if version == "4"));
    }
}
