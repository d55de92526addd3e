//! Tests for flow analysis: structure, coverage, cycles and hints.
mod common;
use common::*;
use flow2code::analyzer::{analyze, detect_cycles, validate_structure};
use flow2code::prelude::*;
use pretty_assertions::assert_eq;

fn registry() -> ConverterRegistry {
    ConverterRegistry::with_defaults().expect("default catalogue is valid")
}

#[test]
fn test_valid_flow_has_clean_report() {
    let report = analyze(&create_prompt_chain_flow(), &registry());
    assert!(!report.is_fatal());
    assert!(report.warnings.is_empty());
    assert_eq!(report.metrics, flow2code::report::FlowMetrics { node_count: 3, edge_count: 2 });
    assert_eq!(report.complexity, Complexity::Simple);
    assert_eq!(report.coverage.ratio(), 1.0);
    assert_eq!(
        report.coverage.supported_types,
        vec!["chatOpenAI", "llmChain", "promptTemplate"]
    );
}

#[test]
fn test_complexity_grows_with_graph_size() {
    let report = analyze(&create_tool_agent_flow(), &registry());
    assert_eq!(report.complexity, Complexity::Moderate);
}

#[test]
fn test_structure_reports_every_broken_edge() {
    let graph = FlowGraph::new(
        vec![model("llm"), llm_chain("chain")],
        vec![
            connect("llm", "nowhere", "model"),
            Edge::new(("llm", "missing"), ("chain", "model")),
            Edge::new(("chain", "prompt"), ("llm", "out")),
        ],
    );
    let report = validate_structure(&graph);
    let kinds: Vec<&str> = report
        .errors
        .iter()
        .map(|e| match e {
            StructuralError::UnknownNode { .. } => "unknown-node",
            StructuralError::UnknownAnchor { .. } => "unknown-anchor",
            StructuralError::AnchorDirection { .. } => "direction",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["unknown-node", "unknown-anchor", "direction", "direction"]);
    assert!(report.errors.iter().all(|e| e.edge_id().is_some()));
}

#[test]
fn test_required_inputs_checked_only_for_supported_nodes() {
    let unknown = IrNode::new("mystery", "customWebhook")
        .with_input(Anchor::new("payload", "payload", "any").required());
    let graph = FlowGraph::new(vec![unknown], vec![]);

    let report = analyze(&graph, &registry());
    assert!(!report.is_fatal());
    assert_eq!(report.coverage.unsupported_types, vec!["customWebhook"]);
}

#[test]
fn test_cycle_paths_are_closed() {
    let graph = FlowGraph::new(
        vec![llm_chain("a"), llm_chain("b")],
        vec![connect("a", "b", "prompt"), connect("b", "a", "prompt")],
    );
    let cycles = detect_cycles(&graph);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].path, vec!["a", "b", "a"]);
}

#[test]
fn test_deprecated_and_version_warnings() {
    let agent = IrNode::new("legacy", "mrklAgentChat");
    let chain = llm_chain("chain").with_version("7");
    let graph = FlowGraph::new(
        vec![agent, chain, prompt("prompt", "{input}"), model("llm")],
        vec![connect("prompt", "chain", "prompt"), connect("llm", "chain", "model")],
    );

    let report = analyze(&graph, &registry());
    assert_eq!(
        report.warnings,
        vec![
            Warning::Deprecated {
                node_id: "legacy".to_string(),
                node_type: "mrklAgentChat".to_string(),
                replacement: Some("toolAgent".to_string()),
            },
            Warning::VersionMismatch {
                node_id: "chain".to_string(),
                node_type: "llmChain".to_string(),
                version: "7".to_string(),
                supported: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            },
        ]
    );
}

#[test]
fn test_swapped_wiring_produces_type_hints() {
    let graph = FlowGraph::new(
        vec![prompt("prompt", "{input}"), model("llm"), llm_chain("chain")],
        vec![connect("prompt", "chain", "model"), connect("llm", "chain", "prompt")],
    );
    let report = analyze(&graph, &registry());
    assert!(!report.is_fatal());
    let hints = report
        .warnings
        .iter()
        .filter(|w| matches!(w, Warning::TypeHint { .. }))
        .count();
    assert_eq!(hints, 2);
}

#[test]
fn test_report_formatter_summarises_findings() {
    let mut nodes = create_prompt_chain_flow().nodes().to_vec();
    nodes.push(IrNode::new("hook", "customWebhook"));
    let graph = FlowGraph::new(nodes, create_prompt_chain_flow().edges().to_vec());

    let text = ReportFormatter::format_report(&analyze(&graph, &registry()));
    assert!(text.starts_with("Conversion: OK (with warnings)\n"));
    assert!(text.contains("Coverage: 3/4 nodes (75%)"));
    assert!(text.contains("[coverage] no converter for node type 'customWebhook' (nodes: hook)"));
}
