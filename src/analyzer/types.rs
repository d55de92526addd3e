use crate::ir::{Anchor, FlowGraph};
use crate::report::Warning;

/// Flags edges whose anchor type unions share no member. Empty types and
/// `any` match everything. The result is a hint only; conversion is unaffected.
pub fn check_type_hints(graph: &FlowGraph) -> Vec<Warning> {
    graph
        .resolved_edges()
        .into_iter()
        .filter_map(|resolved| {
            let source = graph.nodes()[resolved.source]
                .output_anchor(&resolved.edge.source_anchor_id)?;
            let target = resolved.target_anchor;
            if compatible(source, target) {
                None
            } else {
                Some(Warning::TypeHint {
                    edge_id: resolved.edge.id.clone(),
                    source_type: source.data_type.clone(),
                    target_type: target.data_type.clone(),
                })
            }
        })
        .collect()
}

fn is_wildcard(anchor: &Anchor) -> bool {
    anchor.type_members().next().is_none()
        || anchor.type_members().any(|t| t.eq_ignore_ascii_case("any"))
}

fn compatible(source: &Anchor, target: &Anchor) -> bool {
    if is_wildcard(source) || is_wildcard(target) {
        return true;
    }
    source
        .type_members()
        .any(|s| target.type_members().any(|t| t == s))
}
