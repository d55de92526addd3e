use crate::ir::FlowGraph;
use crate::report::Complexity;

const SIMPLE_MAX: usize = 5;
const MODERATE_MAX: usize = 15;

/// Coarse size class from `node_count + edge_count`. Informational only.
pub fn classify_complexity(graph: &FlowGraph) -> Complexity {
    match graph.node_count() + graph.edge_count() {
        n if n <= SIMPLE_MAX => Complexity::Simple,
        n if n <= MODERATE_MAX => Complexity::Moderate,
        _ => Complexity::Complex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrNode;

    fn nodes(count: usize) -> FlowGraph {
        FlowGraph::new(
            (0..count).map(|i| IrNode::new(&format!("n{}", i), "x")).collect(),
            Vec::new(),
        )
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(classify_complexity(&nodes(0)), Complexity::Simple);
        assert_eq!(classify_complexity(&nodes(5)), Complexity::Simple);
        assert_eq!(classify_complexity(&nodes(6)), Complexity::Moderate);
        assert_eq!(classify_complexity(&nodes(15)), Complexity::Moderate);
        assert_eq!(classify_complexity(&nodes(16)), Complexity::Complex);
    }
}
