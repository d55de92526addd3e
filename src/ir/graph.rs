use super::node::{Anchor, IrNode};
use ahash::AHashMap;
use serde::Serialize;

/// A directed connection from an output anchor to an input anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source_node_id: String,
    pub source_anchor_id: String,
    pub target_node_id: String,
    pub target_anchor_id: String,
}

impl Edge {
    pub fn new(source: (&str, &str), target: (&str, &str)) -> Self {
        Self {
            id: format!("{}-{}->{}-{}", source.0, source.1, target.0, target.1),
            source_node_id: source.0.to_string(),
            source_anchor_id: source.1.to_string(),
            target_node_id: target.0.to_string(),
            target_anchor_id: target.1.to_string(),
        }
    }
}

/// An edge whose endpoints both resolve to declared nodes and anchors.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEdge<'a> {
    pub edge: &'a Edge,
    pub source: usize,
    pub target: usize,
    pub target_anchor: &'a Anchor,
}

/// Nodes in document order plus the edge list.
///
/// The document order of `nodes` is the tie-break for every deterministic sort
/// in the pipeline. Duplicate ids are kept so the analyzer can report them;
/// lookups by id return the first occurrence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowGraph {
    nodes: Vec<IrNode>,
    edges: Vec<Edge>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<IrNode>, edges: Vec<Edge>) -> Self {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(position);
        }
        Self {
            nodes,
            edges,
            index,
        }
    }

    pub fn nodes(&self) -> &[IrNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&IrNode> {
        self.position(id).map(|i| &self.nodes[i])
    }

    /// Document position of the first node with this id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Resolves both endpoints of an edge, or `None` if any part is dangling.
    pub fn resolve<'a>(&'a self, edge: &'a Edge) -> Option<ResolvedEdge<'a>> {
        let source = self.position(&edge.source_node_id)?;
        let target = self.position(&edge.target_node_id)?;
        self.nodes[source].output_anchor(&edge.source_anchor_id)?;
        let target_anchor = self.nodes[target].input_anchor(&edge.target_anchor_id)?;
        Some(ResolvedEdge {
            edge,
            source,
            target,
            target_anchor,
        })
    }

    /// All edges that fully resolve, in edge-list order.
    pub fn resolved_edges(&self) -> Vec<ResolvedEdge<'_>> {
        self.edges.iter().filter_map(|e| self.resolve(e)).collect()
    }

    /// Successor lists by document position, from resolved edges. Parallel edges collapse.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for resolved in self.resolved_edges() {
            let successors: &mut Vec<usize> = &mut adjacency[resolved.source];
            if !successors.contains(&resolved.target) {
                successors.push(resolved.target);
            }
        }
        adjacency
    }
}
