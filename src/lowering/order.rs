use crate::ir::FlowGraph;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

const UNVISITED: usize = usize::MAX;

/// The order in which nodes are lowered, by document position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionOrder {
    /// Every node exactly once.
    pub nodes: Vec<usize>,
    /// Nodes on a cycle, placed by document order. Sorted ascending.
    pub fallback: Vec<usize>,
}

impl EmissionOrder {
    pub fn has_fallback(&self) -> bool {
        !self.fallback.is_empty()
    }
}

/// Topological order with document-order tie-breaks.
///
/// Nodes are grouped into strongly connected components first. The acyclic
/// condensation is sorted with Kahn's algorithm, always releasing the ready
/// component whose earliest member comes first in the document. Members of a
/// component are emitted in document order, which is exact for single nodes and
/// the fallback for cycles.
pub fn emission_order(graph: &FlowGraph) -> EmissionOrder {
    let adjacency = graph.adjacency();
    let components = strongly_connected(&adjacency);

    let mut component_of = vec![0; adjacency.len()];
    for (index, members) in components.iter().enumerate() {
        for &member in members {
            component_of[member] = index;
        }
    }

    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
    let mut indegree = vec![0usize; components.len()];
    for (node, targets) in adjacency.iter().enumerate() {
        for &target in targets {
            let (from, to) = (component_of[node], component_of[target]);
            if from != to && successors[from].insert(to) {
                indegree[to] += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = components
        .iter()
        .enumerate()
        .filter(|(index, _)| indegree[*index] == 0)
        .map(|(index, members)| Reverse((members[0], index)))
        .collect();

    let mut nodes = Vec::with_capacity(adjacency.len());
    while let Some(Reverse((_, index))) = ready.pop() {
        nodes.extend_from_slice(&components[index]);
        for &next in &successors[index] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(Reverse((components[next][0], next)));
            }
        }
    }

    let mut fallback: Vec<usize> = components
        .iter()
        .filter(|members| members.len() > 1 || adjacency[members[0]].contains(&members[0]))
        .flatten()
        .copied()
        .collect();
    fallback.sort_unstable();

    EmissionOrder { nodes, fallback }
}

/// Iterative Tarjan. Each component's members are sorted by document position.
fn strongly_connected(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let count = adjacency.len();
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0; count];
    let mut on_stack = vec![false; count];
    let mut stack = Vec::new();
    let mut components = Vec::new();
    let mut counter = 0;

    for root in 0..count {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = counter;
        lowlink[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;
        let mut calls: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = calls.last_mut() {
            let node = frame.0;
            if let Some(&next) = adjacency[node].get(frame.1) {
                frame.1 += 1;
                if index[next] == UNVISITED {
                    index[next] = counter;
                    lowlink[next] = counter;
                    counter += 1;
                    stack.push(next);
                    on_stack[next] = true;
                    calls.push((next, 0));
                } else if on_stack[next] {
                    lowlink[node] = lowlink[node].min(index[next]);
                }
                continue;
            }

            calls.pop();
            if let Some(&(parent, _)) = calls.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[node]);
            }
            if lowlink[node] == index[node] {
                let mut component = Vec::new();
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component.push(member);
                    if member == node {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Anchor, Edge, IrNode};

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> FlowGraph {
        FlowGraph::new(
            ids.iter()
                .map(|id| {
                    IrNode::new(id, "x")
                        .with_input(Anchor::new("in", "in", "any").list())
                        .with_output(Anchor::new("out", "out", "any"))
                })
                .collect(),
            edges
                .iter()
                .map(|&(s, t)| Edge::new((s, "out"), (t, "in")))
                .collect(),
        )
    }

    #[test]
    fn consumers_follow_producers_regardless_of_document_order() {
        // chain is declared first but consumes both others.
        let g = graph(&["chain", "llm", "prompt"], &[("llm", "chain"), ("prompt", "chain")]);
        let order = emission_order(&g);
        assert_eq!(order.nodes, vec![1, 2, 0]);
        assert!(!order.has_fallback());
    }

    #[test]
    fn independent_nodes_keep_document_order() {
        let g = graph(&["c", "b", "a"], &[]);
        assert_eq!(emission_order(&g).nodes, vec![0, 1, 2]);
    }

    #[test]
    fn cycle_members_fall_back_to_document_order() {
        // x -> a <-> b -> y
        let g = graph(
            &["y", "b", "a", "x"],
            &[("x", "a"), ("a", "b"), ("b", "a"), ("b", "y")],
        );
        let order = emission_order(&g);
        assert_eq!(order.nodes, vec![3, 1, 2, 0]);
        assert_eq!(order.fallback, vec![1, 2]);
    }

    #[test]
    fn self_loop_is_a_fallback() {
        let g = graph(&["a"], &[("a", "a")]);
        assert_eq!(emission_order(&g).fallback, vec![0]);
    }
}
