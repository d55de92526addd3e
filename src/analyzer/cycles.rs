use crate::ir::FlowGraph;
use serde::Serialize;

/// A directed cycle as a node-id path that starts and ends on the same node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub path: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Colour {
    Unvisited,
    InProgress,
    Done,
}

/// Finds cycles with an iterative three-colour depth-first search.
///
/// Roots are visited in document order and successors in edge order, so the
/// result is deterministic. Each back-edge `u -> v` yields one cycle: the DFS
/// stack from `v` up to `u`, closed with `v`. A mutual pair `A <-> B` is
/// therefore reported once as `[A, B, A]`. Acyclic graphs yield nothing.
pub fn detect_cycles(graph: &FlowGraph) -> Vec<Cycle> {
    let adjacency = graph.adjacency();
    let nodes = graph.nodes();
    let mut colour = vec![Colour::Unvisited; nodes.len()];
    let mut cycles = Vec::new();

    for root in 0..nodes.len() {
        if colour[root] != Colour::Unvisited {
            continue;
        }
        // (node, index of the next successor to explore)
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        colour[root] = Colour::InProgress;

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let Some(&successor) = adjacency[node].get(next) else {
                colour[node] = Colour::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match colour[successor] {
                Colour::Unvisited => {
                    colour[successor] = Colour::InProgress;
                    stack.push((successor, 0));
                }
                Colour::InProgress => {
                    let start = stack
                        .iter()
                        .position(|&(n, _)| n == successor)
                        .unwrap_or(0);
                    let mut path: Vec<String> = stack[start..]
                        .iter()
                        .map(|&(n, _)| nodes[n].id.clone())
                        .collect();
                    path.push(nodes[successor].id.clone());
                    cycles.push(Cycle { path });
                }
                Colour::Done => {}
            }
        }
    }

    tracing::debug!(count = cycles.len(), "cycle detection finished");
    cycles
}
