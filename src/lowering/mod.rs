//! Turns analysed nodes into positioned code fragments.
//!
//! The engine computes the emission order once, binds every node to a
//! variable and its upstream variables, then dispatches each node to its
//! converter. Lowering may run on the rayon pool; results are always joined
//! back in emission order, so the output does not depend on scheduling.
//!
//! A node that produces no code declares nothing. Its consumers are lowered
//! again without it, and fail in turn if it fed a required input.

mod naming;
mod order;

pub use naming::{assign_names, companion_name, entry_point_name, NodeNames};
pub use order::{emission_order, EmissionOrder};

use crate::context::GenerationContext;
use crate::converters::support;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment, FragmentKind, ImportSpec};
use crate::ir::FlowGraph;
use crate::registry::{BoundNode, ConverterRegistry};
use crate::report::{ConversionReport, Warning};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Package that provides run tracing for generated programs.
pub const TRACING_PACKAGE: &str = "langsmith";
const TRACING_ENV: &str = "LANGCHAIN_TRACING_V2";

/// A fragment tagged with its sort keys.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedFragment {
    pub fragment: CodeFragment,
    /// Index of the producing node in the emission order; 0 for cross-cutting fragments.
    pub order: usize,
    /// Effective priority bucket after lifting.
    pub bucket: i32,
}

/// Everything the emitter needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoweredFlow {
    pub fragments: Vec<PositionedFragment>,
    /// Packages declared by converters for the nodes that lowered successfully.
    pub dependencies: BTreeSet<String>,
}

type NodeResult = Option<Result<Vec<CodeFragment>, ConverterError>>;

pub struct LoweringEngine<'r> {
    registry: &'r ConverterRegistry,
    parallel: bool,
}

impl<'r> LoweringEngine<'r> {
    pub fn new(registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn emission_order(&self, graph: &FlowGraph) -> EmissionOrder {
        emission_order(graph)
    }

    /// Lowers every supported node. Converter failures become `LoweringFailed`
    /// warnings; cycle fallbacks become one `CycleFallback` warning.
    pub fn lower(
        &self,
        graph: &FlowGraph,
        ctx: &GenerationContext,
        report: &mut ConversionReport,
    ) -> LoweredFlow {
        let order = self.emission_order(graph);
        if order.has_fallback() {
            let node_ids: Vec<String> = order
                .fallback
                .iter()
                .map(|&p| graph.nodes()[p].id.clone())
                .collect();
            tracing::warn!(nodes = ?node_ids, "cycle members placed in document order");
            report.push_warning(Warning::CycleFallback { node_ids });
        }

        let companions: Vec<Vec<&str>> = graph
            .nodes()
            .iter()
            .map(|node| {
                self.registry
                    .resolve(node)
                    .map(|c| c.companions())
                    .unwrap_or_default()
            })
            .collect();
        let names = assign_names(graph, ctx, &companions);
        let sources = upstream_sources(graph);
        let consumed = consumed_nodes(graph);
        let binder = Binder {
            graph,
            names: &names,
            sources: &sources,
            consumed: &consumed,
        };
        let results = self.convert_all(&binder, ctx, &order);

        let mut lowered = LoweredFlow::default();
        lowered.fragments.extend(cross_cutting(ctx));
        if ctx.features.tracing {
            lowered.dependencies.insert(TRACING_PACKAGE.to_string());
        }

        let predecessors = predecessors(graph);
        let mut node_bucket = vec![priority::IMPORT; graph.node_count()];
        let mut dropped = vec![false; graph.node_count()];

        for (rank, (&position, result)) in order.nodes.iter().zip(results).enumerate() {
            let node = &graph.nodes()[position];
            let upstream = predecessors[position]
                .iter()
                .map(|&p| node_bucket[p])
                .max()
                .unwrap_or(priority::IMPORT);
            node_bucket[position] = upstream;

            let missing = binder.dropped_upstream(position, &dropped);
            let result = if missing.is_empty() {
                result
            } else {
                let ids: Vec<&str> = missing.iter().map(|&p| graph.nodes()[p].id.as_str()).collect();
                tracing::debug!(node = %node.id, upstream = ?ids, "rebinding without dropped upstream nodes");
                self.convert_one(&binder, ctx, position, &dropped).map(|converted| {
                    converted.map_err(|error| {
                        ConverterError::Custom(format!(
                            "{} (upstream {} produced no code)",
                            error,
                            ids.join(", ")
                        ))
                    })
                })
            };

            let fragments = match result {
                None => {
                    tracing::debug!(node = %node.id, node_type = %node.node_type, "no converter, skipped");
                    dropped[position] = true;
                    continue;
                }
                Some(Err(error)) => {
                    tracing::warn!(node = %node.id, %error, "converter failed");
                    report.push_warning(Warning::LoweringFailed {
                        node_id: node.id.clone(),
                        node_type: node.node_type.clone(),
                        message: error.to_string(),
                    });
                    dropped[position] = true;
                    continue;
                }
                Some(Ok(fragments)) => fragments,
            };

            if let Some(converter) = self.registry.resolve(node) {
                lowered.dependencies.extend(converter.dependencies(node, ctx));
            }
            for fragment in fragments {
                let bucket = match fragment.kind {
                    FragmentKind::Import | FragmentKind::Execution => fragment.priority,
                    _ => fragment.priority.max(upstream),
                };
                if !matches!(fragment.kind, FragmentKind::Import | FragmentKind::Execution) {
                    node_bucket[position] = node_bucket[position].max(bucket);
                }
                lowered.fragments.push(PositionedFragment {
                    fragment,
                    order: rank,
                    bucket,
                });
            }
        }

        tracing::debug!(
            fragments = lowered.fragments.len(),
            dependencies = lowered.dependencies.len(),
            "lowering finished"
        );
        lowered
    }

    fn convert_all(
        &self,
        binder: &Binder<'_>,
        ctx: &GenerationContext,
        order: &EmissionOrder,
    ) -> Vec<NodeResult> {
        let nothing_dropped = vec![false; binder.graph.node_count()];
        if self.parallel {
            order
                .nodes
                .par_iter()
                .map(|&position| self.convert_one(binder, ctx, position, &nothing_dropped))
                .collect()
        } else {
            order
                .nodes
                .iter()
                .map(|&position| self.convert_one(binder, ctx, position, &nothing_dropped))
                .collect()
        }
    }

    fn convert_one(
        &self,
        binder: &Binder<'_>,
        ctx: &GenerationContext,
        position: usize,
        dropped: &[bool],
    ) -> NodeResult {
        let node = &binder.graph.nodes()[position];
        let converter = self.registry.resolve(node)?;
        tracing::debug!(node = %node.id, node_type = %node.node_type, "lowering node");
        Some(
            binder
                .bind(position, dropped)
                .and_then(|bound| converter.convert(&bound, ctx)),
        )
    }
}

/// Everything needed to bind a node, shared by every conversion of a run.
struct Binder<'g> {
    graph: &'g FlowGraph,
    names: &'g [NodeNames],
    /// Input anchor name to upstream positions, per node, in document order.
    sources: &'g [BTreeMap<String, Vec<usize>>],
    consumed: &'g [bool],
}

impl<'g> Binder<'g> {
    /// Upstream positions of `position` that produced no code.
    fn dropped_upstream(&self, position: usize, dropped: &[bool]) -> Vec<usize> {
        let upstream: BTreeSet<usize> = self.sources[position]
            .values()
            .flatten()
            .copied()
            .filter(|&p| p != position && dropped[p])
            .collect();
        upstream.into_iter().collect()
    }

    /// Binds a node to its names and to the variables of every upstream node
    /// that was not dropped. A required input left with nothing connected
    /// after dropping is a `MissingInput` error.
    fn bind(&self, position: usize, dropped: &[bool]) -> Result<BoundNode<'g>, ConverterError> {
        let node = &self.graph.nodes()[position];
        let names = &self.names[position];
        let mut inputs = BTreeMap::new();
        for (anchor, upstream) in &self.sources[position] {
            let variables: Vec<String> = upstream
                .iter()
                .filter(|&&p| !dropped[p])
                .map(|&p| self.names[p].variable.clone())
                .collect();
            if variables.is_empty() {
                let required = node.inputs.iter().any(|a| &a.name == anchor && a.required);
                if required {
                    return Err(ConverterError::MissingInput {
                        node_id: node.id.clone(),
                        anchor: anchor.clone(),
                    });
                }
                continue;
            }
            inputs.insert(anchor.clone(), variables);
        }

        let bound = BoundNode::new(
            node,
            names.variable.clone(),
            inputs,
            !self.consumed[position],
        )
        .with_entry_point(names.entry_point.clone());
        Ok(names
            .companions
            .iter()
            .fold(bound, |bound, (suffix, name)| bound.with_companion(suffix, name.clone())))
    }
}

/// Input anchor name to upstream positions, per node. Upstream positions are
/// listed in document order.
fn upstream_sources(graph: &FlowGraph) -> Vec<BTreeMap<String, Vec<usize>>> {
    let mut sources: Vec<BTreeMap<String, BTreeSet<usize>>> =
        vec![BTreeMap::new(); graph.node_count()];
    for resolved in graph.resolved_edges() {
        sources[resolved.target]
            .entry(resolved.target_anchor.name.clone())
            .or_default()
            .insert(resolved.source);
    }
    sources
        .into_iter()
        .map(|anchors| {
            anchors
                .into_iter()
                .map(|(anchor, upstream)| (anchor, upstream.into_iter().collect()))
                .collect()
        })
        .collect()
}

/// Whether anything consumes each node's output, by document position.
fn consumed_nodes(graph: &FlowGraph) -> Vec<bool> {
    let mut consumed = vec![false; graph.node_count()];
    for resolved in graph.resolved_edges() {
        if resolved.source != resolved.target {
            consumed[resolved.source] = true;
        }
    }
    consumed
}

fn predecessors(graph: &FlowGraph) -> Vec<Vec<usize>> {
    let mut predecessors = vec![Vec::new(); graph.node_count()];
    for (source, targets) in graph.adjacency().into_iter().enumerate() {
        for target in targets {
            if source != target {
                predecessors[target].push(source);
            }
        }
    }
    predecessors
}

/// Environment setup and tracing integration. Neither belongs to a node.
fn cross_cutting(ctx: &GenerationContext) -> Vec<PositionedFragment> {
    let mut env = ctx.env.clone();
    if ctx.features.tracing {
        env.entry(TRACING_ENV.to_string())
            .or_insert_with(|| "true".to_string());
    }
    if env.is_empty() {
        return Vec::new();
    }

    let lines: Vec<String> = env
        .iter()
        .map(|(key, value)| {
            if ctx.is_python() {
                format!("os.environ.setdefault({}, {})", ctx.quote(key), ctx.quote(value))
            } else {
                format!(
                    "{} ??= {}{}",
                    support::env_access(ctx, key),
                    ctx.quote(value),
                    ctx.terminator()
                )
            }
        })
        .collect();
    let mut setup = CodeFragment::new("env:setup", FragmentKind::Declaration, priority::ENVIRONMENT)
        .with_content(lines.join("\n"));
    if ctx.features.tracing {
        setup = setup.requiring(TRACING_PACKAGE);
    }

    let mut fragments = Vec::new();
    if ctx.is_python() {
        fragments.push(PositionedFragment {
            fragment: CodeFragment::new("env:import", FragmentKind::Import, priority::IMPORT)
                .with_import(ImportSpec::side_effect("os")),
            order: 0,
            bucket: priority::IMPORT,
        });
    }
    fragments.push(PositionedFragment {
        fragment: setup,
        order: 0,
        bucket: priority::ENVIRONMENT,
    });
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Anchor, Edge, IrNode};

    fn chain_as_tool() -> FlowGraph {
        chain_as_tool_with_prompt("promptTemplate")
    }

    fn chain_as_tool_with_prompt(prompt_type: &str) -> FlowGraph {
        FlowGraph::new(
            vec![
                IrNode::new("tool", "chainTool")
                    .with_param("name", "summarise")
                    .with_param("description", "Summarises text")
                    .with_input(Anchor::new("baseChain", "baseChain", "BaseChain").required())
                    .with_output(Anchor::new("out", "tool", "Tool")),
                IrNode::new("chain", "llmChain")
                    .with_input(Anchor::new("model", "model", "BaseChatModel").required())
                    .with_input(Anchor::new("prompt", "prompt", "BasePromptTemplate").required())
                    .with_output(Anchor::new("out", "chain", "BaseChain")),
                IrNode::new("llm", "chatOpenAI").with_output(Anchor::new("out", "llm", "BaseChatModel")),
                IrNode::new("prompt", prompt_type)
                    .with_param("template", "Summarise: {input}")
                    .with_output(Anchor::new("out", "prompt", "BasePromptTemplate")),
            ],
            vec![
                Edge::new(("llm", "out"), ("chain", "model")),
                Edge::new(("prompt", "out"), ("chain", "prompt")),
                Edge::new(("chain", "out"), ("tool", "baseChain")),
            ],
        )
    }

    #[test]
    fn downstream_utility_is_lifted_into_upstream_bucket() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = chain_as_tool();
        let mut report = ConversionReport::default();
        let lowered = LoweringEngine::new(&registry).lower(&graph, &GenerationContext::default(), &mut report);

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        let bucket_of = |id: &str| {
            lowered
                .fragments
                .iter()
                .find(|f| f.fragment.id == id)
                .map(|f| (f.bucket, f.order))
                .expect("fragment present")
        };
        assert_eq!(bucket_of("llm:init"), (priority::MODEL, 0));
        assert_eq!(bucket_of("prompt:init"), (priority::UTILITY, 1));
        assert_eq!(bucket_of("chain:init"), (priority::CHAIN, 2));
        assert_eq!(bucket_of("tool:init"), (priority::CHAIN, 3));
        assert!(lowered.dependencies.contains("@langchain/openai"));
    }

    #[test]
    fn parallel_lowering_matches_sequential() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = chain_as_tool();
        let ctx = GenerationContext::default();
        let sequential = LoweringEngine::new(&registry).lower(&graph, &ctx, &mut ConversionReport::default());
        let parallel = LoweringEngine::new(&registry)
            .parallel(true)
            .lower(&graph, &ctx, &mut ConversionReport::default());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn tracing_adds_environment_setup_and_package() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let ctx = GenerationContext::builder()
            .tracing(true)
            .env("LANGCHAIN_PROJECT", "demo")
            .build();
        let lowered = LoweringEngine::new(&registry).lower(
            &FlowGraph::default(),
            &ctx,
            &mut ConversionReport::default(),
        );
        assert_eq!(lowered.fragments.len(), 1);
        assert_eq!(
            lowered.fragments[0].fragment.content,
            "process.env.LANGCHAIN_PROJECT ??= \"demo\";\nprocess.env.LANGCHAIN_TRACING_V2 ??= \"true\";"
        );
        assert!(lowered.dependencies.contains(TRACING_PACKAGE));
    }

    #[test]
    fn environment_keys_that_are_not_identifiers_use_index_access() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let ctx = GenerationContext::builder().env("MY-VAR", "x").build();
        let lowered = LoweringEngine::new(&registry).lower(
            &FlowGraph::default(),
            &ctx,
            &mut ConversionReport::default(),
        );
        assert_eq!(lowered.fragments[0].fragment.content, "process.env[\"MY-VAR\"] ??= \"x\";");
    }

    #[test]
    fn consumers_of_a_dropped_required_input_fail_in_turn() {
        let registry = ConverterRegistry::with_defaults().expect("defaults");
        let graph = chain_as_tool_with_prompt("mysteryPrompt");
        let mut report = ConversionReport::default();
        let lowered = LoweringEngine::new(&registry).lower(&graph, &GenerationContext::default(), &mut report);

        let failed: Vec<(&str, &str)> = report
            .warnings
            .iter()
            .filter_map(|w| match w {
                Warning::LoweringFailed { node_id, message, .. } => Some((node_id.as_str(), message.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            failed,
            vec![
                ("chain", "Node 'chain' has nothing connected to input 'prompt' (upstream prompt produced no code)"),
                ("tool", "Node 'tool' has nothing connected to input 'baseChain' (upstream chain produced no code)"),
            ]
        );
        let ids: Vec<&str> = lowered.fragments.iter().map(|f| f.fragment.id.as_str()).collect();
        assert!(ids.iter().all(|id| id.starts_with("llm:")), "{:?}", ids);
    }
}
