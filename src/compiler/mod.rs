//! The pipeline façade: analysis, lowering and emission behind one call.

use crate::analyzer;
use crate::context::GenerationContext;
use crate::document::{FlowDocument, IntoFlowDocument};
use crate::emitter::Emitter;
use crate::error::DocumentError;
use crate::ir::FlowGraph;
use crate::lowering::LoweringEngine;
use crate::registry::ConverterRegistry;
use crate::report::ConversionReport;
use serde::Serialize;
use std::sync::Arc;

/// The result of one conversion run.
///
/// `source` is `None` exactly when the report carries a structural error.
/// A present `source` can still come with warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutput {
    pub source: Option<String>,
    pub tests: Option<String>,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub report: ConversionReport,
}

impl ConversionOutput {
    pub fn is_success(&self) -> bool {
        self.source.is_some()
    }
}

/// Converts flow graphs into source modules.
///
/// A compiler only holds a shared, read-only registry, so one instance (or many
/// clones of the same `Arc`) can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<ConverterRegistry>,
    parallel: bool,
}

pub struct CompilerBuilder {
    registry: Arc<ConverterRegistry>,
    parallel: bool,
}

impl CompilerBuilder {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Lowers independent nodes on the rayon pool. The output is identical either way.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            registry: self.registry,
            parallel: self.parallel,
        }
    }
}

impl Compiler {
    pub fn builder(registry: Arc<ConverterRegistry>) -> CompilerBuilder {
        CompilerBuilder::new(registry)
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Analyses, lowers and emits a graph. Structural errors stop the run
    /// before lowering and leave `source` empty.
    pub fn convert(&self, graph: &FlowGraph, ctx: &GenerationContext) -> ConversionOutput {
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            target = %ctx.target,
            "converting flow"
        );

        let mut report = analyzer::analyze(graph, &self.registry);
        if report.is_fatal() {
            return ConversionOutput {
                report,
                ..ConversionOutput::default()
            };
        }

        let lowered = LoweringEngine::new(&self.registry)
            .parallel(self.parallel)
            .lower(graph, ctx, &mut report);
        let emitted = Emitter::new(ctx).emit(&lowered);

        tracing::info!(
            warnings = report.warnings.len(),
            dependencies = emitted.dependencies.len(),
            "conversion finished"
        );
        ConversionOutput {
            source: Some(emitted.source),
            tests: emitted.tests,
            dependencies: emitted.dependencies,
            dev_dependencies: emitted.dev_dependencies,
            report,
        }
    }

    pub fn convert_document(
        &self,
        document: FlowDocument,
        ctx: &GenerationContext,
    ) -> ConversionOutput {
        self.convert(&FlowGraph::from_document(document), ctx)
    }

    /// Converts any format that can be turned into a flow document.
    pub fn convert_custom<T: IntoFlowDocument>(
        &self,
        data: T,
        ctx: &GenerationContext,
    ) -> Result<ConversionOutput, DocumentError> {
        Ok(self.convert_document(data.into_flow_document()?, ctx))
    }
}
