//! Static analysis of a flow graph before any code is generated.
//!
//! Structural problems are fatal and stop the pipeline. Everything else
//! (cycles, unsupported types, version and type findings) is a warning and
//! conversion carries on for whatever can be converted.

mod complexity;
mod coverage;
mod cycles;
mod structure;
mod types;

pub use complexity::classify_complexity;
pub use coverage::{check_required_inputs, check_versions, resolve_converters, unsupported_type_warnings};
pub use cycles::{detect_cycles, Cycle};
pub use structure::validate_structure;
pub use types::check_type_hints;

use crate::ir::FlowGraph;
use crate::registry::ConverterRegistry;
use crate::report::{ConversionReport, FlowMetrics, Warning};

/// Runs every check and collects the findings into one report.
pub fn analyze(graph: &FlowGraph, registry: &ConverterRegistry) -> ConversionReport {
    let mut report = validate_structure(graph);
    report.metrics = FlowMetrics {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
    };
    report.complexity = classify_complexity(graph);
    report.coverage = resolve_converters(graph, registry);

    // Missing-input checks only make sense once every edge resolves.
    if !report.is_fatal() {
        report.errors.extend(check_required_inputs(graph, registry));
    }
    if report.is_fatal() {
        tracing::warn!(errors = report.errors.len(), "flow is structurally invalid");
        return report;
    }

    for cycle in detect_cycles(graph) {
        tracing::warn!(path = ?cycle.path, "cycle detected");
        report.push_warning(Warning::Cycle { path: cycle.path });
    }
    report
        .warnings
        .extend(unsupported_type_warnings(graph, &report.coverage));
    report.warnings.extend(check_versions(graph, registry));
    report.warnings.extend(check_type_hints(graph));

    tracing::debug!(
        nodes = report.metrics.node_count,
        edges = report.metrics.edge_count,
        complexity = %report.complexity,
        coverage = report.coverage.ratio(),
        warnings = report.warnings.len(),
        "analysis finished"
    );
    report
}
