use super::{ConversionReport, Warning};
use std::fmt::Write;

/// Formats a `ConversionReport` into a human-readable summary.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_report(report: &ConversionReport) -> String {
        let mut out = String::new();
        let status = if report.is_fatal() {
            "FAILED"
        } else if report.warnings.is_empty() {
            "OK"
        } else {
            "OK (with warnings)"
        };
        let _ = writeln!(out, "Conversion: {}", status);
        let _ = writeln!(
            out,
            "Flow: {} nodes, {} edges ({})",
            report.metrics.node_count, report.metrics.edge_count, report.complexity
        );
        let _ = writeln!(
            out,
            "Coverage: {}/{} nodes ({:.0}%)",
            report.coverage.supported_nodes,
            report.coverage.total_nodes,
            report.coverage.ratio() * 100.0
        );
        if !report.coverage.unsupported_types.is_empty() {
            let _ = writeln!(
                out,
                "Unsupported types: {}",
                report.coverage.unsupported_types.join(", ")
            );
        }

        if !report.errors.is_empty() {
            let _ = writeln!(out, "\nErrors:");
            for error in &report.errors {
                let _ = writeln!(out, "  - {}", error);
            }
        }
        if !report.warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings:");
            for warning in &report.warnings {
                let _ = writeln!(out, "  - [{}] {}", Self::label(warning), warning);
            }
        }
        out
    }

    fn label(warning: &Warning) -> &'static str {
        match warning {
            Warning::Cycle { .. } | Warning::CycleFallback { .. } => "cycle",
            Warning::UnsupportedType { .. } => "coverage",
            Warning::LoweringFailed { .. } => "lowering",
            Warning::Deprecated { .. } | Warning::VersionMismatch { .. } => "version",
            Warning::TypeHint { .. } => "types",
        }
    }
}
