use crate::error::StructuralError;
use serde::Serialize;
use std::fmt;

mod formatter;

pub use formatter::ReportFormatter;

/// Coarse size classification of a flow, derived from `node_count + edge_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Moderate => write!(f, "moderate"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

/// Which node types of a flow have a registered converter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Coverage {
    /// Distinct supported types, sorted.
    pub supported_types: Vec<String>,
    /// Distinct unsupported types, in order of first appearance.
    pub unsupported_types: Vec<String>,
    pub supported_nodes: usize,
    pub total_nodes: usize,
}

impl Coverage {
    /// `supported_nodes / total_nodes`; an empty flow is fully covered.
    pub fn ratio(&self) -> f64 {
        if self.total_nodes == 0 {
            1.0
        } else {
            self.supported_nodes as f64 / self.total_nodes as f64
        }
    }
}

/// Non-fatal findings. None of these stop conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// A directed cycle, as the node-id path from its first repeated node back to itself.
    Cycle { path: Vec<String> },
    /// Nodes that could not be ordered topologically and were placed in document order.
    CycleFallback { node_ids: Vec<String> },
    /// A node type with no registered converter.
    UnsupportedType {
        type_name: String,
        node_ids: Vec<String>,
    },
    /// A converter failed for one node; that node contributes no code.
    LoweringFailed {
        node_id: String,
        node_type: String,
        message: String,
    },
    Deprecated {
        node_id: String,
        node_type: String,
        replacement: Option<String>,
    },
    VersionMismatch {
        node_id: String,
        node_type: String,
        version: String,
        supported: Vec<String>,
    },
    /// The anchor types on both ends of an edge share no member.
    TypeHint {
        edge_id: String,
        source_type: String,
        target_type: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Cycle { path } => write!(f, "cycle detected: {}", path.join(" -> ")),
            Warning::CycleFallback { node_ids } => write!(
                f,
                "nodes on a cycle were ordered by document position: {}",
                node_ids.join(", ")
            ),
            Warning::UnsupportedType {
                type_name,
                node_ids,
            } => write!(
                f,
                "no converter for node type '{}' (nodes: {})",
                type_name,
                node_ids.join(", ")
            ),
            Warning::LoweringFailed {
                node_id,
                node_type,
                message,
            } => write!(f, "failed to convert node '{}' ({}): {}", node_id, node_type, message),
            Warning::Deprecated {
                node_id,
                node_type,
                replacement,
            } => match replacement {
                Some(r) => write!(
                    f,
                    "node '{}' uses deprecated type '{}', use '{}' instead",
                    node_id, node_type, r
                ),
                None => write!(f, "node '{}' uses deprecated type '{}'", node_id, node_type),
            },
            Warning::VersionMismatch {
                node_id,
                node_type,
                version,
                supported,
            } => write!(
                f,
                "node '{}' ({}) declares version {}, supported: {}",
                node_id,
                node_type,
                version,
                supported.join(", ")
            ),
            Warning::TypeHint {
                edge_id,
                source_type,
                target_type,
            } => write!(
                f,
                "edge '{}' connects '{}' to '{}', which share no type",
                edge_id, source_type, target_type
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowMetrics {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Everything the pipeline found out about a flow.
///
/// Callers must check both the report and the emitted text: a successful
/// conversion only means the structure was valid, not that there were no warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    pub errors: Vec<StructuralError>,
    pub warnings: Vec<Warning>,
    pub coverage: Coverage,
    pub complexity: Complexity,
    pub metrics: FlowMetrics,
}

impl ConversionReport {
    /// `true` when a structural error prevents conversion.
    pub fn is_fatal(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: StructuralError) {
        self.errors.push(error);
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn cycles(&self) -> impl Iterator<Item = &[String]> {
        self.warnings.iter().filter_map(|w| match w {
            Warning::Cycle { path } => Some(path.as_slice()),
            _ => None,
        })
    }

    pub fn lowering_failures(&self) -> impl Iterator<Item = &Warning> {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::LoweringFailed { .. }))
    }
}
