use serde::Serialize;
use thiserror::Error;

/// Fatal problems with the shape of a flow graph. Any of these stops the
/// pipeline before lowering begins.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StructuralError {
    #[error("Node id '{node_id}' is declared more than once")]
    DuplicateNodeId { node_id: String },

    #[error("Edge '{edge_id}' references node '{node_id}', which does not exist")]
    UnknownNode { edge_id: String, node_id: String },

    #[error("Edge '{edge_id}' references anchor '{anchor_id}', which is not declared on node '{node_id}'")]
    UnknownAnchor {
        edge_id: String,
        node_id: String,
        anchor_id: String,
    },

    #[error("Edge '{edge_id}' uses anchor '{anchor_id}' on node '{node_id}' in the wrong direction: {message}")]
    AnchorDirection {
        edge_id: String,
        node_id: String,
        anchor_id: String,
        message: String,
    },

    #[error("Input '{anchor}' on node '{node_id}' accepts a single connection, but {count} are connected")]
    ArityViolation {
        node_id: String,
        anchor: String,
        count: usize,
    },

    #[error("Required input '{anchor}' on node '{node_id}' has no incoming connection")]
    MissingRequiredInput { node_id: String, anchor: String },
}

impl StructuralError {
    /// The node the error is attached to, if any.
    pub fn node_id(&self) -> &str {
        match self {
            StructuralError::DuplicateNodeId { node_id }
            | StructuralError::UnknownNode { node_id, .. }
            | StructuralError::UnknownAnchor { node_id, .. }
            | StructuralError::AnchorDirection { node_id, .. }
            | StructuralError::ArityViolation { node_id, .. }
            | StructuralError::MissingRequiredInput { node_id, .. } => node_id,
        }
    }

    /// The edge the error is attached to, for edge-level violations.
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            StructuralError::UnknownNode { edge_id, .. }
            | StructuralError::UnknownAnchor { edge_id, .. }
            | StructuralError::AnchorDirection { edge_id, .. } => Some(edge_id),
            _ => None,
        }
    }
}

/// Errors a converter may raise while lowering a single node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConverterError {
    #[error("Node '{node_id}' is missing required parameter '{name}'")]
    MissingParameter { node_id: String, name: String },

    #[error("Parameter '{name}' on node '{node_id}' should be {expected}")]
    InvalidParameter {
        node_id: String,
        name: String,
        expected: String,
    },

    #[error("Node '{node_id}' has nothing connected to input '{anchor}'")]
    MissingInput { node_id: String, anchor: String },

    #[error("Converter for '{node_type}' cannot target {target}")]
    UnsupportedTarget { node_type: String, target: String },

    #[error("{0}")]
    Custom(String),
}

/// Configuration errors raised while building a `ConverterRegistry`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Node type '{0}' is claimed by more than one converter")]
    DuplicateType(String),

    #[error("Alias '{alias}' shadows a registered node type")]
    AliasShadowsType { alias: String },

    #[error("Alias '{alias}' is mapped to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Alias '{alias}' points to '{target}', which has no registered converter")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Errors that can occur when loading a flow document or converting a custom format into one.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}
