use super::definition::FlowDocument;
use crate::error::DocumentError;

/// A trait for editor exports and other custom data models that can be
/// converted into a canonical `FlowDocument`.
///
/// This is the extension point that keeps the compiler independent of any one
/// editor's file format. Implement it on the structs you deserialize your
/// format into and hand the result to `FlowGraph::from_document`.
///
/// # Example
///
/// ```rust,no_run
/// use flow2code::document::{FlowDocument, IntoFlowDocument, NodeDefinition};
/// use flow2code::error::DocumentError;
///
/// struct MyBlock { key: String, kind: String }
/// struct MyCanvas { blocks: Vec<MyBlock> }
///
/// impl IntoFlowDocument for MyCanvas {
///     fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
///         let nodes = self
///             .blocks
///             .into_iter()
///             .map(|b| NodeDefinition { id: b.key, node_type: b.kind, ..Default::default() })
///             .collect();
///         Ok(FlowDocument { nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoFlowDocument {
    /// Consumes the object and converts it into a canonical flow document.
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError>;
}

impl IntoFlowDocument for FlowDocument {
    fn into_flow_document(self) -> Result<FlowDocument, DocumentError> {
        Ok(self)
    }
}
