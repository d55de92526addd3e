use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::CodeFragment;
use crate::ir::IrNode;
use crate::lowering::{companion_name, entry_point_name};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Defines the contract for lowering one kind of node into code fragments.
///
/// A converter is a capability, not a base class: shared behaviour such as
/// parameter extraction lives in free functions (see `converters::support`).
/// `convert` must be a pure function of the node, its bindings and the
/// context; converters are shared read-only across concurrent runs.
pub trait Converter: Send + Sync {
    /// Node-type identifiers this converter is registered under. A converter
    /// may claim a whole family of related types.
    fn node_types(&self) -> Vec<&str>;

    /// Guard applied after the registry has matched the node's type, directly
    /// or through an alias. Override to refuse individual nodes of a family.
    fn can_convert(&self, _node: &IrNode) -> bool {
        true
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError>;

    /// Packages the generated code for this node depends on.
    fn dependencies(&self, node: &IrNode, ctx: &GenerationContext) -> Vec<String>;

    /// Suffixes of the helper variables `convert` declares next to the node's
    /// own. The lowering engine reserves a unique name for each one; read it
    /// back with [`BoundNode::companion`].
    fn companions(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Node schema versions this converter understands. Empty means any.
    fn supported_versions(&self) -> Vec<&str> {
        Vec::new()
    }

    fn is_deprecated(&self) -> bool {
        false
    }

    fn replacement_type(&self) -> Option<&str> {
        None
    }
}

/// A node together with what the lowering engine knows about its surroundings:
/// the variable it is bound to, the variables connected to each input anchor
/// and whether anything consumes its output.
#[derive(Debug, Clone)]
pub struct BoundNode<'a> {
    node: &'a IrNode,
    variable: String,
    inputs: BTreeMap<String, Vec<String>>,
    terminal: bool,
    entry_point: Option<String>,
    companions: BTreeMap<String, String>,
}

impl<'a> BoundNode<'a> {
    /// `inputs` maps input anchor names to upstream variable names, in
    /// document order of the upstream nodes.
    pub fn new(
        node: &'a IrNode,
        variable: impl Into<String>,
        inputs: BTreeMap<String, Vec<String>>,
        terminal: bool,
    ) -> Self {
        Self {
            node,
            variable: variable.into(),
            inputs,
            terminal,
            entry_point: None,
            companions: BTreeMap::new(),
        }
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    pub fn with_companion(mut self, suffix: &str, name: impl Into<String>) -> Self {
        self.companions.insert(suffix.to_string(), name.into());
        self
    }

    pub fn node(&self) -> &'a IrNode {
        self.node
    }

    /// Identifier the node's value is bound to in generated code.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// All variables connected to an input anchor.
    pub fn inputs(&self, anchor: &str) -> &[String] {
        self.inputs.get(anchor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first variable connected to an input anchor.
    pub fn input(&self, anchor: &str) -> Option<&str> {
        self.inputs(anchor).first().map(String::as_str)
    }

    pub fn require_input(&self, anchor: &str) -> Result<&str, ConverterError> {
        self.input(anchor).ok_or_else(|| ConverterError::MissingInput {
            node_id: self.node.id.clone(),
            anchor: anchor.to_string(),
        })
    }

    /// `true` when no other node consumes this node's output.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Name of the exported entry function. Derived from the variable when
    /// none was allotted.
    pub fn entry_point(&self, ctx: &GenerationContext) -> String {
        self.entry_point
            .clone()
            .unwrap_or_else(|| entry_point_name(ctx, &self.variable))
    }

    /// Name of the helper variable declared under `suffix`.
    pub fn companion(&self, ctx: &GenerationContext, suffix: &str) -> String {
        self.companions
            .get(suffix)
            .cloned()
            .unwrap_or_else(|| companion_name(ctx, &self.variable, suffix))
    }
}

impl Deref for BoundNode<'_> {
    type Target = IrNode;

    fn deref(&self) -> &IrNode {
        self.node
    }
}
