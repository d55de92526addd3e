//! The intermediate representation of a flow: nodes, anchors, parameters and edges.
//!
//! The IR is pure data. It can represent invalid graphs on purpose, so that the
//! analyzer can report *why* a flow is not convertible.

mod build;
pub mod graph;
pub mod node;

pub use graph::*;
pub use node::*;
