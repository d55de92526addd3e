//! Prelude module for convenient imports
//!
//! Re-exports the types needed to load a flow, build a registry and run a
//! conversion.
//!
//! # Example
//!
//! ```rust,no_run
//! use flow2code::prelude::*;
//! use std::sync::Arc;
//!
//! # fn run_example() -> Result<()> {
//! let document = FlowDocument::from_json(&std::fs::read_to_string("flow.json")?)?;
//! let compiler = Compiler::builder(Arc::new(ConverterRegistry::with_defaults()?)).build();
//! let output = compiler.convert_document(document, &GenerationContext::default());
//!
//! for warning in &output.report.warnings {
//!     println!("warning: {}", warning);
//! }
//! # Ok(())
//! # }
//! ```

// Pipeline
pub use crate::compiler::{Compiler, CompilerBuilder, ConversionOutput};
pub use crate::context::{GenerationContext, ModuleStyle, QuoteStyle, TargetLanguage};

// Input model
pub use crate::document::{FlowDocument, IntoFlowDocument, ReactFlowExport};
pub use crate::ir::{Anchor, Edge, FlowGraph, IrNode, ParamLookup, ParamValue};

// Converters
pub use crate::fragment::{CodeFragment, FragmentKind, ImportSpec};
pub use crate::registry::{BoundNode, Converter, ConverterRegistry, RegistryBuilder};

// Reporting and errors
pub use crate::error::{ConverterError, DocumentError, RegistryError, StructuralError};
pub use crate::report::{Complexity, ConversionReport, ReportFormatter, Warning};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
