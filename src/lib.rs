//! # flow2code - Visual LLM Flow to Source Code Compiler
//!
//! **flow2code** turns a visual low-code flow (a graph of typed nodes such as
//! models, prompts, chains, tools, memory and agents) into a runnable source
//! module for TypeScript, JavaScript or Python, together with its package
//! manifest and a report of everything it noticed on the way.
//!
//! ## Core Workflow
//!
//! 1.  **Load the flow**: parse a canonical [`document::FlowDocument`], a React-Flow
//!     style export ([`document::ReactFlowExport`]), or your own format through the
//!     [`document::IntoFlowDocument`] trait.
//! 2.  **Build the IR**: [`ir::FlowGraph::from_document`] never fails; odd input is
//!     reported by the analyzer instead.
//! 3.  **Pick converters**: build a [`registry::ConverterRegistry`], usually from the
//!     default catalogue, and share it behind an `Arc`.
//! 4.  **Convert**: [`compiler::Compiler::convert`] analyses the graph, lowers every
//!     supported node and emits the module. Always check both `source` and `report`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flow2code::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("flow.json")?;
//!     let graph = FlowGraph::from_document(FlowDocument::from_json(&json)?);
//!
//!     let registry = Arc::new(ConverterRegistry::with_defaults()?);
//!     let compiler = Compiler::builder(registry).build();
//!     let ctx = GenerationContext::builder()
//!         .target(TargetLanguage::TypeScript)
//!         .include_tests(true)
//!         .build();
//!
//!     let output = compiler.convert(&graph, &ctx);
//!     println!("{}", ReportFormatter::format_report(&output.report));
//!     if let Some(source) = output.source {
//!         std::fs::write("index.ts", source)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod compiler;
pub mod context;
pub mod converters;
pub mod document;
pub mod emitter;
pub mod error;
pub mod fragment;
pub mod ir;
pub mod lowering;
pub mod prelude;
pub mod registry;
pub mod report;
