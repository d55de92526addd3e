//! Assembles positioned fragments into the final module text.
//!
//! The emitter performs no validation and never edits fragment content: it
//! merges imports, sorts the body by `(bucket, emission order)`, appends the
//! export trailer and unions the package requirements.

mod imports;
mod test_module;

pub use imports::{merge_imports, render_imports, MergedImport, MAX_LINE_WIDTH};
pub use test_module::{dev_dependencies, render_test_module, Export};

use crate::context::{GenerationContext, ModuleStyle};
use crate::fragment::FragmentKind;
use crate::lowering::{LoweredFlow, PositionedFragment};
use std::collections::BTreeSet;

/// Generated text plus package manifests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedOutput {
    pub source: String,
    pub tests: Option<String>,
    /// Sorted, unique.
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

pub struct Emitter<'c> {
    ctx: &'c GenerationContext,
}

impl<'c> Emitter<'c> {
    pub fn new(ctx: &'c GenerationContext) -> Self {
        Self { ctx }
    }

    pub fn emit(&self, lowered: &LoweredFlow) -> EmittedOutput {
        let ctx = self.ctx;
        let (import_fragments, mut body): (Vec<&PositionedFragment>, Vec<&PositionedFragment>) =
            lowered
                .fragments
                .iter()
                .partition(|p| p.fragment.kind == FragmentKind::Import);
        body.sort_by_key(|p| (p.bucket, p.order));

        let merged = merge_imports(
            import_fragments
                .iter()
                .flat_map(|p| p.fragment.import_specs.iter()),
        );
        let exports = collect_exports(&body);

        let mut sections = Vec::new();
        if ctx.features.include_docs {
            sections.push(format!(
                "{} Generated by flow2code ({}). Edit freely; regenerating overwrites this file.",
                ctx.comment_prefix(),
                ctx.target
            ));
        }
        if !merged.is_empty() {
            sections.push(render_imports(ctx, &merged));
        }
        sections.extend(
            body.iter()
                .map(|p| p.fragment.content.clone())
                .filter(|content| !content.is_empty()),
        );
        if let Some(trailer) = export_trailer(ctx, &exports) {
            sections.push(trailer);
        }

        let mut source = sections.join("\n\n");
        if !source.is_empty() {
            source.push('\n');
        }

        let dependencies: BTreeSet<String> = lowered
            .dependencies
            .iter()
            .cloned()
            .chain(
                lowered
                    .fragments
                    .iter()
                    .flat_map(|p| p.fragment.required_packages.iter().cloned()),
            )
            .collect();

        let tests = if ctx.features.include_tests {
            render_test_module(ctx, &exports)
        } else {
            None
        };
        let dev_dependencies = if tests.is_some() {
            dev_dependencies(ctx)
        } else {
            Vec::new()
        };

        tracing::debug!(
            imports = merged.len(),
            body = body.len(),
            exports = exports.len(),
            "module emitted"
        );
        EmittedOutput {
            source,
            tests,
            dependencies: dependencies.into_iter().collect(),
            dev_dependencies,
        }
    }
}

/// Exported names in body order; the first fragment exporting a name wins.
fn collect_exports(body: &[&PositionedFragment]) -> Vec<Export> {
    let mut seen = BTreeSet::new();
    let mut exports = Vec::new();
    for positioned in body {
        let fragment = &positioned.fragment;
        for name in &fragment.exported_names {
            if seen.insert(name.as_str()) {
                exports.push(Export {
                    name: name.clone(),
                    callable: fragment.kind == FragmentKind::Execution,
                });
            }
        }
    }
    exports
}

/// `module.exports = {...}` for CommonJS, `export {...}` for the ES module
/// bindings not already exported inline. Python modules need none.
fn export_trailer(ctx: &GenerationContext, exports: &[Export]) -> Option<String> {
    if ctx.is_python() {
        return None;
    }
    let (head, names): (&str, Vec<&str>) = match ctx.module_style {
        ModuleStyle::Cjs => (
            "module.exports =",
            exports.iter().map(|e| e.name.as_str()).collect(),
        ),
        ModuleStyle::Esm => (
            "export",
            exports
                .iter()
                .filter(|e| !e.callable)
                .map(|e| e.name.as_str())
                .collect(),
        ),
    };
    if names.is_empty() {
        return None;
    }

    let term = ctx.terminator();
    let line = format!("{} {{ {} }}{}", head, names.join(", "), term);
    if line.len() <= MAX_LINE_WIDTH {
        return Some(line);
    }
    let indent = ctx.indent(1);
    let lines: Vec<String> = names.iter().map(|n| format!("{}{}", indent, n)).collect();
    Some(format!(
        "{} {{\n{}{}\n}}{}",
        head,
        lines.join(",\n"),
        ctx.trailing_comma(),
        term
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{priority, CodeFragment, ImportSpec};
    use pretty_assertions::assert_eq;

    fn positioned(fragment: CodeFragment, order: usize, bucket: i32) -> PositionedFragment {
        PositionedFragment {
            fragment,
            order,
            bucket,
        }
    }

    fn lowered() -> LoweredFlow {
        LoweredFlow {
            fragments: vec![
                positioned(
                    CodeFragment::new("b:init", FragmentKind::Initialization, priority::CHAIN)
                        .with_content("const b = a.pipe(p);")
                        .exporting("b")
                        .requiring("@langchain/core"),
                    1,
                    priority::CHAIN,
                ),
                positioned(
                    CodeFragment::import("a", vec![ImportSpec::new("@langchain/openai", &["ChatOpenAI"])]),
                    0,
                    priority::IMPORT,
                ),
                positioned(
                    CodeFragment::new("a:init", FragmentKind::Initialization, priority::MODEL)
                        .with_content("const a = new ChatOpenAI();")
                        .exporting("a")
                        .requiring("@langchain/openai"),
                    0,
                    priority::MODEL,
                ),
                positioned(
                    CodeFragment::import("b", vec![ImportSpec::new("@langchain/openai", &["ChatOpenAI"])]),
                    1,
                    priority::IMPORT,
                ),
            ],
            dependencies: BTreeSet::new(),
        }
    }

    #[test]
    fn body_is_sorted_and_imports_are_merged() {
        let ctx = GenerationContext::default();
        let output = Emitter::new(&ctx).emit(&lowered());
        assert_eq!(
            output.source,
            "import { ChatOpenAI } from \"@langchain/openai\";\n\nconst a = new ChatOpenAI();\n\nconst b = a.pipe(p);\n\nexport { a, b };\n"
        );
        assert_eq!(output.dependencies, vec!["@langchain/core", "@langchain/openai"]);
        assert_eq!(output.tests, None);
    }

    #[test]
    fn commonjs_trailer_lists_every_export() {
        let ctx = GenerationContext::builder()
            .target(crate::context::TargetLanguage::JavaScript)
            .module_style(ModuleStyle::Cjs)
            .include_tests(true)
            .build();
        let output = Emitter::new(&ctx).emit(&lowered());
        assert!(output.source.ends_with("module.exports = { a, b };\n"));
        assert!(output.tests.is_some());
        assert_eq!(output.dev_dependencies, vec!["vitest"]);
    }
}
