use crate::context::{GenerationContext, ModuleStyle};
use crate::fragment::ImportSpec;
use std::collections::{BTreeMap, BTreeSet};

/// Import lines longer than this are broken up, one symbol per line.
pub const MAX_LINE_WIDTH: usize = 80;

/// All imports of a module, merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedImport {
    pub module: String,
    /// Sorted and unique. Empty for a side-effect import.
    pub symbols: Vec<String>,
}

/// Merges import specs by `(module, symbol)`, sorting modules by name with
/// relative modules (`./x`, `../x`) last. A side-effect import of a module that
/// is also imported by name is dropped.
pub fn merge_imports<'a>(specs: impl IntoIterator<Item = &'a ImportSpec>) -> Vec<MergedImport> {
    let mut modules: BTreeMap<(bool, &str), BTreeSet<&str>> = BTreeMap::new();
    for spec in specs {
        let entry = modules
            .entry((is_relative(&spec.module), spec.module.as_str()))
            .or_default();
        entry.extend(spec.symbols.iter().map(String::as_str));
    }
    modules
        .into_iter()
        .map(|((_, module), symbols)| MergedImport {
            module: module.to_string(),
            symbols: symbols.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

fn is_relative(module: &str) -> bool {
    module.starts_with('.')
}

/// Renders merged imports as one block in the target's import syntax.
pub fn render_imports(ctx: &GenerationContext, imports: &[MergedImport]) -> String {
    imports
        .iter()
        .map(|import| render_import(ctx, import))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_import(ctx: &GenerationContext, import: &MergedImport) -> String {
    let module = &import.module;
    let term = ctx.terminator();

    if ctx.is_python() {
        if import.symbols.is_empty() {
            return format!("import {}", module);
        }
        let line = format!("from {} import {}", module, import.symbols.join(", "));
        if line.len() <= MAX_LINE_WIDTH {
            return line;
        }
        return format!(
            "from {} import (\n{}\n)",
            module,
            symbol_lines(ctx, &import.symbols)
        );
    }

    let quoted = ctx.quote(module);
    match (ctx.module_style, import.symbols.is_empty()) {
        (ModuleStyle::Esm, true) => format!("import {}{}", quoted, term),
        (ModuleStyle::Cjs, true) => format!("require({}){}", quoted, term),
        (style, false) => {
            let (head, tail) = match style {
                ModuleStyle::Esm => ("import {".to_string(), format!("}} from {}{}", quoted, term)),
                ModuleStyle::Cjs => ("const {".to_string(), format!("}} = require({}){}", quoted, term)),
            };
            let line = format!("{} {} {}", head, import.symbols.join(", "), tail);
            if line.len() <= MAX_LINE_WIDTH {
                line
            } else {
                format!("{}\n{}\n{}", head, symbol_lines(ctx, &import.symbols), tail)
            }
        }
    }
}

fn symbol_lines(ctx: &GenerationContext, symbols: &[String]) -> String {
    let indent = ctx.indent(1);
    let lines: Vec<String> = symbols.iter().map(|s| format!("{}{}", indent, s)).collect();
    format!("{}{}", lines.join(",\n"), ctx.trailing_comma())
}
