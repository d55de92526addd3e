//! The optional generated test module: vitest for JavaScript targets, pytest for Python.

use crate::context::{GenerationContext, ModuleStyle};

/// A name the generated module exports, and whether it is an entry function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub callable: bool,
}

pub fn dev_dependencies(ctx: &GenerationContext) -> Vec<String> {
    if ctx.is_python() {
        vec!["pytest".to_string()]
    } else {
        vec!["vitest".to_string()]
    }
}

/// Smoke tests asserting that every export exists and entry points are callable.
/// `None` when the module exports nothing.
pub fn render_test_module(ctx: &GenerationContext, exports: &[Export]) -> Option<String> {
    if exports.is_empty() {
        return None;
    }
    Some(if ctx.is_python() {
        render_pytest(ctx, exports)
    } else {
        render_vitest(ctx, exports)
    })
}

fn render_vitest(ctx: &GenerationContext, exports: &[Export]) -> String {
    let term = ctx.terminator();
    let names: Vec<&str> = exports.iter().map(|e| e.name.as_str()).collect();
    let module = ctx.quote(&format!("./{}", ctx.module_name));
    let vitest = ctx.quote("vitest");
    let header = match ctx.module_style {
        ModuleStyle::Esm => format!(
            "import {{ describe, expect, it }} from {}{}\nimport {{ {} }} from {}{}",
            vitest,
            term,
            names.join(", "),
            module,
            term
        ),
        ModuleStyle::Cjs => format!(
            "const {{ describe, expect, it }} = require({}){}\nconst {{ {} }} = require({}){}",
            vitest,
            term,
            names.join(", "),
            module,
            term
        ),
    };

    let one = ctx.indent(1);
    let two = ctx.indent(2);
    let cases: Vec<String> = exports
        .iter()
        .map(|export| {
            let (title, assertion) = if export.callable {
                (
                    format!("exports {} as a function", export.name),
                    format!("expect(typeof {}).toBe({}){}", export.name, ctx.quote("function"), term),
                )
            } else {
                (
                    format!("defines {}", export.name),
                    format!("expect({}).toBeDefined(){}", export.name, term),
                )
            };
            format!(
                "{}it({}, () => {{\n{}{}\n{}}}){}",
                one,
                ctx.quote(&title),
                two,
                assertion,
                one,
                term
            )
        })
        .collect();

    format!(
        "{}\n\ndescribe({}, () => {{\n{}\n}}){}\n",
        header,
        ctx.quote(&ctx.module_name),
        cases.join("\n\n"),
        term
    )
}

fn render_pytest(ctx: &GenerationContext, exports: &[Export]) -> String {
    let names: Vec<&str> = exports.iter().map(|e| e.name.as_str()).collect();
    let body = ctx.indent(1);
    let cases: Vec<String> = exports
        .iter()
        .map(|export| {
            if export.callable {
                format!(
                    "def test_{}_is_callable():\n{}assert callable({})",
                    export.name, body, export.name
                )
            } else {
                format!(
                    "def test_{}_is_defined():\n{}assert {} is not None",
                    export.name, body, export.name
                )
            }
        })
        .collect();
    format!(
        "from {} import {}\n\n\n{}\n",
        ctx.module_name,
        names.join(", "),
        cases.join("\n\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetLanguage;
    use pretty_assertions::assert_eq;

    fn exports() -> Vec<Export> {
        vec![
            Export {
                name: "chain".to_string(),
                callable: false,
            },
            Export {
                name: "runChain".to_string(),
                callable: true,
            },
        ]
    }

    #[test]
    fn vitest_module_imports_from_generated_module() {
        let rendered = render_test_module(&GenerationContext::default(), &exports()).expect("tests");
        assert_eq!(
            rendered,
            r#"import { describe, expect, it } from "vitest";
import { chain, runChain } from "./index";

describe("index", () => {
  it("defines chain", () => {
    expect(chain).toBeDefined();
  });

  it("exports runChain as a function", () => {
    expect(typeof runChain).toBe("function");
  });
});
"#
        );
    }

    #[test]
    fn pytest_module_uses_module_name() {
        let ctx = GenerationContext::builder()
            .target(TargetLanguage::Python)
            .module_name("flow")
            .build();
        let exports = vec![Export {
            name: "run_chain".to_string(),
            callable: true,
        }];
        assert_eq!(
            render_test_module(&ctx, &exports).expect("tests"),
            "from flow import run_chain\n\n\ndef test_run_chain_is_callable():\n    assert callable(run_chain)\n"
        );
        assert_eq!(dev_dependencies(&ctx), vec!["pytest"]);
    }

    #[test]
    fn nothing_exported_means_no_tests() {
        assert_eq!(render_test_module(&GenerationContext::default(), &[]), None);
    }
}
