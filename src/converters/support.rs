//! Rendering helpers shared by converters.
//!
//! Everything here is a free function of the generation context so that any
//! converter, built-in or user supplied, can produce target-correct text
//! without inheriting from a common base.

use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment, FragmentKind, ImportSpec};
use crate::ir::{IrNode, ParamValue};
use crate::registry::BoundNode;
use heck::ToSnakeCase;

/// A value expression in the generated program.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Emitted verbatim, e.g. a variable name.
    Raw(String),
    /// Read from the process environment at runtime.
    Env(String),
    Array(Vec<Expr>),
    /// A literal mapping: an object in JavaScript, a dict in Python.
    Object(Vec<(String, Expr)>),
}

impl Expr {
    pub fn str(text: impl Into<String>) -> Self {
        Expr::Str(text.into())
    }

    pub fn raw(code: impl Into<String>) -> Self {
        Expr::Raw(code.into())
    }

    /// A list of variable references.
    pub fn vars(names: &[String]) -> Self {
        Expr::Array(names.iter().map(|n| Expr::Raw(n.clone())).collect())
    }

    pub fn uses_env(&self) -> bool {
        match self {
            Expr::Env(_) => true,
            Expr::Array(items) => items.iter().any(Expr::uses_env),
            Expr::Object(entries) => entries.iter().any(|(_, value)| value.uses_env()),
            _ => false,
        }
    }
}

impl From<&ParamValue> for Expr {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Null => Expr::Null,
            ParamValue::Bool(b) => Expr::Bool(*b),
            ParamValue::Number(n) => Expr::Number(*n),
            ParamValue::Text(s) => Expr::Str(s.clone()),
            ParamValue::Json(serde_json::Value::Array(items)) => Expr::Array(
                items
                    .iter()
                    .map(|v| Expr::from(&ParamValue::from(v.clone())))
                    .collect(),
            ),
            ParamValue::Json(serde_json::Value::Object(map)) => Expr::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Expr::from(&ParamValue::from(v.clone()))))
                    .collect(),
            ),
            ParamValue::Json(scalar) => Expr::from(&ParamValue::from(scalar.clone())),
        }
    }
}

pub fn render(ctx: &GenerationContext, expr: &Expr) -> String {
    match expr {
        Expr::Null => (if ctx.is_python() { "None" } else { "null" }).to_string(),
        Expr::Bool(b) => match (ctx.is_python(), b) {
            (true, true) => "True".to_string(),
            (true, false) => "False".to_string(),
            (false, b) => b.to_string(),
        },
        Expr::Number(n) => ParamValue::Number(*n).to_string(),
        Expr::Str(s) => ctx.quote(s),
        Expr::Raw(code) => code.clone(),
        Expr::Env(name) => {
            if ctx.is_python() {
                format!("os.environ.get({})", ctx.quote(name))
            } else {
                env_access(ctx, name)
            }
        }
        Expr::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|i| render(ctx, i)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Expr::Object(entries) if entries.is_empty() => "{}".to_string(),
        Expr::Object(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(key, value)| {
                    let key = if ctx.is_python() || !is_identifier(key) {
                        ctx.quote(key)
                    } else {
                        key.clone()
                    };
                    format!("{}: {}", key, render(ctx, value))
                })
                .collect();
            if ctx.is_python() {
                format!("{{{}}}", rendered.join(", "))
            } else {
                format!("{{ {} }}", rendered.join(", "))
            }
        }
    }
}

/// `process.env.KEY`, or `process.env["KEY"]` when the key is not an identifier.
pub fn env_access(ctx: &GenerationContext, key: &str) -> String {
    if is_identifier(key) {
        format!("process.env.{}", key)
    } else {
        format!("process.env[{}]", ctx.quote(key))
    }
}

/// Property key spelling: JavaScript keeps camelCase, Python uses snake_case keywords.
pub fn property_key(ctx: &GenerationContext, key: &str) -> String {
    if ctx.is_python() {
        key.to_snake_case()
    } else if is_identifier(key) {
        key.to_string()
    } else {
        ctx.quote(key)
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// One `key<separator>value` line per argument, joined for a multi-line literal.
fn option_lines(ctx: &GenerationContext, separator: &str, args: &[(&str, Expr)]) -> String {
    let inner = ctx.indent(1);
    let lines: Vec<String> = args
        .iter()
        .map(|(key, value)| {
            format!(
                "{}{}{}{}",
                inner,
                property_key(ctx, key),
                separator,
                render(ctx, value)
            )
        })
        .collect();
    format!("{}{}", lines.join(",\n"), ctx.trailing_comma())
}

/// A multi-line JavaScript object literal, `{\n  key: value,\n}`.
pub fn object_literal(ctx: &GenerationContext, args: &[(&str, Expr)]) -> String {
    if args.is_empty() {
        return "{}".to_string();
    }
    format!("{{\n{}\n}}", option_lines(ctx, ": ", args))
}

/// `callee({ key: value })` or `callee(key=value)`, one argument per line.
pub fn call_with_options(ctx: &GenerationContext, callee: &str, args: &[(&str, Expr)]) -> String {
    match (ctx.is_python(), args.is_empty()) {
        (true, true) => format!("{}()", callee),
        (true, false) => format!("{}(\n{}\n)", callee, option_lines(ctx, "=", args)),
        (false, _) => format!("{}({})", callee, object_literal(ctx, args)),
    }
}

/// `new Class({ key: value })` or `Class(key=value)`.
pub fn construct(ctx: &GenerationContext, class: &str, args: &[(&str, Expr)]) -> String {
    match (ctx.is_python(), args.is_empty()) {
        (true, _) => call_with_options(ctx, class, args),
        (false, true) => format!("new {}()", class),
        (false, false) => format!("new {}", call_with_options(ctx, class, args)),
    }
}

/// `callee(a, b)` with positional arguments.
pub fn call(ctx: &GenerationContext, callee: &str, args: &[Expr]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| render(ctx, a)).collect();
    format!("{}({})", callee, rendered.join(", "))
}

/// `await expr` in JavaScript; Python output is synchronous.
pub fn awaited(ctx: &GenerationContext, expr: &str) -> String {
    if ctx.is_python() {
        expr.to_string()
    } else {
        format!("await {}", expr)
    }
}

/// `const name = value;` or `name = value`.
pub fn declare(ctx: &GenerationContext, name: &str, value: &str) -> String {
    if ctx.is_python() {
        format!("{} = {}", name, value)
    } else {
        format!("const {} = {}{}", name, value, ctx.terminator())
    }
}

/// A one-line comment naming the node, when documentation is enabled.
pub fn doc_comment(ctx: &GenerationContext, node: &IrNode) -> Option<String> {
    if !ctx.features.include_docs {
        return None;
    }
    Some(format!(
        "{} {} ({}, node {})",
        ctx.comment_prefix(),
        node.label,
        node.node_type,
        node.id
    ))
}

/// Prepends the node's doc comment to a code block, if enabled.
pub fn documented(ctx: &GenerationContext, node: &IrNode, code: String) -> String {
    match doc_comment(ctx, node) {
        Some(comment) => format!("{}\n{}", comment, code),
        None => code,
    }
}

/// Where a symbol comes from in one target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub module: &'static str,
    pub symbol: &'static str,
    pub package: &'static str,
}

/// A symbol's location in both target families. Symbols without a Python
/// counterpart cannot be generated for a Python target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub js: Binding,
    pub python: Option<Binding>,
}

impl Bindings {
    pub fn for_target(&self, ctx: &GenerationContext) -> Option<&Binding> {
        if ctx.is_python() {
            self.python.as_ref()
        } else {
            Some(&self.js)
        }
    }

    /// The binding for the current target, or `UnsupportedTarget` for `node_type`.
    pub fn require(
        &self,
        ctx: &GenerationContext,
        node_type: &str,
    ) -> Result<&Binding, ConverterError> {
        self.for_target(ctx)
            .ok_or_else(|| ConverterError::UnsupportedTarget {
                node_type: node_type.to_string(),
                target: ctx.target.to_string(),
            })
    }
}

/// Builds the import fragment for a node from the bindings it uses.
pub fn import_fragment(
    ctx: &GenerationContext,
    node: &IrNode,
    bindings: &[&Binding],
    needs_env: bool,
) -> CodeFragment {
    let mut specs: Vec<ImportSpec> = bindings
        .iter()
        .map(|b| ImportSpec::new(b.module, &[b.symbol]))
        .collect();
    if needs_env && ctx.is_python() {
        specs.push(ImportSpec::side_effect("os"));
    }
    bindings
        .iter()
        .fold(CodeFragment::import(&node.id, specs), |fragment, b| {
            fragment.requiring(b.package)
        })
}

/// An initialization fragment that binds `value` to the node's variable.
pub fn initialization(
    ctx: &GenerationContext,
    node: &IrNode,
    variable: &str,
    value: &str,
    priority: i32,
) -> CodeFragment {
    CodeFragment::new(
        format!("{}:init", node.id),
        FragmentKind::Initialization,
        priority,
    )
    .from_node(&node.id)
    .with_content(documented(ctx, node, declare(ctx, variable, value)))
    .exporting(variable)
}

/// An exported function invoking the node's runnable with a single input.
/// The function takes the entry-point name allotted to the node.
pub fn entry_point(ctx: &GenerationContext, node: &BoundNode<'_>, input_key: &str) -> CodeFragment {
    let name = node.entry_point(ctx);
    let variable = node.variable();
    let inner = ctx.indent(1);
    let content = if ctx.is_python() {
        format!(
            "def {}(input: str):\n{}return {}.invoke({{{}: input}})",
            name,
            inner,
            variable,
            ctx.quote(input_key)
        )
    } else {
        let export = if ctx.uses_esm_exports() { "export " } else { "" };
        let param = match ctx.target {
            crate::context::TargetLanguage::TypeScript => "input: string",
            _ => "input",
        };
        let payload = if input_key == "input" {
            "{ input }".to_string()
        } else {
            format!("{{ {}: input }}", property_key(ctx, input_key))
        };
        format!(
            "{}async function {}({}) {{\n{}return await {}.invoke({}){}\n}}",
            export,
            name,
            param,
            inner,
            variable,
            payload,
            ctx.terminator()
        )
    };
    CodeFragment::new(
        format!("{}:run", node.id),
        FragmentKind::Execution,
        priority::EXECUTION,
    )
    .from_node(&node.id)
    .with_content(content)
    .exporting(&name)
}
