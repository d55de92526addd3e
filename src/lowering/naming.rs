use crate::context::GenerationContext;
use crate::ir::FlowGraph;
use ahash::AHashSet;
use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeMap;

const JS_RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    // names the generated module itself relies on
    "console", "exports", "input", "module", "process", "require",
];

const PY_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
    "hub", "input", "os",
];

/// Every identifier one node's code may declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeNames {
    pub variable: String,
    pub entry_point: String,
    /// Helper variables by suffix.
    pub companions: BTreeMap<String, String>,
}

/// Picks the identifiers of every node, indexed by document position.
///
/// Variables derive from the node id (falling back to its type), spelled in
/// the target's convention. Entry-point names and the companions listed for
/// each position come from the same pool. Node variables are claimed first,
/// so a derived name never displaces a node's own. Collisions get a numeric
/// suffix in document order.
pub fn assign_names(
    graph: &FlowGraph,
    ctx: &GenerationContext,
    companions: &[Vec<&str>],
) -> Vec<NodeNames> {
    let mut pool = NamePool::new(ctx, graph.node_count());
    let variables: Vec<String> = graph
        .nodes()
        .iter()
        .map(|node| {
            let mut base = spell(ctx, &node.id);
            if base.is_empty() {
                base = spell(ctx, &node.node_type);
            }
            if base.is_empty() {
                base = "node".to_string();
            }
            if base.starts_with(|c: char| c.is_ascii_digit()) {
                base = spell(ctx, &format!("node {}", base));
            }
            if pool.reserved.contains(&base.as_str()) {
                base = spell(ctx, &format!("{} node", base));
            }
            pool.claim(&base)
        })
        .collect();

    variables
        .into_iter()
        .enumerate()
        .map(|(position, variable)| {
            let entry_point = pool.claim(&entry_point_name(ctx, &variable));
            let companions = companions
                .get(position)
                .into_iter()
                .flatten()
                .map(|suffix| {
                    let name = pool.claim(&companion_name(ctx, &variable, suffix));
                    (suffix.to_string(), name)
                })
                .collect();
            NodeNames {
                variable,
                entry_point,
                companions,
            }
        })
        .collect()
}

/// Unsuffixed name of the exported entry function for `variable`.
pub fn entry_point_name(ctx: &GenerationContext, variable: &str) -> String {
    if ctx.is_python() {
        format!("run_{}", variable.to_snake_case())
    } else {
        format!("run{}", variable.to_upper_camel_case())
    }
}

/// Unsuffixed name of a helper variable derived from `variable`.
pub fn companion_name(ctx: &GenerationContext, variable: &str, suffix: &str) -> String {
    if ctx.is_python() {
        format!("{}_{}", variable, suffix.to_snake_case())
    } else {
        format!("{}{}", variable, suffix.to_upper_camel_case())
    }
}

struct NamePool {
    python: bool,
    reserved: &'static [&'static str],
    taken: AHashSet<String>,
}

impl NamePool {
    fn new(ctx: &GenerationContext, capacity: usize) -> Self {
        Self {
            python: ctx.is_python(),
            reserved: if ctx.is_python() { PY_RESERVED } else { JS_RESERVED },
            taken: AHashSet::with_capacity(capacity),
        }
    }

    fn claim(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = if self.python {
                format!("{}_{}", base, suffix)
            } else {
                format!("{}{}", base, suffix)
            };
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Keeps ASCII alphanumerics, turns everything else into word breaks, then
/// applies the target's case convention.
fn spell(ctx: &GenerationContext, raw: &str) -> String {
    let words: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    if ctx.is_python() {
        words.to_snake_case()
    } else {
        words.to_lower_camel_case()
    }
}
