use serde::{Deserialize, Serialize};

/// Coarse ordering buckets for generated code. Lower buckets are emitted first.
pub mod priority {
    pub const IMPORT: i32 = 0;
    pub const ENVIRONMENT: i32 = 10;
    pub const MODEL: i32 = 20;
    /// Prompts, tools, memory, parsers and vector stores.
    pub const UTILITY: i32 = 30;
    pub const CHAIN: i32 = 40;
    pub const AGENT: i32 = 50;
    pub const EXECUTION: i32 = 90;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Import,
    Declaration,
    Initialization,
    Execution,
}

/// A module and the named symbols taken from it. An empty symbol list is a
/// side-effect import (`import "x"` / `import x`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSpec {
    pub module: String,
    pub symbols: Vec<String>,
}

impl ImportSpec {
    pub fn new(module: &str, symbols: &[&str]) -> Self {
        Self {
            module: module.to_string(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn side_effect(module: &str) -> Self {
        Self {
            module: module.to_string(),
            symbols: Vec::new(),
        }
    }
}

/// One unit of generated output plus its import and dependency metadata.
///
/// Fragments are produced by converters and never modified afterwards; the
/// emitter only reorders and merges them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFragment {
    pub id: String,
    pub kind: FragmentKind,
    pub content: String,
    pub required_packages: Vec<String>,
    /// `None` for cross-cutting fragments that no single node owns.
    pub source_node_id: Option<String>,
    pub priority: i32,
    pub exported_names: Vec<String>,
    pub import_specs: Vec<ImportSpec>,
}

impl CodeFragment {
    pub fn new(id: impl Into<String>, kind: FragmentKind, priority: i32) -> Self {
        Self {
            id: id.into(),
            kind,
            content: String::new(),
            required_packages: Vec::new(),
            source_node_id: None,
            priority,
            exported_names: Vec::new(),
            import_specs: Vec::new(),
        }
    }

    /// An import-only fragment for `node_id`.
    pub fn import(node_id: &str, specs: Vec<ImportSpec>) -> Self {
        let mut fragment = Self::new(format!("{}:import", node_id), FragmentKind::Import, priority::IMPORT)
            .from_node(node_id);
        fragment.import_specs = specs;
        fragment
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn from_node(mut self, node_id: &str) -> Self {
        self.source_node_id = Some(node_id.to_string());
        self
    }

    pub fn requiring(mut self, package: &str) -> Self {
        if !self.required_packages.iter().any(|p| p == package) {
            self.required_packages.push(package.to_string());
        }
        self
    }

    pub fn exporting(mut self, name: &str) -> Self {
        self.exported_names.push(name.to_string());
        self
    }

    pub fn with_import(mut self, spec: ImportSpec) -> Self {
        self.import_specs.push(spec);
        self
    }

    pub fn is_import(&self) -> bool {
        self.kind == FragmentKind::Import
    }
}
