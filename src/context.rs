use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The language family the generated source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    #[serde(alias = "ts")]
    TypeScript,
    #[serde(alias = "js")]
    JavaScript,
    #[serde(alias = "py")]
    Python,
}

impl TargetLanguage {
    /// `true` for the JavaScript family (TypeScript and JavaScript).
    pub fn is_javascript_family(self) -> bool {
        matches!(self, TargetLanguage::TypeScript | TargetLanguage::JavaScript)
    }

    /// File extension of a generated module in this language.
    pub fn file_extension(self) -> &'static str {
        match self {
            TargetLanguage::TypeScript => "ts",
            TargetLanguage::JavaScript => "js",
            TargetLanguage::Python => "py",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLanguage::TypeScript => write!(f, "TypeScript"),
            TargetLanguage::JavaScript => write!(f, "JavaScript"),
            TargetLanguage::Python => write!(f, "Python"),
        }
    }
}

/// How the generated JavaScript-family module imports and exports symbols.
/// Ignored for Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStyle {
    #[default]
    Esm,
    #[serde(alias = "commonjs")]
    Cjs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

/// Formatting preferences for the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeStyle {
    pub indent_width: usize,
    pub quote: QuoteStyle,
    pub semicolons: bool,
    pub trailing_commas: bool,
}

impl Default for CodeStyle {
    fn default() -> Self {
        Self {
            indent_width: 2,
            quote: QuoteStyle::Double,
            semicolons: true,
            trailing_commas: true,
        }
    }
}

/// Optional outputs and integrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub tracing: bool,
    pub include_tests: bool,
    pub include_docs: bool,
}

/// Immutable configuration threaded through every converter call of a single run.
///
/// The context is created by the caller (CLI flags, an API request body, a JSON
/// file) and never mutated by the pipeline. Every field has a default, so a
/// partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationContext {
    pub target: TargetLanguage,
    pub module_style: ModuleStyle,
    pub features: FeatureFlags,
    /// Environment variables the generated program sets up before anything else runs.
    pub env: BTreeMap<String, String>,
    pub style: CodeStyle,
    /// Name of the generated main module, used by the generated tests to import it.
    pub module_name: String,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            target: TargetLanguage::default(),
            module_style: ModuleStyle::default(),
            features: FeatureFlags::default(),
            env: BTreeMap::new(),
            style: CodeStyle::default(),
            module_name: "index".to_string(),
        }
    }
}

impl GenerationContext {
    pub fn builder() -> GenerationContextBuilder {
        GenerationContextBuilder::default()
    }

    /// Loads a context from a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_python(&self) -> bool {
        self.target == TargetLanguage::Python
    }

    /// ESM-style `export` keywords are only used for JavaScript-family ESM output.
    pub fn uses_esm_exports(&self) -> bool {
        self.target.is_javascript_family() && self.module_style == ModuleStyle::Esm
    }

    /// Whitespace for the given nesting depth. Python output always uses four spaces.
    pub fn indent(&self, level: usize) -> String {
        let width = if self.is_python() {
            4
        } else {
            self.style.indent_width
        };
        " ".repeat(width * level)
    }

    /// Statement terminator for the target.
    pub fn terminator(&self) -> &'static str {
        if !self.is_python() && self.style.semicolons {
            ";"
        } else {
            ""
        }
    }

    /// Trailing comma after the last element of a multi-line list.
    pub fn trailing_comma(&self) -> &'static str {
        if self.style.trailing_commas { "," } else { "" }
    }

    pub fn comment_prefix(&self) -> &'static str {
        if self.is_python() { "#" } else { "//" }
    }

    /// Quotes and escapes a string literal.
    pub fn quote(&self, text: &str) -> String {
        let quote = if self.is_python() {
            '"'
        } else {
            self.style.quote.as_char()
        };
        let mut out = String::with_capacity(text.len() + 2);
        out.push(quote);
        for c in text.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

/// Fluent construction of a `GenerationContext`.
#[derive(Debug, Default)]
pub struct GenerationContextBuilder {
    context: GenerationContext,
}

impl GenerationContextBuilder {
    pub fn target(mut self, target: TargetLanguage) -> Self {
        self.context.target = target;
        self
    }
    pub fn module_style(mut self, style: ModuleStyle) -> Self {
        self.context.module_style = style;
        self
    }
    pub fn tracing(mut self, enabled: bool) -> Self {
        self.context.features.tracing = enabled;
        self
    }
    pub fn include_tests(mut self, enabled: bool) -> Self {
        self.context.features.include_tests = enabled;
        self
    }
    pub fn include_docs(mut self, enabled: bool) -> Self {
        self.context.features.include_docs = enabled;
        self
    }
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.context.env.insert(key.to_string(), value.to_string());
        self
    }
    pub fn indent_width(mut self, width: usize) -> Self {
        self.context.style.indent_width = width;
        self
    }
    pub fn quote(mut self, quote: QuoteStyle) -> Self {
        self.context.style.quote = quote;
        self
    }
    pub fn semicolons(mut self, enabled: bool) -> Self {
        self.context.style.semicolons = enabled;
        self
    }
    pub fn trailing_commas(mut self, enabled: bool) -> Self {
        self.context.style.trailing_commas = enabled;
        self
    }
    pub fn module_name(mut self, name: &str) -> Self {
        self.context.module_name = name.to_string();
        self
    }
    pub fn build(self) -> GenerationContext {
        self.context
    }
}
