//! Table-driven converters for nodes that lower to a single constructor call.

use super::support::{self, Binding, Bindings, Expr};
use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment};
use crate::ir::IrNode;
use crate::registry::{BoundNode, Converter};

#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Number(f64),
    Bool(bool),
}

impl From<DefaultValue> for Expr {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Str(s) => Expr::str(s),
            DefaultValue::Number(n) => Expr::Number(n),
            DefaultValue::Bool(b) => Expr::Bool(b),
        }
    }
}

/// A node parameter passed through as a constructor option.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Option key in the generated call (camelCase; snake_cased for Python).
    pub key: &'static str,
    /// Used when the parameter is unset. Without a default the option is omitted.
    pub default: Option<DefaultValue>,
}

/// A node input passed through as a constructor option.
#[derive(Debug, Clone, Copy)]
pub struct InputSpec {
    pub anchor: &'static str,
    pub key: &'static str,
    /// Passes every connected variable as an array.
    pub list: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ConstructorSpec {
    pub node_type: &'static str,
    pub priority: i32,
    pub bindings: Bindings,
    pub params: &'static [ParamSpec],
    pub inputs: &'static [InputSpec],
    /// `(option key, environment variable)` for the credential, if any.
    pub api_key: Option<(&'static str, &'static str)>,
    /// Input key of the generated entry point when the node is terminal.
    pub runnable: Option<&'static str>,
    pub versions: &'static [&'static str],
}

/// Lowers a node to `const x = new Class({...})` / `x = Class(...)`.
pub struct ConstructorConverter {
    spec: &'static ConstructorSpec,
}

impl ConstructorConverter {
    pub const fn new(spec: &'static ConstructorSpec) -> Self {
        Self { spec }
    }

    fn arguments(&self, node: &BoundNode<'_>) -> Result<Vec<(&'static str, Expr)>, ConverterError> {
        let mut args = Vec::new();
        for input in self.spec.inputs {
            let connected = node.inputs(input.anchor);
            if connected.is_empty() {
                if input.required {
                    return Err(ConverterError::MissingInput {
                        node_id: node.id.clone(),
                        anchor: input.anchor.to_string(),
                    });
                }
                continue;
            }
            let value = if input.list {
                Expr::vars(connected)
            } else {
                Expr::raw(connected[0].clone())
            };
            args.push((input.key, value));
        }
        for param in self.spec.params {
            let value = match node.parameter(param.name) {
                Some(p) if !p.value.is_unset() => Some(Expr::from(&p.value)),
                _ => param.default.map(Expr::from),
            };
            if let Some(value) = value {
                args.push((param.key, value));
            }
        }
        if let Some((key, var)) = self.spec.api_key {
            args.push((key, Expr::Env(var.to_string())));
        }
        Ok(args)
    }

    fn binding(&self, ctx: &GenerationContext) -> Result<&'static Binding, ConverterError> {
        let spec: &'static ConstructorSpec = self.spec;
        spec.bindings.require(ctx, spec.node_type)
    }
}

impl Converter for ConstructorConverter {
    fn node_types(&self) -> Vec<&str> {
        vec![self.spec.node_type]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let binding = self.binding(ctx)?;
        let args = self.arguments(node)?;
        let needs_env = args.iter().any(|(_, v)| v.uses_env());

        let value = support::construct(ctx, binding.symbol, &args);
        let mut fragments = vec![
            support::import_fragment(ctx, node, &[binding], needs_env),
            support::initialization(ctx, node, node.variable(), &value, self.spec.priority)
                .requiring(binding.package),
        ];
        if let (Some(input_key), true) = (self.spec.runnable, node.is_terminal()) {
            fragments.push(support::entry_point(ctx, node, input_key));
        }
        Ok(fragments)
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        self.spec
            .bindings
            .for_target(ctx)
            .map(|b| vec![b.package.to_string()])
            .unwrap_or_default()
    }

    fn supported_versions(&self) -> Vec<&str> {
        self.spec.versions.to_vec()
    }
}

const fn js(module: &'static str, symbol: &'static str, package: &'static str) -> Binding {
    Binding {
        module,
        symbol,
        package,
    }
}

const fn py(module: &'static str, symbol: &'static str, package: &'static str) -> Option<Binding> {
    Some(Binding {
        module,
        symbol,
        package,
    })
}

const fn param(name: &'static str, key: &'static str, default: Option<DefaultValue>) -> ParamSpec {
    ParamSpec { name, key, default }
}

const fn input(anchor: &'static str, key: &'static str, required: bool) -> InputSpec {
    InputSpec {
        anchor,
        key,
        list: false,
        required,
    }
}

pub static CHAT_OPENAI: ConstructorSpec = ConstructorSpec {
    node_type: "chatOpenAI",
    priority: priority::MODEL,
    bindings: Bindings {
        js: js("@langchain/openai", "ChatOpenAI", "@langchain/openai"),
        python: py("langchain_openai", "ChatOpenAI", "langchain-openai"),
    },
    params: &[
        param("modelName", "model", Some(DefaultValue::Str("gpt-4o-mini"))),
        param("temperature", "temperature", Some(DefaultValue::Number(0.7))),
        param("maxTokens", "maxTokens", None),
        param("streaming", "streaming", None),
    ],
    inputs: &[input("cache", "cache", false)],
    api_key: Some(("apiKey", "OPENAI_API_KEY")),
    runnable: None,
    versions: &[],
};

pub static CHAT_ANTHROPIC: ConstructorSpec = ConstructorSpec {
    node_type: "chatAnthropic",
    priority: priority::MODEL,
    bindings: Bindings {
        js: js("@langchain/anthropic", "ChatAnthropic", "@langchain/anthropic"),
        python: py("langchain_anthropic", "ChatAnthropic", "langchain-anthropic"),
    },
    params: &[
        param("modelName", "model", Some(DefaultValue::Str("claude-3-5-sonnet-latest"))),
        param("temperature", "temperature", Some(DefaultValue::Number(0.7))),
        param("maxTokensToSample", "maxTokens", None),
    ],
    inputs: &[],
    api_key: Some(("apiKey", "ANTHROPIC_API_KEY")),
    runnable: None,
    versions: &[],
};

pub static OPENAI_EMBEDDINGS: ConstructorSpec = ConstructorSpec {
    node_type: "openAIEmbeddings",
    priority: priority::MODEL,
    bindings: Bindings {
        js: js("@langchain/openai", "OpenAIEmbeddings", "@langchain/openai"),
        python: py("langchain_openai", "OpenAIEmbeddings", "langchain-openai"),
    },
    params: &[
        param("modelName", "model", Some(DefaultValue::Str("text-embedding-3-small"))),
        param("dimensions", "dimensions", None),
    ],
    inputs: &[],
    api_key: Some(("apiKey", "OPENAI_API_KEY")),
    runnable: None,
    versions: &[],
};

pub static CALCULATOR: ConstructorSpec = ConstructorSpec {
    node_type: "calculator",
    priority: priority::UTILITY,
    bindings: Bindings {
        js: js(
            "@langchain/community/tools/calculator",
            "Calculator",
            "@langchain/community",
        ),
        python: None,
    },
    params: &[],
    inputs: &[],
    api_key: None,
    runnable: None,
    versions: &[],
};

pub static TAVILY_SEARCH: ConstructorSpec = ConstructorSpec {
    node_type: "tavilySearch",
    priority: priority::UTILITY,
    bindings: Bindings {
        js: js(
            "@langchain/community/tools/tavily_search",
            "TavilySearchResults",
            "@langchain/community",
        ),
        python: py(
            "langchain_community.tools.tavily_search",
            "TavilySearchResults",
            "langchain-community",
        ),
    },
    params: &[param("maxResults", "maxResults", Some(DefaultValue::Number(3.0)))],
    inputs: &[],
    api_key: Some(("apiKey", "TAVILY_API_KEY")),
    runnable: None,
    versions: &[],
};

pub static BUFFER_MEMORY: ConstructorSpec = ConstructorSpec {
    node_type: "bufferMemory",
    priority: priority::UTILITY,
    bindings: Bindings {
        js: js("langchain/memory", "BufferMemory", "langchain"),
        python: py("langchain.memory", "ConversationBufferMemory", "langchain"),
    },
    params: &[
        param("memoryKey", "memoryKey", Some(DefaultValue::Str("chat_history"))),
        param("returnMessages", "returnMessages", Some(DefaultValue::Bool(true))),
    ],
    inputs: &[],
    api_key: None,
    runnable: None,
    versions: &[],
};

pub static STRING_OUTPUT_PARSER: ConstructorSpec = ConstructorSpec {
    node_type: "stringOutputParser",
    priority: priority::UTILITY,
    bindings: Bindings {
        js: js(
            "@langchain/core/output_parsers",
            "StringOutputParser",
            "@langchain/core",
        ),
        python: py(
            "langchain_core.output_parsers",
            "StrOutputParser",
            "langchain-core",
        ),
    },
    params: &[],
    inputs: &[],
    api_key: None,
    runnable: None,
    versions: &[],
};

pub static CONVERSATION_CHAIN: ConstructorSpec = ConstructorSpec {
    node_type: "conversationChain",
    priority: priority::CHAIN,
    bindings: Bindings {
        js: js("langchain/chains", "ConversationChain", "langchain"),
        python: py("langchain.chains", "ConversationChain", "langchain"),
    },
    params: &[param("verbose", "verbose", None)],
    inputs: &[input("model", "llm", true), input("memory", "memory", false)],
    api_key: None,
    runnable: Some("input"),
    versions: &["1", "2", "3"],
};

/// Every constructor-style node in the default catalogue.
pub static DEFAULT_CONSTRUCTORS: &[&ConstructorSpec] = &[
    &CHAT_OPENAI,
    &CHAT_ANTHROPIC,
    &OPENAI_EMBEDDINGS,
    &CALCULATOR,
    &TAVILY_SEARCH,
    &BUFFER_MEMORY,
    &STRING_OUTPUT_PARSER,
    &CONVERSATION_CHAIN,
];
