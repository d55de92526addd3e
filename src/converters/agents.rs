//! Agent converters.
//!
//! Agents bind a model to a list of tools and wrap the result in an executor.
//! The executor is the node's variable; the prompt and the agent runnable are
//! exported alongside it.

use super::support::{self, Binding, Expr};
use crate::context::{GenerationContext, TargetLanguage};
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment, FragmentKind};
use crate::ir::IrNode;
use crate::registry::{BoundNode, Converter};

/// Prompt pulled from the hub when the agent has no prompt connected.
pub const TOOL_AGENT_HUB_PROMPT: &str = "hwchase17/openai-tools-agent";
pub const DEFAULT_MAX_ITERATIONS: i64 = 10;
const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

static AGENT_EXECUTOR_JS: Binding = Binding {
    module: "langchain/agents",
    symbol: "AgentExecutor",
    package: "langchain",
};
static AGENT_EXECUTOR_PY: Binding = Binding {
    module: "langchain.agents",
    symbol: "AgentExecutor",
    package: "langchain",
};
static TOOL_CALLING_JS: Binding = Binding {
    module: "langchain/agents",
    symbol: "createToolCallingAgent",
    package: "langchain",
};
static TOOL_CALLING_PY: Binding = Binding {
    module: "langchain.agents",
    symbol: "create_tool_calling_agent",
    package: "langchain",
};
static HUB_JS: Binding = Binding {
    module: "langchain/hub",
    symbol: "pull",
    package: "langchain",
};
static HUB_PY: Binding = Binding {
    module: "langchain",
    symbol: "hub",
    package: "langchain",
};
static CHAT_PROMPT_JS: Binding = Binding {
    module: "@langchain/core/prompts",
    symbol: "ChatPromptTemplate",
    package: "@langchain/core",
};
static CHAT_PROMPT_PY: Binding = Binding {
    module: "langchain_core.prompts",
    symbol: "ChatPromptTemplate",
    package: "langchain-core",
};
static INITIALIZE_JS: Binding = Binding {
    module: "langchain/agents",
    symbol: "initializeAgentExecutorWithOptions",
    package: "langchain",
};
static INITIALIZE_PY: Binding = Binding {
    module: "langchain.agents",
    symbol: "initialize_agent",
    package: "langchain",
};
static AGENT_TYPE_PY: Binding = Binding {
    module: "langchain.agents",
    symbol: "AgentType",
    package: "langchain",
};

/// Top-level `await` is only available to ES modules; Python output is synchronous.
fn supports_top_level_await(ctx: &GenerationContext) -> bool {
    ctx.is_python() || ctx.uses_esm_exports()
}

fn max_iterations(node: &BoundNode<'_>) -> Result<i64, ConverterError> {
    node.param("maxIterations")
        .with_default(DEFAULT_MAX_ITERATIONS)
        .required(&node.id, "maxIterations")
}

/// Tool-calling agent plus executor. Claims `toolAgent` and the older
/// `agentExecutor` node type, which share the same inputs.
pub struct ToolAgentConverter;

enum PromptSource {
    Connected(String),
    Hub,
    Inline(String),
}

impl ToolAgentConverter {
    fn prompt_source(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<PromptSource, ConverterError> {
        if let Some(prompt) = node.input("prompt") {
            return Ok(PromptSource::Connected(prompt.to_string()));
        }
        let system: Option<String> = node
            .param("systemMessage")
            .optional(&node.id, "systemMessage")?;
        Ok(match system {
            Some(system) => PromptSource::Inline(system),
            None if supports_top_level_await(ctx) => PromptSource::Hub,
            None => PromptSource::Inline(DEFAULT_SYSTEM_MESSAGE.to_string()),
        })
    }

    fn inline_prompt(&self, ctx: &GenerationContext, system: &str, with_history: bool) -> String {
        let (open, close) = if ctx.is_python() { ("(", ")") } else { ("[", "]") };
        let inner = ctx.indent(1);
        let mut messages = vec![("system", system)];
        if with_history {
            messages.push(("placeholder", "{chat_history}"));
        }
        messages.push(("human", "{input}"));
        messages.push(("placeholder", "{agent_scratchpad}"));
        let lines: Vec<String> = messages
            .iter()
            .map(|(role, text)| {
                format!("{}{}{}, {}{}", inner, open, ctx.quote(role), ctx.quote(text), close)
            })
            .collect();
        let factory = if ctx.is_python() {
            "ChatPromptTemplate.from_messages"
        } else {
            "ChatPromptTemplate.fromMessages"
        };
        format!("{}([\n{}{}\n])", factory, lines.join(",\n"), ctx.trailing_comma())
    }
}

impl Converter for ToolAgentConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["toolAgent", "agentExecutor"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let model = node.require_input("model")?;
        let tools = node.inputs("tools");
        if tools.is_empty() {
            return Err(ConverterError::MissingInput {
                node_id: node.id.clone(),
                anchor: "tools".to_string(),
            });
        }
        let memory = node.input("memory");
        let iterations = max_iterations(node)?;
        let verbose: Option<bool> = node.param("verbose").optional(&node.id, "verbose")?;

        let python = ctx.is_python();
        let (executor_binding, agent_binding) = if python {
            (&AGENT_EXECUTOR_PY, &TOOL_CALLING_PY)
        } else {
            (&AGENT_EXECUTOR_JS, &TOOL_CALLING_JS)
        };
        let mut bindings: Vec<&Binding> = vec![executor_binding, agent_binding];

        let executor = node.variable().to_string();
        let agent = node.companion(ctx, "agent");
        let source = self.prompt_source(node, ctx)?;
        let mut statements = Vec::new();
        let mut exports = Vec::new();

        let prompt = match source {
            PromptSource::Connected(prompt) => prompt,
            PromptSource::Hub => {
                let prompt = node.companion(ctx, "prompt");
                let pulled = if python {
                    bindings.push(&HUB_PY);
                    support::call(ctx, "hub.pull", &[Expr::str(TOOL_AGENT_HUB_PROMPT)])
                } else {
                    bindings.push(&HUB_JS);
                    let callee = if ctx.target == TargetLanguage::TypeScript {
                        bindings.push(&CHAT_PROMPT_JS);
                        "pull<ChatPromptTemplate>"
                    } else {
                        "pull"
                    };
                    support::awaited(
                        ctx,
                        &support::call(ctx, callee, &[Expr::str(TOOL_AGENT_HUB_PROMPT)]),
                    )
                };
                statements.push(support::declare(ctx, &prompt, &pulled));
                exports.push(prompt.clone());
                prompt
            }
            PromptSource::Inline(system) => {
                let prompt = node.companion(ctx, "prompt");
                bindings.push(if python { &CHAT_PROMPT_PY } else { &CHAT_PROMPT_JS });
                let value = self.inline_prompt(ctx, &system, memory.is_some());
                statements.push(support::declare(ctx, &prompt, &value));
                exports.push(prompt.clone());
                prompt
            }
        };

        let tool_list = Expr::vars(tools);
        let agent_value = if python {
            support::call_with_options(
                ctx,
                "create_tool_calling_agent",
                &[
                    ("llm", Expr::raw(model)),
                    ("tools", tool_list.clone()),
                    ("prompt", Expr::raw(prompt.clone())),
                ],
            )
        } else {
            support::call_with_options(
                ctx,
                "createToolCallingAgent",
                &[
                    ("llm", Expr::raw(model)),
                    ("tools", tool_list.clone()),
                    ("prompt", Expr::raw(prompt.clone())),
                ],
            )
        };
        statements.push(support::declare(ctx, &agent, &agent_value));
        exports.push(agent.clone());

        let mut options = vec![("agent", Expr::raw(agent.clone())), ("tools", tool_list)];
        if let Some(memory) = memory {
            options.push(("memory", Expr::raw(memory)));
        }
        options.push(("maxIterations", Expr::Number(iterations as f64)));
        if let Some(verbose) = verbose {
            options.push(("verbose", Expr::Bool(verbose)));
        }
        let executor_value = support::construct(ctx, executor_binding.symbol, &options);
        statements.push(support::declare(ctx, &executor, &executor_value));
        exports.push(executor.clone());

        let content = support::documented(ctx, node, statements.join("\n"));
        let init = exports.iter().fold(
            CodeFragment::new(
                format!("{}:init", node.id),
                FragmentKind::Initialization,
                priority::AGENT,
            )
            .from_node(&node.id)
            .with_content(content),
            |fragment, name| fragment.exporting(name),
        );

        let mut fragments = vec![support::import_fragment(ctx, node, &bindings, false), init];
        if node.is_terminal() {
            fragments.push(support::entry_point(ctx, node, "input"));
        }
        Ok(fragments)
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        if ctx.is_python() {
            vec!["langchain".to_string(), "langchain-core".to_string()]
        } else {
            vec!["langchain".to_string(), "@langchain/core".to_string()]
        }
    }

    fn companions(&self) -> Vec<&str> {
        vec!["prompt", "agent"]
    }

    fn supported_versions(&self) -> Vec<&str> {
        vec!["1", "2"]
    }
}

/// The legacy chat zero-shot ReAct agent.
pub struct MrklAgentConverter;

impl Converter for MrklAgentConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["mrklAgentChat"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let model = node.require_input("model")?;
        let tools = node.inputs("tools");
        if tools.is_empty() {
            return Err(ConverterError::MissingInput {
                node_id: node.id.clone(),
                anchor: "tools".to_string(),
            });
        }
        if !supports_top_level_await(ctx) {
            return Err(ConverterError::Custom(format!(
                "node '{}' needs top-level await, which CommonJS output cannot provide",
                node.id
            )));
        }
        let iterations = max_iterations(node)?;

        let (value, bindings): (String, Vec<&Binding>) = if ctx.is_python() {
            let value = support::call_with_options(
                ctx,
                "initialize_agent",
                &[
                    ("tools", Expr::vars(tools)),
                    ("llm", Expr::raw(model)),
                    (
                        "agent",
                        Expr::raw("AgentType.CHAT_ZERO_SHOT_REACT_DESCRIPTION"),
                    ),
                    ("maxIterations", Expr::Number(iterations as f64)),
                ],
            );
            (value, vec![&INITIALIZE_PY, &AGENT_TYPE_PY])
        } else {
            let options = support::object_literal(
                ctx,
                &[
                    ("agentType", Expr::str("chat-zero-shot-react-description")),
                    ("maxIterations", Expr::Number(iterations as f64)),
                ],
            );
            let call = format!(
                "initializeAgentExecutorWithOptions({}, {}, {})",
                support::render(ctx, &Expr::vars(tools)),
                model,
                options
            );
            (support::awaited(ctx, &call), vec![&INITIALIZE_JS])
        };

        let mut fragments = vec![
            support::import_fragment(ctx, node, &bindings, false),
            support::initialization(ctx, node, node.variable(), &value, priority::AGENT),
        ];
        if node.is_terminal() {
            fragments.push(support::entry_point(ctx, node, "input"));
        }
        Ok(fragments)
    }

    fn dependencies(&self, _node: &IrNode, _ctx: &GenerationContext) -> Vec<String> {
        vec!["langchain".to_string()]
    }

    fn supported_versions(&self) -> Vec<&str> {
        vec!["1"]
    }

    fn is_deprecated(&self) -> bool {
        true
    }

    fn replacement_type(&self) -> Option<&str> {
        Some("toolAgent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleStyle;
    use std::collections::BTreeMap;

    fn agent_inputs(tools: &[&str], memory: Option<&str>) -> BTreeMap<String, Vec<String>> {
        let mut inputs = BTreeMap::new();
        inputs.insert("model".to_string(), vec!["llm".to_string()]);
        inputs.insert(
            "tools".to_string(),
            tools.iter().map(|t| t.to_string()).collect(),
        );
        if let Some(memory) = memory {
            inputs.insert("memory".to_string(), vec![memory.to_string()]);
        }
        inputs
    }

    #[test]
    fn tool_agent_lists_tools_in_given_order() {
        let node = IrNode::new("agent_0", "toolAgent");
        let bound = BoundNode::new(&node, "agent0", agent_inputs(&["search", "calc"], None), false);
        let fragments = ToolAgentConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");

        let init = &fragments[1];
        assert!(init.content.contains("tools: [search, calc]"));
        assert!(init.content.contains("maxIterations: 10"));
        assert!(init.content.contains(
            "const agent0Prompt = await pull<ChatPromptTemplate>(\"hwchase17/openai-tools-agent\");"
        ));
        assert_eq!(
            init.exported_names,
            vec!["agent0Prompt".to_string(), "agent0Agent".to_string(), "agent0".to_string()]
        );
        assert_eq!(init.priority, priority::AGENT);
    }

    #[test]
    fn tool_agent_declares_allotted_companions() {
        let node = IrNode::new("agent", "toolAgent");
        let bound = BoundNode::new(&node, "agent", agent_inputs(&["t"], None), true)
            .with_companion("prompt", "agentPrompt2")
            .with_companion("agent", "agentAgent")
            .with_entry_point("runAgent");
        let fragments = ToolAgentConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");
        assert!(fragments[1].content.contains("const agentPrompt2 = await pull"));
        assert!(fragments[1].content.contains("prompt: agentPrompt2,"));
        assert_eq!(
            fragments[1].exported_names,
            vec!["agentPrompt2".to_string(), "agentAgent".to_string(), "agent".to_string()]
        );
        assert_eq!(fragments[2].exported_names, vec!["runAgent".to_string()]);
    }

    #[test]
    fn commonjs_agent_builds_prompt_inline() {
        let node = IrNode::new("a", "agentExecutor").with_param("maxIterations", 4);
        let bound = BoundNode::new(&node, "a", agent_inputs(&["t"], Some("mem")), true);
        let ctx = GenerationContext::builder()
            .target(TargetLanguage::JavaScript)
            .module_style(ModuleStyle::Cjs)
            .build();
        let fragments = ToolAgentConverter.convert(&bound, &ctx).expect("converts");

        let init = &fragments[1].content;
        assert!(!init.contains("await"));
        assert!(init.contains("[\"placeholder\", \"{chat_history}\"]"));
        assert!(init.contains("memory: mem"));
        assert!(init.contains("maxIterations: 4"));
        assert_eq!(fragments[2].kind, FragmentKind::Execution);
    }

    #[test]
    fn tool_agent_needs_at_least_one_tool() {
        let node = IrNode::new("a", "toolAgent");
        let bound = BoundNode::new(&node, "a", agent_inputs(&[], None), false);
        assert!(matches!(
            ToolAgentConverter.convert(&bound, &GenerationContext::default()),
            Err(ConverterError::MissingInput { anchor, .. }) if anchor == "tools"
        ));
    }

    #[test]
    fn mrkl_agent_is_deprecated_in_favour_of_tool_agent() {
        assert!(MrklAgentConverter.is_deprecated());
        assert_eq!(MrklAgentConverter.replacement_type(), Some("toolAgent"));
    }

    #[test]
    fn mrkl_agent_renders_legacy_initializer() {
        let node = IrNode::new("m", "mrklAgentChat");
        let bound = BoundNode::new(&node, "m", agent_inputs(&["t1", "t2"], None), false);
        let fragments = MrklAgentConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");
        assert_eq!(
            fragments[1].content,
            "const m = await initializeAgentExecutorWithOptions([t1, t2], llm, {\n  agentType: \"chat-zero-shot-react-description\",\n  maxIterations: 10,\n});"
        );
    }
}
