//! Common test utilities for building flow graphs.
use flow2code::prelude::*;

/// A chat model node with a single `out` anchor.
#[allow(dead_code)]
pub fn model(id: &str) -> IrNode {
    IrNode::new(id, "chatOpenAI")
        .with_category("Chat Models")
        .with_param("modelName", "gpt-4o-mini")
        .with_output(Anchor::new("out", "out", "BaseChatModel|BaseLanguageModel"))
}

#[allow(dead_code)]
pub fn prompt(id: &str, template: &str) -> IrNode {
    IrNode::new(id, "promptTemplate")
        .with_param("template", template)
        .with_output(Anchor::new("out", "out", "BasePromptTemplate"))
}

/// An `llmChain` requiring a prompt and a model.
#[allow(dead_code)]
pub fn llm_chain(id: &str) -> IrNode {
    IrNode::new(id, "llmChain")
        .with_input(Anchor::new("prompt", "prompt", "BasePromptTemplate").required())
        .with_input(Anchor::new("model", "model", "BaseLanguageModel").required())
        .with_input(Anchor::new("outputParser", "outputParser", "BaseOutputParser"))
        .with_output(Anchor::new("out", "out", "BaseChain|Runnable"))
}

#[allow(dead_code)]
pub fn tool(id: &str, node_type: &str) -> IrNode {
    IrNode::new(id, node_type).with_output(Anchor::new("out", "out", "Tool"))
}

/// A tool-calling agent: one model, a list of tools, optional memory.
#[allow(dead_code)]
pub fn tool_agent(id: &str) -> IrNode {
    IrNode::new(id, "toolAgent")
        .with_input(Anchor::new("model", "model", "BaseChatModel").required())
        .with_input(Anchor::new("tools", "tools", "Tool").required().list())
        .with_input(Anchor::new("memory", "memory", "BaseChatMemory"))
        .with_output(Anchor::new("out", "out", "AgentExecutor"))
}

/// An edge from `source`'s `out` anchor to `anchor` on `target`.
#[allow(dead_code)]
pub fn connect(source: &str, target: &str, anchor: &str) -> Edge {
    Edge::new((source, "out"), (target, anchor))
}

/// `{llm, promptTemplate, chain}` declared consumers-first, so document order
/// disagrees with dependency order.
#[allow(dead_code)]
pub fn create_prompt_chain_flow() -> FlowGraph {
    FlowGraph::new(
        vec![
            llm_chain("chain"),
            prompt("prompt", "Tell me a joke about {topic}"),
            model("llm"),
        ],
        vec![
            connect("prompt", "chain", "prompt"),
            connect("llm", "chain", "model"),
        ],
    )
}

/// `{toolA, toolB, agent}` plus the agent's model.
#[allow(dead_code)]
pub fn create_tool_agent_flow() -> FlowGraph {
    FlowGraph::new(
        vec![
            tool("toolA", "tavilySearch"),
            tool("toolB", "calculator"),
            model("llm"),
            tool_agent("agent"),
        ],
        vec![
            connect("toolB", "agent", "tools"),
            connect("toolA", "agent", "tools"),
            connect("llm", "agent", "model"),
        ],
    )
}

#[allow(dead_code)]
pub fn default_compiler() -> Compiler {
    let registry = ConverterRegistry::with_defaults().expect("default catalogue is valid");
    Compiler::builder(std::sync::Arc::new(registry)).build()
}

#[allow(dead_code)]
pub fn python() -> GenerationContext {
    GenerationContext::builder()
        .target(TargetLanguage::Python)
        .build()
}

/// Byte offset of `needle` in `haystack`, failing the test when absent.
#[allow(dead_code)]
pub fn offset(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("expected {:?} in:\n{}", needle, haystack))
}
