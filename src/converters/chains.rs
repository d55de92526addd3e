use super::support::{self, Binding, Bindings, Expr};
use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment};
use crate::ir::IrNode;
use crate::registry::{BoundNode, Converter};

/// Composes `prompt | model [| parser]` as a runnable sequence.
pub struct LlmChainConverter;

impl Converter for LlmChainConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["llmChain"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let prompt = node.require_input("prompt")?;
        let model = node.require_input("model")?;
        let mut stages = vec![prompt, model];
        if let Some(parser) = node.input("outputParser") {
            stages.push(parser);
        }

        let value = if ctx.is_python() {
            stages.join(" | ")
        } else {
            let mut chain = stages[0].to_string();
            for stage in &stages[1..] {
                chain.push_str(&format!(".pipe({})", stage));
            }
            chain
        };

        let mut fragments = vec![
            support::initialization(ctx, node, node.variable(), &value, priority::CHAIN)
                .requiring(core_package(ctx)),
        ];
        if node.is_terminal() {
            fragments.push(support::entry_point(ctx, node, "input"));
        }
        Ok(fragments)
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        vec![core_package(ctx).to_string()]
    }

    fn supported_versions(&self) -> Vec<&str> {
        vec!["1", "2", "3"]
    }
}

fn core_package(ctx: &GenerationContext) -> &'static str {
    if ctx.is_python() {
        "langchain-core"
    } else {
        "@langchain/core"
    }
}

static CHAIN_TOOL: Bindings = Bindings {
    js: Binding {
        module: "langchain/tools",
        symbol: "ChainTool",
        package: "langchain",
    },
    python: Some(Binding {
        module: "langchain_core.tools",
        symbol: "Tool",
        package: "langchain-core",
    }),
};

/// Exposes a chain to agents as a named tool.
pub struct ChainToolConverter;

impl Converter for ChainToolConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["chainTool"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let chain = node.require_input("baseChain")?;
        let name: String = node.param("name").required(&node.id, "name")?;
        let description: String = node.param("description").required(&node.id, "description")?;
        let binding = CHAIN_TOOL.require(ctx, "chainTool")?;

        let callable = if ctx.is_python() {
            ("func", Expr::raw(format!("{}.invoke", chain)))
        } else {
            ("chain", Expr::raw(chain))
        };
        let value = support::construct(
            ctx,
            binding.symbol,
            &[
                ("name", Expr::str(name)),
                ("description", Expr::str(description)),
                callable,
            ],
        );
        Ok(vec![
            support::import_fragment(ctx, node, &[binding], false),
            support::initialization(ctx, node, node.variable(), &value, priority::UTILITY),
        ])
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        CHAIN_TOOL
            .for_target(ctx)
            .map(|b| vec![b.package.to_string()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetLanguage;
    use crate::fragment::FragmentKind;
    use std::collections::BTreeMap;

    fn inputs(pairs: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (anchor, var) in pairs {
            map.entry(anchor.to_string()).or_default().push(var.to_string());
        }
        map
    }

    #[test]
    fn llm_chain_pipes_prompt_model_and_parser() {
        let node = IrNode::new("llmChain_0", "llmChain");
        let bound = BoundNode::new(
            &node,
            "llmChain0",
            inputs(&[("model", "llm"), ("prompt", "prompt"), ("outputParser", "parser")]),
            false,
        );
        let fragments = LlmChainConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");
        assert_eq!(fragments.len(), 1);
        assert_eq!(
            fragments[0].content,
            "const llmChain0 = prompt.pipe(llm).pipe(parser);"
        );

        let py = GenerationContext::builder()
            .target(TargetLanguage::Python)
            .build();
        let fragments = LlmChainConverter.convert(&bound, &py).expect("converts");
        assert_eq!(fragments[0].content, "llmChain0 = prompt | llm | parser");
    }

    #[test]
    fn terminal_llm_chain_exports_entry_point() {
        let node = IrNode::new("c", "llmChain");
        let bound = BoundNode::new(&node, "c", inputs(&[("model", "m"), ("prompt", "p")]), true);
        let fragments = LlmChainConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");
        assert_eq!(fragments[1].kind, FragmentKind::Execution);
        assert_eq!(fragments[1].exported_names, vec!["runC".to_string()]);
    }

    #[test]
    fn chain_tool_passes_invoke_as_python_callable() {
        let node = IrNode::new("t", "chainTool")
            .with_param("name", "qa")
            .with_param("description", "Answers questions");
        let bound = BoundNode::new(&node, "t", inputs(&[("baseChain", "chain")]), false);
        let py = GenerationContext::builder()
            .target(TargetLanguage::Python)
            .build();
        let fragments = ChainToolConverter.convert(&bound, &py).expect("converts");
        assert!(fragments[1].content.contains("func=chain.invoke"));
    }
}
