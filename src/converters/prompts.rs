use super::support::{self, Binding, Expr};
use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment};
use crate::ir::IrNode;
use crate::registry::{BoundNode, Converter};

static PROMPT_TEMPLATE_JS: Binding = Binding {
    module: "@langchain/core/prompts",
    symbol: "PromptTemplate",
    package: "@langchain/core",
};
static PROMPT_TEMPLATE_PY: Binding = Binding {
    module: "langchain_core.prompts",
    symbol: "PromptTemplate",
    package: "langchain-core",
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

fn pick(ctx: &GenerationContext, js: &'static Binding, py: &'static Binding) -> &'static Binding {
    if ctx.is_python() { py } else { js }
}

/// `PromptTemplate.fromTemplate(template)`.
pub struct PromptTemplateConverter;

impl Converter for PromptTemplateConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["promptTemplate"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let template: String = node.param("template").required(&node.id, "template")?;
        let binding = pick(ctx, &PROMPT_TEMPLATE_JS, &PROMPT_TEMPLATE_PY);
        let factory = if ctx.is_python() {
            "PromptTemplate.from_template"
        } else {
            "PromptTemplate.fromTemplate"
        };
        let value = support::call(ctx, factory, &[Expr::str(template)]);
        Ok(vec![
            support::import_fragment(ctx, node, &[binding], false),
            support::initialization(ctx, node, node.variable(), &value, priority::UTILITY),
        ])
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        vec![pick(ctx, &PROMPT_TEMPLATE_JS, &PROMPT_TEMPLATE_PY).package.to_string()]
    }

    fn supported_versions(&self) -> Vec<&str> {
        vec!["1"]
    }
}

/// `ChatPromptTemplate.fromMessages([...])` from a system and a human message.
pub struct ChatPromptTemplateConverter;

impl Converter for ChatPromptTemplateConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["chatPromptTemplate"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let system: Option<String> = node
            .param("systemMessagePrompt")
            .optional(&node.id, "systemMessagePrompt")?;
        let human: String = node
            .param("humanMessagePrompt")
            .with_default("{input}".to_string())
            .required(&node.id, "humanMessagePrompt")?;

        let (open, close) = if ctx.is_python() { ("(", ")") } else { ("[", "]") };
        let inner = ctx.indent(1);
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(format!(
                "{}{}{}, {}{}",
                inner,
                open,
                ctx.quote("system"),
                ctx.quote(&system),
                close
            ));
        }
        messages.push(format!(
            "{}{}{}, {}{}",
            inner,
            open,
            ctx.quote("human"),
            ctx.quote(&human),
            close
        ));
        let factory = if ctx.is_python() {
            "ChatPromptTemplate.from_messages"
        } else {
            "ChatPromptTemplate.fromMessages"
        };
        let value = format!(
            "{}([\n{}{}\n])",
            factory,
            messages.join(",\n"),
            ctx.trailing_comma()
        );

        let binding = pick(ctx, &CHAT_PROMPT_JS, &CHAT_PROMPT_PY);
        Ok(vec![
            support::import_fragment(ctx, node, &[binding], false),
            support::initialization(ctx, node, node.variable(), &value, priority::UTILITY),
        ])
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        vec![pick(ctx, &CHAT_PROMPT_JS, &CHAT_PROMPT_PY).package.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetLanguage;
    use std::collections::BTreeMap;

    #[test]
    fn prompt_template_requires_template() {
        let node = IrNode::new("p", "promptTemplate");
        let bound = BoundNode::new(&node, "p", BTreeMap::new(), false);
        let err = PromptTemplateConverter
            .convert(&bound, &GenerationContext::default())
            .unwrap_err();
        assert!(matches!(err, ConverterError::MissingParameter { .. }));
    }

    #[test]
    fn chat_prompt_renders_tuples_for_python() {
        let node = IrNode::new("p", "chatPromptTemplate")
            .with_param("systemMessagePrompt", "You are terse.");
        let bound = BoundNode::new(&node, "p", BTreeMap::new(), false);
        let ctx = GenerationContext::builder()
            .target(TargetLanguage::Python)
            .build();
        let fragments = ChatPromptTemplateConverter.convert(&bound, &ctx).expect("converts");
        assert_eq!(
            fragments[1].content,
            "p = ChatPromptTemplate.from_messages([\n    (\"system\", \"You are terse.\"),\n    (\"human\", \"{input}\"),\n])"
        );
    }
}
