use super::support::{self, Binding, Bindings, Expr};
use crate::context::GenerationContext;
use crate::error::ConverterError;
use crate::fragment::{priority, CodeFragment};
use crate::ir::IrNode;
use crate::registry::{BoundNode, Converter};

static MEMORY_VECTOR_STORE: Bindings = Bindings {
    js: Binding {
        module: "langchain/vectorstores/memory",
        symbol: "MemoryVectorStore",
        package: "langchain",
    },
    python: Some(Binding {
        module: "langchain_core.vectorstores",
        symbol: "InMemoryVectorStore",
        package: "langchain-core",
    }),
};

static RETRIEVAL_QA: Bindings = Bindings {
    js: Binding {
        module: "langchain/chains",
        symbol: "RetrievalQAChain",
        package: "langchain",
    },
    python: Some(Binding {
        module: "langchain.chains",
        symbol: "RetrievalQA",
        package: "langchain",
    }),
};

/// An in-process vector store over the connected embeddings.
pub struct MemoryVectorStoreConverter;

impl Converter for MemoryVectorStoreConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["memoryVectorStore"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let embeddings = node.require_input("embeddings")?;
        let binding = MEMORY_VECTOR_STORE.require(ctx, "memoryVectorStore")?;
        let value = if ctx.is_python() {
            support::call_with_options(ctx, binding.symbol, &[("embedding", Expr::raw(embeddings))])
        } else {
            format!("new {}({})", binding.symbol, embeddings)
        };
        Ok(vec![
            support::import_fragment(ctx, node, &[binding], false),
            support::initialization(ctx, node, node.variable(), &value, priority::UTILITY),
        ])
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        MEMORY_VECTOR_STORE
            .for_target(ctx)
            .map(|b| vec![b.package.to_string()])
            .unwrap_or_default()
    }
}

/// Question answering over the retriever of a connected vector store.
pub struct RetrievalQaChainConverter;

impl Converter for RetrievalQaChainConverter {
    fn node_types(&self) -> Vec<&str> {
        vec!["retrievalQAChain"]
    }

    fn convert(
        &self,
        node: &BoundNode<'_>,
        ctx: &GenerationContext,
    ) -> Result<Vec<CodeFragment>, ConverterError> {
        let model = node.require_input("model")?;
        let store = node.require_input("vectorStore")?;
        let binding = RETRIEVAL_QA.require(ctx, "retrievalQAChain")?;

        let value = if ctx.is_python() {
            support::call_with_options(
                ctx,
                "RetrievalQA.from_chain_type",
                &[
                    ("llm", Expr::raw(model)),
                    ("retriever", Expr::raw(format!("{}.as_retriever()", store))),
                ],
            )
        } else {
            support::call(
                ctx,
                "RetrievalQAChain.fromLLM",
                &[Expr::raw(model), Expr::raw(format!("{}.asRetriever()", store))],
            )
        };

        let mut fragments = vec![
            support::import_fragment(ctx, node, &[binding], false),
            support::initialization(ctx, node, node.variable(), &value, priority::CHAIN),
        ];
        if node.is_terminal() {
            fragments.push(support::entry_point(ctx, node, "query"));
        }
        Ok(fragments)
    }

    fn dependencies(&self, _node: &IrNode, ctx: &GenerationContext) -> Vec<String> {
        RETRIEVAL_QA
            .for_target(ctx)
            .map(|b| vec![b.package.to_string()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn retrieval_chain_wraps_store_retriever() {
        let node = IrNode::new("qa", "retrievalQAChain");
        let mut inputs = BTreeMap::new();
        inputs.insert("model".to_string(), vec!["llm".to_string()]);
        inputs.insert("vectorStore".to_string(), vec!["store".to_string()]);
        let bound = BoundNode::new(&node, "qa", inputs, false);

        let fragments = RetrievalQaChainConverter
            .convert(&bound, &GenerationContext::default())
            .expect("converts");
        assert_eq!(
            fragments[1].content,
            "const qa = RetrievalQAChain.fromLLM(llm, store.asRetriever());"
        );
    }

    #[test]
    fn vector_store_requires_embeddings() {
        let node = IrNode::new("vs", "memoryVectorStore");
        let bound = BoundNode::new(&node, "vs", BTreeMap::new(), false);
        assert!(matches!(
            MemoryVectorStoreConverter.convert(&bound, &GenerationContext::default()),
            Err(ConverterError::MissingInput { .. })
        ));
    }
}
