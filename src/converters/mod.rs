//! The built-in converter catalogue.
//!
//! Constructor-style nodes are described as data in [`constructor`]; nodes
//! whose output depends on how they are wired get their own converter type.
//! Nothing here is special to the registry: [`register_defaults`] only calls
//! the public builder API, the same way a caller registers its own converters.

pub mod agents;
pub mod chains;
pub mod constructor;
pub mod prompts;
pub mod retrieval;
pub mod support;

use crate::registry::RegistryBuilder;
use constructor::{ConstructorConverter, DEFAULT_CONSTRUCTORS};

/// Registers every listed converter type and alias on a builder.
macro_rules! register_converters {
    ( $builder:expr ; $( $converter:expr ),* $(,)? ; $( ($alias:expr => $target:expr) ),* $(,)? ) => {{
        let builder = $builder;
        $( let builder = builder.with_converter($converter); )*
        $( let builder = builder.with_alias($alias, $target); )*
        builder
    }};
}

/// Adds the default catalogue and its aliases to `builder`.
pub(crate) fn register_defaults(builder: RegistryBuilder) -> RegistryBuilder {
    let builder = DEFAULT_CONSTRUCTORS
        .iter()
        .fold(builder, |builder, spec| {
            builder.with_converter(ConstructorConverter::new(spec))
        });

    register_converters! {
        builder;
        prompts::PromptTemplateConverter,
        prompts::ChatPromptTemplateConverter,
        chains::LlmChainConverter,
        chains::ChainToolConverter,
        retrieval::MemoryVectorStoreConverter,
        retrieval::RetrievalQaChainConverter,
        agents::ToolAgentConverter,
        agents::MrklAgentConverter,
        ;
        ("ChatOpenAI" => "chatOpenAI"),
        ("ChatAnthropic" => "chatAnthropic"),
        ("LLMChain" => "llmChain"),
        ("AgentExecutor" => "toolAgent"),
    }
}
