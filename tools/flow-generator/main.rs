use clap::Parser;
use flow2code::document::{
    AnchorDefinition, EdgeDefinition, FlowDocument, NodeDefinition, ParameterDefinition, Position,
};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;

/// A CLI tool to generate random flow documents for the flow2code compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// The minimum number of independent pipelines in the flow
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of independent pipelines in the flow
    #[arg(long, default_value_t = 4)]
    max: usize,

    /// Probability of adding a node type that has no converter
    #[arg(long, default_value_t = 0.0)]
    unsupported: f64,
}

/// Accumulates nodes and edges with unique, readable ids.
#[derive(Default)]
struct FlowBuilder {
    document: FlowDocument,
}

impl FlowBuilder {
    fn add(&mut self, rng: &mut ThreadRng, node_type: &str, inputs: Vec<AnchorDefinition>) -> String {
        let id = format!("{}_{}", node_type, self.document.nodes.len());
        self.document.nodes.push(NodeDefinition {
            id: id.clone(),
            node_type: node_type.to_string(),
            inputs,
            outputs: vec![anchor("out", node_type, false, false)],
            position: Some(Position {
                x: rng.random_range(0.0..1200.0),
                y: rng.random_range(0.0..800.0),
            }),
            ..Default::default()
        });
        id
    }

    fn with_param(&mut self, id: &str, name: &str, value: serde_json::Value) {
        if let Some(node) = self.document.nodes.iter_mut().find(|n| n.id == id) {
            node.parameters.push(ParameterDefinition {
                name: name.to_string(),
                value,
                declared_type: None,
            });
        }
    }

    fn connect(&mut self, source: &str, target: &str, target_anchor: &str) {
        self.document.edges.push(EdgeDefinition {
            id: format!("e{}", self.document.edges.len()),
            source: source.to_string(),
            source_handle: "out".to_string(),
            target: target.to_string(),
            target_handle: target_anchor.to_string(),
        });
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&cli.unsupported) {
        eprintln!("Error: --unsupported must be between 0 and 1");
        std::process::exit(1);
    }

    let pipelines = rng.random_range(cli.min..=cli.max);
    println!("Generating a flow with {} pipeline(s)...", pipelines);

    let mut builder = FlowBuilder::default();
    for _ in 0..pipelines {
        match rng.random_range(0..3) {
            0 => generate_prompt_chain(&mut builder, &mut rng),
            1 => generate_tool_agent(&mut builder, &mut rng),
            _ => generate_conversation(&mut builder, &mut rng),
        }
        if rng.random_bool(cli.unsupported) {
            let id = builder.add(&mut rng, "customWebhook", vec![]);
            println!("-> Added unsupported node '{}'.", id);
        }
    }

    let json_output = serde_json::to_string_pretty(&builder.document)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} node(s) and {} edge(s) to '{}'",
        builder.document.nodes.len(),
        builder.document.edges.len(),
        cli.output
    );

    Ok(())
}

// --- Pipeline Generators ---

fn generate_model(builder: &mut FlowBuilder, rng: &mut ThreadRng) -> String {
    let (node_type, model) = if rng.random_bool(0.5) {
        ("chatOpenAI", "gpt-4o-mini")
    } else {
        ("chatAnthropic", "claude-3-5-sonnet-latest")
    };
    let id = builder.add(rng, node_type, vec![]);
    builder.with_param(&id, "modelName", model.into());
    let temperature = (rng.random_range(0.0..1.0_f64) * 10.0).round() / 10.0;
    builder.with_param(&id, "temperature", temperature.into());
    id
}

/// promptTemplate + model -> llmChain, optionally with a string output parser.
fn generate_prompt_chain(builder: &mut FlowBuilder, rng: &mut ThreadRng) {
    let prompt = builder.add(rng, "promptTemplate", vec![]);
    builder.with_param(&prompt, "template", "Tell me a fact about {topic}.".into());
    let model = generate_model(builder, rng);
    let with_parser = rng.random_bool(0.5);
    let parser = with_parser.then(|| builder.add(rng, "stringOutputParser", vec![]));

    let chain = builder.add(
        rng,
        "llmChain",
        vec![
            anchor("prompt", "BasePromptTemplate", true, false),
            anchor("model", "BaseLanguageModel", true, false),
            anchor("outputParser", "BaseOutputParser", false, false),
        ],
    );
    builder.connect(&prompt, &chain, "prompt");
    builder.connect(&model, &chain, "model");
    if let Some(parser) = parser {
        builder.connect(&parser, &chain, "outputParser");
    }
    println!("-> Generated prompt chain '{}'.", chain);
}

/// A tool-calling agent over one to three tools.
fn generate_tool_agent(builder: &mut FlowBuilder, rng: &mut ThreadRng) {
    let model = generate_model(builder, rng);
    let tool_count = rng.random_range(1..=3);
    let tools: Vec<String> = (0..tool_count)
        .map(|_| {
            let tool = if rng.random_bool(0.5) { "tavilySearch" } else { "calculator" };
            builder.add(rng, tool, vec![])
        })
        .collect();

    let agent = builder.add(
        rng,
        "toolAgent",
        vec![
            anchor("model", "BaseChatModel", true, false),
            anchor("tools", "Tool", true, true),
            anchor("memory", "BaseChatMemory", false, false),
        ],
    );
    builder.with_param(&agent, "maxIterations", rng.random_range(3..=15_i64).into());
    builder.connect(&model, &agent, "model");
    for tool in &tools {
        builder.connect(tool, &agent, "tools");
    }
    if rng.random_bool(0.3) {
        let memory = builder.add(rng, "bufferMemory", vec![]);
        builder.connect(&memory, &agent, "memory");
    }
    println!("-> Generated agent '{}' with {} tool(s).", agent, tools.len());
}

fn generate_conversation(builder: &mut FlowBuilder, rng: &mut ThreadRng) {
    let model = generate_model(builder, rng);
    let memory = builder.add(rng, "bufferMemory", vec![]);
    let chain = builder.add(
        rng,
        "conversationChain",
        vec![
            anchor("model", "BaseChatModel", true, false),
            anchor("memory", "BaseMemory", false, false),
        ],
    );
    builder.connect(&model, &chain, "model");
    builder.connect(&memory, &chain, "memory");
    println!("-> Generated conversation chain '{}'.", chain);
}

fn anchor(name: &str, data_type: &str, required: bool, list: bool) -> AnchorDefinition {
    AnchorDefinition {
        id: name.to_string(),
        name: name.to_string(),
        data_type: data_type.to_string(),
        required,
        list,
    }
}
