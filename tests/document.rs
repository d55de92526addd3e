//! Tests for loading canonical and canvas-export flow documents.
use flow2code::prelude::*;
use pretty_assertions::assert_eq;

const CANVAS_EXPORT: &str = r#"{
  "nodes": [
    {
      "id": "chatOpenAI_0",
      "position": { "x": 10, "y": 20 },
      "data": {
        "name": "chatOpenAI",
        "label": "ChatOpenAI",
        "version": 6,
        "inputParams": [
          { "name": "modelName", "type": "options", "default": "gpt-4o" },
          { "name": "temperature", "type": "number", "default": 0.9 }
        ],
        "inputAnchors": [
          { "id": "chatOpenAI_0-input-cache-BaseCache", "name": "cache", "type": "BaseCache", "optional": true }
        ],
        "inputs": { "temperature": 0.2, "cache": "" },
        "outputAnchors": [
          { "id": "chatOpenAI_0-output-chatOpenAI-ChatOpenAI|BaseChatModel", "name": "chatOpenAI", "type": "ChatOpenAI | BaseChatModel" }
        ]
      }
    },
    {
      "id": "conversationChain_0",
      "data": {
        "name": "conversationChain",
        "inputAnchors": [
          { "id": "conversationChain_0-input-model-BaseChatModel", "name": "model", "type": "BaseChatModel" },
          { "id": "conversationChain_0-input-memory-BaseMemory", "name": "memory", "type": "BaseMemory", "optional": true }
        ],
        "inputs": { "model": "{{chatOpenAI_0.data.instance}}" },
        "outputAnchors": [
          {
            "name": "output",
            "type": "options",
            "options": [
              { "id": "conversationChain_0-output-conversationChain-ConversationChain", "name": "conversationChain", "type": "ConversationChain" }
            ]
          }
        ]
      }
    }
  ],
  "edges": [
    {
      "id": "e1",
      "source": "chatOpenAI_0",
      "sourceHandle": "chatOpenAI_0-output-chatOpenAI-ChatOpenAI|BaseChatModel",
      "target": "conversationChain_0",
      "targetHandle": "conversationChain_0-input-model-BaseChatModel"
    }
  ]
}"#;

#[test]
fn test_canvas_export_maps_to_canonical_document() {
    let document = ReactFlowExport::from_json(CANVAS_EXPORT)
        .and_then(IntoFlowDocument::into_flow_document)
        .expect("export loads");

    let model = &document.nodes[0];
    assert_eq!(model.node_type, "chatOpenAI");
    let params: Vec<(&str, &serde_json::Value)> = model
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), &p.value))
        .collect();
    assert_eq!(
        params,
        vec![
            ("modelName", &serde_json::json!("gpt-4o")),
            ("temperature", &serde_json::json!(0.2)),
        ]
    );
    assert!(!model.inputs[0].required);

    let chain = &document.nodes[1];
    assert!(chain.parameters.is_empty(), "placeholders are dropped");
    assert_eq!(chain.outputs.len(), 1);
    assert_eq!(chain.outputs[0].name, "conversationChain");
    assert_eq!(document.edges[0].source_handle, model.outputs[0].id);
}

#[test]
fn test_canvas_export_converts_end_to_end() {
    let registry = ConverterRegistry::with_defaults().expect("default catalogue is valid");
    let compiler = Compiler::builder(std::sync::Arc::new(registry)).build();
    let export = ReactFlowExport::from_json(CANVAS_EXPORT).expect("export parses");

    let output = compiler
        .convert_custom(export, &GenerationContext::default())
        .expect("export converts");
    assert!(output.report.errors.is_empty(), "{:?}", output.report.errors);
    let source = output.source.expect("source is generated");
    assert!(source.contains("temperature: 0.2"), "{}", source);
    assert!(source.contains("export async function runConversationChain0("));
}

#[test]
fn test_empty_ids_are_rejected_by_canvas_loader() {
    let json = r#"{ "nodes": [ { "id": " ", "data": { "name": "chatOpenAI" } } ] }"#;
    let result = ReactFlowExport::from_json(json).and_then(IntoFlowDocument::into_flow_document);
    assert!(matches!(result, Err(DocumentError::ValidationError(_))));
}

#[test]
fn test_canonical_document_defaults_missing_fields() {
    let document = FlowDocument::from_json(
        r#"{ "nodes": [ { "id": "a", "type": "calculator", "version": "2" } ] }"#,
    )
    .expect("document parses");
    assert!(document.edges.is_empty());

    let graph = FlowGraph::from_document(document);
    let node = graph.node("a").expect("node a");
    assert_eq!(node.label, "calculator");
    assert_eq!(node.version.as_deref(), Some("2"));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        FlowDocument::from_json("{ nodes: }"),
        Err(DocumentError::JsonParseError(_))
    ));
}
