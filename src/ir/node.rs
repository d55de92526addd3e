use crate::document::Position;
use crate::error::ConverterError;
use serde::Serialize;
use std::fmt;

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Arrays and objects are kept as raw JSON.
    Json(serde_json::Value),
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(ParamValue::Number)
                .unwrap_or(ParamValue::Null),
            serde_json::Value::String(s) => ParamValue::Text(s),
            other => ParamValue::Json(other),
        }
    }
}

impl ParamValue {
    /// Null values and blank strings are treated as "not set".
    pub fn is_unset(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// A named, user-edited setting on a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
    pub declared_type: Option<String>,
}

/// Conversion from a raw parameter value into a typed one.
pub trait FromParam: Sized {
    /// Human-readable name of the expected type, used in error messages.
    const EXPECTED: &'static str;
    fn from_param(value: &ParamValue) -> Option<Self>;
}

impl FromParam for String {
    const EXPECTED: &'static str = "a string";
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::Number(_) | ParamValue::Bool(_) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl FromParam for f64 {
    const EXPECTED: &'static str = "a number";
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromParam for i64 {
    const EXPECTED: &'static str = "an integer";
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            ParamValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromParam for bool {
    const EXPECTED: &'static str = "a boolean";
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromParam for serde_json::Value {
    const EXPECTED: &'static str = "a JSON value";
    fn from_param(value: &ParamValue) -> Option<Self> {
        Some(match value {
            ParamValue::Null => serde_json::Value::Null,
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Number(n) => serde_json::json!(n),
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::Json(v) => v.clone(),
        })
    }
}

/// The explicit result of a typed parameter lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamLookup<T> {
    Present(T),
    Missing,
    WrongType { expected: &'static str },
}

impl<T> ParamLookup<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, ParamLookup::Present(_))
    }

    /// The value if present, `default` if it is missing or has the wrong type.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            ParamLookup::Present(v) => v,
            _ => default,
        }
    }

    /// Turns `Missing` into `Present(default)`; a value of the wrong type stays an error.
    pub fn with_default(self, default: T) -> ParamLookup<T> {
        match self {
            ParamLookup::Missing => ParamLookup::Present(default),
            other => other,
        }
    }

    /// Missing is fine, a value of the wrong type is not.
    pub fn optional(self, node_id: &str, name: &str) -> Result<Option<T>, ConverterError> {
        match self {
            ParamLookup::Present(v) => Ok(Some(v)),
            ParamLookup::Missing => Ok(None),
            ParamLookup::WrongType { expected } => Err(ConverterError::InvalidParameter {
                node_id: node_id.to_string(),
                name: name.to_string(),
                expected: expected.to_string(),
            }),
        }
    }

    pub fn required(self, node_id: &str, name: &str) -> Result<T, ConverterError> {
        self.optional(node_id, name)?
            .ok_or_else(|| ConverterError::MissingParameter {
                node_id: node_id.to_string(),
                name: name.to_string(),
            })
    }
}

/// A typed connection point on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub id: String,
    pub name: String,
    /// A type name or a `|`-joined union. Only used as a compatibility hint.
    pub data_type: String,
    /// Inputs only.
    pub required: bool,
    /// When set, the anchor accepts any number of incoming edges.
    pub list: bool,
}

impl Anchor {
    pub fn new(id: &str, name: &str, data_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            data_type: data_type.to_string(),
            required: false,
            list: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Members of the `|`-joined type union, trimmed, without empties.
    pub fn type_members(&self) -> impl Iterator<Item = &str> {
        self.data_type
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One visual block of the flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrNode {
    pub id: String,
    pub node_type: String,
    pub category: String,
    pub label: String,
    pub version: Option<String>,
    pub parameters: Vec<Parameter>,
    pub inputs: Vec<Anchor>,
    pub outputs: Vec<Anchor>,
    pub position: Option<Position>,
}

impl IrNode {
    pub fn new(id: &str, node_type: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: node_type.to_string(),
            category: String::new(),
            label: node_type.to_string(),
            version: None,
            parameters: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            position: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_param(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            value: ParamValue::from(value.into()),
            declared_type: None,
        });
        self
    }

    pub fn with_input(mut self, anchor: Anchor) -> Self {
        self.inputs.push(anchor);
        self
    }

    pub fn with_output(mut self, anchor: Anchor) -> Self {
        self.outputs.push(anchor);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Typed parameter access. Unset values (null, blank strings) are `Missing`.
    pub fn param<T: FromParam>(&self, name: &str) -> ParamLookup<T> {
        match self.parameter(name) {
            None => ParamLookup::Missing,
            Some(p) if p.value.is_unset() => ParamLookup::Missing,
            Some(p) => match T::from_param(&p.value) {
                Some(v) => ParamLookup::Present(v),
                None => ParamLookup::WrongType {
                    expected: T::EXPECTED,
                },
            },
        }
    }

    pub fn input_anchor(&self, id: &str) -> Option<&Anchor> {
        find_anchor(&self.inputs, id)
    }

    pub fn output_anchor(&self, id: &str) -> Option<&Anchor> {
        find_anchor(&self.outputs, id)
    }
}

/// Anchors are matched by id, then by name for hand-written documents.
fn find_anchor<'a>(anchors: &'a [Anchor], key: &str) -> Option<&'a Anchor> {
    anchors
        .iter()
        .find(|a| a.id == key)
        .or_else(|| anchors.iter().find(|a| a.name == key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup_distinguishes_missing_and_wrong_type() {
        let node = IrNode::new("n", "chatOpenAI")
            .with_param("temperature", 0.2)
            .with_param("modelName", "")
            .with_param("streaming", "yes");

        assert_eq!(node.param::<f64>("temperature"), ParamLookup::Present(0.2));
        assert_eq!(node.param::<String>("modelName"), ParamLookup::Missing);
        assert_eq!(node.param::<String>("absent"), ParamLookup::Missing);
        assert!(matches!(
            node.param::<bool>("streaming"),
            ParamLookup::WrongType { .. }
        ));
        assert_eq!(node.param::<i64>("maxTokens").unwrap_or(256), 256);
    }

    #[test]
    fn required_lookup_reports_node_and_name() {
        let node = IrNode::new("n1", "promptTemplate");
        let err = node
            .param::<String>("template")
            .required(&node.id, "template")
            .unwrap_err();
        assert_eq!(
            err,
            ConverterError::MissingParameter {
                node_id: "n1".to_string(),
                name: "template".to_string(),
            }
        );
    }

    #[test]
    fn numeric_strings_are_accepted_for_numbers() {
        let node = IrNode::new("n", "x").with_param("maxIterations", "7");
        assert_eq!(node.param::<i64>("maxIterations"), ParamLookup::Present(7));
    }

    #[test]
    fn anchors_resolve_by_id_then_name() {
        let node = IrNode::new("n", "x").with_input(Anchor::new("n-input-model", "model", "LLM"));
        assert!(node.input_anchor("n-input-model").is_some());
        assert!(node.input_anchor("model").is_some());
        assert!(node.output_anchor("model").is_none());
    }
}
