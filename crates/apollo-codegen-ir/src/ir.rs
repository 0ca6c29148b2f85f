//! The compiled representation of operations and fragments, consumed by code generators.
//!
//! Every type here serializes to JSON with camelCase keys.
//! GraphQL types serialize in GraphQL syntax, for example `[String!]!`.

use apollo_compiler::ast;
use apollo_compiler::ast::NamedType;
use apollo_compiler::ast::OperationType;
use apollo_compiler::ast::Type;
use apollo_compiler::Name;
use apollo_compiler::Node;
use indexmap::IndexMap;
use serde::Serialize;
use serde::Serializer;
use std::fmt;
use std::path::PathBuf;

/// Everything compiled from one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDocument {
    pub operations: IndexMap<Name, CompiledOperation>,
    pub fragments: IndexMap<Name, CompiledFragment>,
    /// Enums, input objects, and custom scalars referenced anywhere in the document
    pub types_used: Vec<NamedType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub operation_name: Name,
    #[serde(serialize_with = "serialize_display")]
    pub operation_type: OperationType,
    pub root_type: NamedType,
    pub variables: Vec<Variable>,
    /// The operation printed back to GraphQL syntax
    pub source: String,
    /// `source` followed by the source of every fragment in `fragments_referenced`
    pub source_with_fragments: String,
    pub fields: Vec<Field>,
    /// Every fragment reachable from this operation, transitively
    pub fragments_referenced: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub fragment_name: Name,
    pub source: String,
    pub type_condition: NamedType,
    pub possible_types: Vec<NamedType>,
    pub fields: Vec<Field>,
    pub fragment_spreads: Vec<Name>,
    pub inline_fragments: Vec<InlineFragment>,
    pub fragments_referenced: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: Name,
    #[serde(rename = "type", serialize_with = "serialize_display")]
    pub ty: Type,
}

/// One response key of a selection, after merging every selection that contributes to it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub response_name: Name,
    pub field_name: Name,
    #[serde(rename = "type", serialize_with = "serialize_display")]
    pub ty: Type,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
    /// Some contributing selection carries `@skip` or `@include`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_conditional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present if and only if the field has an object, interface, or union type
    #[serde(flatten)]
    pub selection_set: Option<SelectionSet>,
}

/// The resolved sub-selections of a composite field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSet {
    pub fields: Vec<Field>,
    /// Fragments spread at this exact type, or at an abstract type containing it
    pub fragment_spreads: Vec<Name>,
    /// One branch per concrete type selected through a narrower type condition
    pub inline_fragments: Vec<InlineFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineFragment {
    pub type_condition: NamedType,
    pub possible_types: Vec<NamedType>,
    /// Fields selected on the abstract parent are repeated here alongside those of this branch
    pub fields: Vec<Field>,
    pub fragment_spreads: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: Name,
    pub value: serde_json::Value,
}

impl CompiledDocument {
    pub fn operation(&self, name: &str) -> Option<&CompiledOperation> {
        self.operations.get(name)
    }

    pub fn fragment(&self, name: &str) -> Option<&CompiledFragment> {
        self.fragments.get(name)
    }
}

impl CompiledOperation {
    pub fn field(&self, response_name: &str) -> Option<&Field> {
        find_field(&self.fields, response_name)
    }
}

impl CompiledFragment {
    pub fn field(&self, response_name: &str) -> Option<&Field> {
        find_field(&self.fields, response_name)
    }

    pub fn inline_fragment(&self, type_condition: &str) -> Option<&InlineFragment> {
        find_inline_fragment(&self.inline_fragments, type_condition)
    }
}

impl Field {
    /// Returns a nested field by response name, `None` for leaf fields
    pub fn field(&self, response_name: &str) -> Option<&Field> {
        find_field(&self.selection_set.as_ref()?.fields, response_name)
    }

    /// Nested fields, empty for leaf fields
    pub fn fields(&self) -> &[Field] {
        match &self.selection_set {
            Some(selection_set) => &selection_set.fields,
            None => &[],
        }
    }

    /// Fragments spread directly into this field's selection set, empty for leaf fields
    pub fn fragment_spreads(&self) -> &[Name] {
        match &self.selection_set {
            Some(selection_set) => &selection_set.fragment_spreads,
            None => &[],
        }
    }

    /// Concrete type branches of this field's selection set, empty for leaf fields
    pub fn inline_fragments(&self) -> &[InlineFragment] {
        match &self.selection_set {
            Some(selection_set) => &selection_set.inline_fragments,
            None => &[],
        }
    }

    pub fn inline_fragment(&self, type_condition: &str) -> Option<&InlineFragment> {
        find_inline_fragment(self.inline_fragments(), type_condition)
    }
}

impl InlineFragment {
    pub fn field(&self, response_name: &str) -> Option<&Field> {
        find_field(&self.fields, response_name)
    }
}

impl Argument {
    pub(crate) fn from_ast(argument: &Node<ast::Argument>) -> Self {
        Self {
            name: argument.name.clone(),
            value: value_to_json(&argument.value),
        }
    }
}

fn find_field<'a>(fields: &'a [Field], response_name: &str) -> Option<&'a Field> {
    fields
        .iter()
        .find(|field| field.response_name.as_str() == response_name)
}

fn find_inline_fragment<'a>(
    inline_fragments: &'a [InlineFragment],
    type_condition: &str,
) -> Option<&'a InlineFragment> {
    inline_fragments
        .iter()
        .find(|inline| inline.type_condition.as_str() == type_condition)
}

/// Convert a literal argument value without coercing it to its input type.
///
/// Variables become `{"kind": "Variable", "variableName": "…"}`,
/// enum values become strings.
fn value_to_json(value: &ast::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        ast::Value::Null => Json::Null,
        ast::Value::Enum(name) => Json::from(name.as_str()),
        ast::Value::Variable(name) => serde_json::json!({
            "kind": "Variable",
            "variableName": name.as_str(),
        }),
        ast::Value::String(value) => Json::from(value.as_str()),
        ast::Value::Float(value) => float_to_json(value.as_str()),
        ast::Value::Int(value) => match value.as_str().parse::<i64>() {
            Ok(int) => Json::from(int),
            // larger than any JSON integer, keep the magnitude
            Err(_) => float_to_json(value.as_str()),
        },
        ast::Value::Boolean(value) => Json::Bool(*value),
        ast::Value::List(items) => {
            Json::Array(items.iter().map(|item| value_to_json(item)).collect())
        }
        ast::Value::Object(fields) => Json::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value_to_json(value)))
                .collect(),
        ),
    }
}

fn float_to_json(repr: &str) -> serde_json::Value {
    repr.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn serialize_display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
