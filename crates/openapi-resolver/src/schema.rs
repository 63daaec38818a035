//! Schema object model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered property mapping of an object schema
pub type Properties = IndexMap<String, Schema>;

/// A single OpenAPI schema node.
///
/// The shapes below are not mutually exclusive in a parsed document; the
/// resolver tests them in a fixed priority order (reference, array, object,
/// composed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Item schema of an array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Kept verbatim; never walked for references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    /// `x-*` vendor extensions and any keyword not modelled above
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Which composition keyword a composed schema uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    AllOf,
    OneOf,
    AnyOf,
}

impl Composition {
    pub fn keyword(&self) -> &'static str {
        match self {
            Composition::AllOf => "allOf",
            Composition::OneOf => "oneOf",
            Composition::AnyOf => "anyOf",
        }
    }
}

impl Schema {
    /// A reference schema pointing at `reference`
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// A bare schema with only a type tag
    pub fn typed(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    /// Generic `{type: object}` schema with no properties
    pub fn generic_object() -> Self {
        Self::typed("object")
    }

    /// An array schema with the given item schema
    pub fn array_of(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// An object schema with the given properties
    pub fn object(properties: Properties) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// Name of the referenced definition: the text after the last `/`
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(|r| r.rsplit_once('/').map_or(r, |(_, name)| name))
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array") || self.items.is_some()
    }

    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    pub fn is_composed(&self) -> bool {
        self.composition().is_some()
    }

    /// The first non-empty composition group, in all-of, one-of, any-of order
    pub fn composition(&self) -> Option<(Composition, &[Schema])> {
        [
            (Composition::AllOf, &self.all_of),
            (Composition::OneOf, &self.one_of),
            (Composition::AnyOf, &self.any_of),
        ]
        .into_iter()
        .find_map(|(kind, group)| match group {
            Some(members) if !members.is_empty() => Some((kind, members.as_slice())),
            _ => None,
        })
    }

    /// Take the first non-empty composition group, clearing all three
    pub fn take_composition(&mut self) -> Option<(Composition, Vec<Schema>)> {
        let kind = self.composition()?.0;
        let members = match kind {
            Composition::AllOf => self.all_of.take(),
            Composition::OneOf => self.one_of.take(),
            Composition::AnyOf => self.any_of.take(),
        };
        self.all_of = None;
        self.one_of = None;
        self.any_of = None;
        members.map(|m| (kind, m))
    }

    /// Vendor extensions (`x-*` keys) only
    pub fn vendor_extensions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.extensions.iter().filter(|(k, _)| k.starts_with("x-"))
    }

    /// Short description used in diagnostics
    pub fn summary(&self) -> String {
        match (&self.schema_type, &self.format) {
            (Some(t), Some(f)) => format!("{{type: {}, format: {}}}", t, f),
            (Some(t), None) => format!("{{type: {}}}", t),
            _ => serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string()),
        }
    }
}
