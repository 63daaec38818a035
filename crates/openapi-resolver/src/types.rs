//! OpenAPI 3.0.x document model
//!
//! Only the parts of a document that can carry schemas are modelled in
//! detail. Everything else is kept in `extensions` maps so a document
//! survives a load, resolve, write cycle without losing content.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::Schema;

/// HTTP methods supported by OpenAPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Root of an OpenAPI document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    pub openapi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl OpenApi {
    /// Named schema definitions, if the document has any
    pub fn schemas(&self) -> Option<&IndexMap<String, Schema>> {
        self.components.as_ref().map(|c| &c.schemas)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// The schema registry references point into
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    /// Parameters shared by every operation on this path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl PathItem {
    /// Operations present on this path, in declaration order of the methods
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }

    pub fn operations_mut(&mut self) -> impl Iterator<Item = (HttpMethod, &mut Operation)> {
        [
            (HttpMethod::Get, &mut self.get),
            (HttpMethod::Put, &mut self.put),
            (HttpMethod::Post, &mut self.post),
            (HttpMethod::Delete, &mut self.delete),
            (HttpMethod::Options, &mut self.options),
            (HttpMethod::Head, &mut self.head),
            (HttpMethod::Patch, &mut self.patch),
            (HttpMethod::Trace, &mut self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_mut().map(|op| (method, op)))
    }
}

/// Callback: either a `$ref` into `components/callbacks` or a map of
/// runtime expression → path item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Callback {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(IndexMap<String, PathItem>),
}

impl Callback {
    /// Inline path items, `None` for a reference
    pub fn path_items(&self) -> Option<&IndexMap<String, PathItem>> {
        match self {
            Callback::Inline(items) => Some(items),
            Callback::Reference { .. } => None,
        }
    }

    pub fn path_items_mut(&mut self) -> Option<&mut IndexMap<String, PathItem>> {
        match self {
            Callback::Inline(items) => Some(items),
            Callback::Reference { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    #[serde(
        default,
        deserialize_with = "status_code_keys",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, Callback>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// YAML documents often leave status codes unquoted
fn status_code_keys<'de, D>(deserializer: D) -> Result<IndexMap<String, Response>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize, PartialEq, Eq, Hash)]
    #[serde(untagged)]
    enum StatusKey {
        Code(u64),
        Text(String),
    }

    let raw = IndexMap::<StatusKey, Response>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, response)| match key {
            StatusKey::Code(code) => (code.to_string(), response),
            StatusKey::Text(text) => (text, response),
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (empty when `$ref` is used)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Parameter location (empty when `$ref` is used)
    #[serde(rename = "in", default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Per-media-type content, used instead of `schema` for complex parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    /// Reference to `components/parameters`; left as is
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operations_in_method_order() {
        let item: PathItem = serde_json::from_value(json!({
            "post": {"operationId": "create"},
            "get": {"operationId": "list"},
            "x-internal": true
        }))
        .unwrap();

        let ops: Vec<_> = item
            .operations()
            .map(|(m, op)| (m, op.operation_id.clone().unwrap()))
            .collect();
        assert_eq!(
            ops,
            vec![
                (HttpMethod::Get, "list".to_string()),
                (HttpMethod::Post, "create".to_string())
            ]
        );
        assert_eq!(item.extensions.get("x-internal"), Some(&json!(true)));
    }

    #[test]
    fn test_callbacks_nest_path_items() {
        let op: Operation = serde_json::from_value(json!({
            "callbacks": {
                "onEvent": {
                    "{$request.body#/url}": {
                        "post": {
                            "requestBody": {
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Event"}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();

        let callback = op.callbacks["onEvent"].path_items().unwrap();
        let item = &callback["{$request.body#/url}"];
        let body = item.post.as_ref().unwrap().request_body.as_ref().unwrap();
        let schema = body.content.as_ref().unwrap()["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(schema.reference_name(), Some("Event"));
    }

    #[test]
    fn test_callback_reference() {
        let op: Operation = serde_json::from_value(json!({
            "callbacks": {
                "onEvent": {"$ref": "#/components/callbacks/E"}
            }
        }))
        .unwrap();

        assert_eq!(
            op.callbacks["onEvent"],
            Callback::Reference {
                reference: "#/components/callbacks/E".to_string()
            }
        );
        assert!(op.callbacks["onEvent"].path_items().is_none());
        assert_eq!(
            serde_json::to_value(&op.callbacks["onEvent"]).unwrap(),
            json!({"$ref": "#/components/callbacks/E"})
        );
    }

    #[test]
    fn test_unquoted_status_codes() {
        let op: Operation = serde_yaml::from_str(
            r#"
operationId: getPet
x-rate-limit: 10
responses:
  200:
    description: ok
  default:
    description: error
"#,
        )
        .unwrap();

        let codes: Vec<_> = op.responses.keys().cloned().collect();
        assert_eq!(codes, vec!["200", "default"]);
        assert_eq!(op.extensions.get("x-rate-limit"), Some(&json!(10)));
    }

    #[test]
    fn test_document_round_trip_keeps_unmodelled_fields() {
        let value = json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1.0.0"},
            "servers": [{"url": "https://example.com"}],
            "paths": {
                "/pets": {
                    "get": {
                        "operationId": "listPets",
                        "responses": {
                            "200": {
                                "description": "ok",
                                "headers": {"X-Rate": {"schema": {"type": "integer"}}}
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {"Pet": {"type": "object"}},
                "securitySchemes": {"key": {"type": "apiKey", "name": "k", "in": "header"}}
            }
        });

        let doc: OpenApi = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(doc.schemas().unwrap().len(), 1);
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
    }
}
