//! # openapi-resolver
//!
//! Fully dereferences OpenAPI 3.0.x documents.
//! Every `$ref` to a component schema reachable from the operation tree is
//! replaced by the schema it names, and `allOf`/`oneOf`/`anyOf` compositions
//! are flattened into plain object schemas, so consumers never follow a
//! pointer again.
//!
//! ```
//! use openapi_resolver::{resolve_fully, DocumentLoader};
//!
//! let mut doc = DocumentLoader::parse_yaml(r#"
//! openapi: "3.0.0"
//! paths:
//!   /pets:
//!     get:
//!       responses:
//!         '200':
//!           description: ok
//!           content:
//!             application/json:
//!               schema:
//!                 $ref: '#/components/schemas/Pet'
//! components:
//!   schemas:
//!     Pet:
//!       type: object
//!       properties:
//!         name:
//!           type: string
//! "#).unwrap();
//!
//! resolve_fully(&mut doc);
//!
//! let get = doc.paths["/pets"].get.as_ref().unwrap();
//! let schema = get.responses["200"].content.as_ref().unwrap()["application/json"]
//!     .schema
//!     .as_ref()
//!     .unwrap();
//! assert!(schema.reference.is_none());
//! assert!(schema.properties.as_ref().unwrap().contains_key("name"));
//! ```

mod error;
mod loader;
mod options;
mod resolver;
mod schema;
mod types;
mod walker;

pub use error::{ParseError, ParseResult, ResolveDiagnostic};
pub use loader::DocumentLoader;
pub use options::{RequiredMerge, ResolverOptions};
pub use resolver::{resolve_schema, SchemaResolver};
pub use schema::{Composition, Properties, Schema};
pub use types::*;
pub use walker::{resolve_fully, resolve_fully_with};
