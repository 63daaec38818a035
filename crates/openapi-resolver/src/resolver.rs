//! Full `$ref` resolver for OpenAPI schemas
//!
//! Replaces every reference to a named component schema with the schema it
//! points at and flattens `allOf`/`oneOf`/`anyOf` compositions into plain
//! object schemas. Reference cycles are broken with a generic
//! `{type: object}` placeholder at the slot where the cycle closes.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use tracing::{debug, error, Level};

use crate::error::ResolveDiagnostic;
use crate::options::{RequiredMerge, ResolverOptions};
use crate::schema::{Properties, Schema};

/// Resolution state of a named schema within one pass
#[derive(Debug, Clone)]
enum CacheEntry {
    /// Being resolved further up the stack; holds the raw registry schema
    Pending(Schema),
    /// Fully resolved
    Done(Schema),
}

/// Outcome of resolving one node.
///
/// `Pending` is the cycle sentinel: the raw schema of a definition that is
/// still being resolved by an ancestor call. It is kept distinct from a
/// regular result so callers can tell "this is my ancestor" by handle
/// rather than by comparing structure.
#[derive(Debug)]
enum Resolved {
    Schema(Schema),
    Pending { name: String, sentinel: Schema },
}

impl Resolved {
    /// Value to attach to a slot in the output tree
    fn into_slot(self) -> Schema {
        match self {
            Resolved::Schema(schema) => schema,
            Resolved::Pending { .. } => Schema::generic_object(),
        }
    }

    /// Value whose content is read, not attached
    fn into_content(self) -> Schema {
        match self {
            Resolved::Schema(schema) => schema,
            Resolved::Pending { sentinel, .. } => sentinel,
        }
    }
}

/// Resolves component schema references and flattens compositions.
///
/// The resolution cache lives as long as the resolver: every call on the
/// same value shares it. Build a new resolver per document pass.
pub struct SchemaResolver<'a> {
    /// Component schemas from the OpenAPI document
    schemas: &'a IndexMap<String, Schema>,
    options: ResolverOptions,
    resolved_models: HashMap<String, CacheEntry>,
    diagnostics: Vec<ResolveDiagnostic>,
}

impl<'a> SchemaResolver<'a> {
    /// Create a new resolver with the given component schemas
    pub fn new(schemas: &'a IndexMap<String, Schema>) -> Self {
        Self::with_options(schemas, ResolverOptions::default())
    }

    pub fn with_options(schemas: &'a IndexMap<String, Schema>, options: ResolverOptions) -> Self {
        Self {
            schemas,
            options,
            resolved_models: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Conditions reported so far, in the order they occurred
    pub fn diagnostics(&self) -> &[ResolveDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<ResolveDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Resolve a schema, returning its fully dereferenced, flattened form.
    ///
    /// Never fails: problems are reported as diagnostics and the affected
    /// node is returned as it was.
    pub fn resolve_schema(&mut self, schema: Schema) -> Schema {
        self.resolve(schema).into_slot()
    }

    /// Resolve the schema held in `slot` in place
    pub(crate) fn resolve_slot(&mut self, slot: &mut Option<Schema>) {
        if let Some(schema) = slot.take() {
            *slot = Some(self.resolve_schema(schema));
        }
    }

    fn resolve(&mut self, schema: Schema) -> Resolved {
        if schema.is_reference() {
            return self.resolve_reference(schema);
        }
        if schema.is_array() {
            return Resolved::Schema(self.resolve_array(schema));
        }
        if schema.has_properties() {
            return Resolved::Schema(self.resolve_object(schema));
        }
        if schema.is_composed() {
            return Resolved::Schema(self.resolve_composed(schema));
        }

        self.report(ResolveDiagnostic::NoTypeMatch {
            schema: schema.summary(),
        });
        Resolved::Schema(schema)
    }

    fn resolve_reference(&mut self, schema: Schema) -> Resolved {
        let name = schema.reference_name().unwrap_or_default().to_string();
        let schemas = self.schemas;

        let Some(target) = schemas.get(&name) else {
            self.report(ResolveDiagnostic::UnresolvedReference {
                name,
                reference: schema.reference.clone().unwrap_or_default(),
            });
            return Resolved::Schema(schema);
        };

        match self.resolved_models.get(&name) {
            Some(CacheEntry::Pending(sentinel)) => {
                let sentinel = sentinel.clone();
                self.report(ResolveDiagnostic::CycleAvoided { name: name.clone() });
                return Resolved::Pending { name, sentinel };
            }
            Some(CacheEntry::Done(model)) => return Resolved::Schema(model.clone()),
            None => {}
        }

        self.resolved_models
            .insert(name.clone(), CacheEntry::Pending(target.clone()));

        let model = self.resolve(target.clone()).into_slot();

        // no loop closed on this name, so the reference can be replaced
        self.resolved_models
            .insert(name, CacheEntry::Done(model.clone()));
        Resolved::Schema(model)
    }

    /// Only item schemas that are references are resolved unless
    /// `resolve_inline_items` is set.
    fn resolve_array(&mut self, mut schema: Schema) -> Schema {
        if let Some(items) = schema.items.take() {
            let items = if items.is_reference() || self.options.resolve_inline_items {
                self.resolve_schema(*items)
            } else {
                *items
            };
            schema.items = Some(Box::new(items));
        }
        schema
    }

    fn resolve_object(&mut self, mut schema: Schema) -> Schema {
        let properties = schema.properties.take().unwrap_or_default();
        let mut updated = Properties::with_capacity(properties.len());

        for (key, property) in properties {
            let property = match self.resolve(property) {
                Resolved::Schema(mut property) => {
                    if property.schema_type.is_none() {
                        property.schema_type = Some("object".to_string());
                    }
                    property
                }
                Resolved::Pending { name, .. } => {
                    debug!(
                        "not adding recursive property {} ({}), using generic object",
                        key, name
                    );
                    Schema::generic_object()
                }
            };
            updated.insert(key, property);
        }

        schema.properties = Some(updated);
        schema
    }

    fn resolve_composed(&mut self, mut schema: Schema) -> Schema {
        let mut properties = Properties::new();
        let mut required_properties: IndexSet<String> = IndexSet::new();
        let mut extensions = IndexMap::new();

        let Some((kind, members)) = schema.take_composition() else {
            return schema;
        };
        debug!("flattening {} with {} members", kind.keyword(), members.len());

        for member in members {
            let resolved = self.resolve(member).into_content();
            for (key, value) in resolved.vendor_extensions() {
                extensions.insert(key.clone(), value.clone());
            }

            let member_required = resolved.required.unwrap_or_default();
            let Some(member_properties) = resolved.properties else {
                continue;
            };
            for (position, (key, property)) in member_properties.into_iter().enumerate() {
                if self.is_required(&key, position, &member_required) {
                    required_properties.insert(key.clone());
                }
                let property = self.resolve_schema(property);
                properties.insert(key, property);
            }
        }

        for (key, value) in schema.vendor_extensions() {
            extensions.insert(key.clone(), value.clone());
        }

        let mut model = Schema::object(properties);
        if !required_properties.is_empty() {
            model.required = Some(required_properties.into_iter().collect());
        }
        model.extensions = extensions;
        model
    }

    fn is_required(&self, key: &str, position: usize, required: &[String]) -> bool {
        match self.options.required_merge {
            RequiredMerge::ByName => required.iter().any(|name| name == key),
            RequiredMerge::Positional => required.get(position).is_some(),
        }
    }

    fn report(&mut self, diagnostic: ResolveDiagnostic) {
        if diagnostic.level() == Level::DEBUG {
            debug!("{}", diagnostic);
        } else {
            error!("{}", diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Resolve a single schema against `schemas` with a fresh cache
pub fn resolve_schema(schemas: &IndexMap<String, Schema>, schema: Schema) -> Schema {
    SchemaResolver::new(schemas).resolve_schema(schema)
}
