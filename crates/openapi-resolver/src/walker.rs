//! Walks the operation tree of a document and resolves every schema leaf

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::ResolveDiagnostic;
use crate::options::ResolverOptions;
use crate::resolver::SchemaResolver;
use crate::types::{MediaType, OpenApi, Operation, Parameter, PathItem};

/// Fully resolve every schema reachable from the document's paths.
///
/// Returns the conditions reported during the pass; an empty list means every
/// reference was replaced.
pub fn resolve_fully(document: &mut OpenApi) -> Vec<ResolveDiagnostic> {
    resolve_fully_with(document, &ResolverOptions::default())
}

pub fn resolve_fully_with(
    document: &mut OpenApi,
    options: &ResolverOptions,
) -> Vec<ResolveDiagnostic> {
    let empty_schemas = IndexMap::new();
    let OpenApi {
        paths, components, ..
    } = document;
    let schemas = components
        .as_ref()
        .map(|c| &c.schemas)
        .unwrap_or(&empty_schemas);

    let mut resolver = SchemaResolver::with_options(schemas, options.clone());
    resolver.resolve_paths(paths);

    let diagnostics = resolver.take_diagnostics();
    info!(
        "Resolved {} paths against {} schemas ({} diagnostics)",
        paths.len(),
        schemas.len(),
        diagnostics.len()
    );
    diagnostics
}

impl SchemaResolver<'_> {
    /// Resolve every path item of a document
    pub fn resolve_paths(&mut self, paths: &mut IndexMap<String, PathItem>) {
        for (pathname, path_item) in paths.iter_mut() {
            debug!("Resolving path {}", pathname);
            self.resolve_path(path_item);
        }
    }

    /// Resolve one path item, including the path items of its callbacks
    pub fn resolve_path(&mut self, path_item: &mut PathItem) {
        for parameter in path_item.parameters.iter_mut() {
            self.resolve_parameter(parameter);
        }

        for (method, operation) in path_item.operations_mut() {
            debug!(
                "Resolving {} {}",
                method,
                operation.operation_id.as_deref().unwrap_or("<anonymous>")
            );
            self.resolve_operation(operation);
        }
    }

    fn resolve_operation(&mut self, operation: &mut Operation) {
        // inputs
        for parameter in operation.parameters.iter_mut() {
            self.resolve_parameter(parameter);
        }

        for (name, callback) in operation.callbacks.iter_mut() {
            let Some(path_items) = callback.path_items_mut() else {
                debug!("Leaving callback reference {} as is", name);
                continue;
            };
            for path_item in path_items.values_mut() {
                self.resolve_path(path_item);
            }
        }

        if let Some(content) = operation
            .request_body
            .as_mut()
            .and_then(|body| body.content.as_mut())
        {
            self.resolve_content(content);
        }

        // outputs
        for response in operation.responses.values_mut() {
            if let Some(content) = response.content.as_mut() {
                self.resolve_content(content);
            }
        }
    }

    fn resolve_parameter(&mut self, parameter: &mut Parameter) {
        self.resolve_slot(&mut parameter.schema);
        if let Some(content) = parameter.content.as_mut() {
            self.resolve_content(content);
        }
    }

    fn resolve_content(&mut self, content: &mut IndexMap<String, MediaType>) {
        for media_type in content.values_mut() {
            self.resolve_slot(&mut media_type.schema);
        }
    }
}
