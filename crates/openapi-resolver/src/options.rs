//! Resolver configuration
//!
//! Options are plain serde data so the surrounding tool can keep them in a
//! JSON file next to the documents it processes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::ParseResult;

/// How required property names are collected while flattening a composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredMerge {
    /// A property is required when its name is in the member's `required` list
    #[default]
    ByName,
    /// A property is required when the member's `required` list has an entry
    /// at the property's position in the member's property order
    Positional,
}

/// Options controlling a resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Required-name tracking used when flattening compositions
    pub required_merge: RequiredMerge,
    /// Also resolve inline (non-reference) array item schemas
    pub resolve_inline_items: bool,
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required_merge(mut self, required_merge: RequiredMerge) -> Self {
        self.required_merge = required_merge;
        self
    }

    pub fn with_inline_items(mut self, resolve_inline_items: bool) -> Self {
        self.resolve_inline_items = resolve_inline_items;
        self
    }

    /// Load options from a JSON file; missing keys fall back to defaults
    pub fn load(path: &Path) -> ParseResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&content)?;
        debug!("Loaded resolver options from {:?}: {:?}", path, options);
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ResolverOptions::default();
        assert_eq!(options.required_merge, RequiredMerge::ByName);
        assert!(!options.resolve_inline_items);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: ResolverOptions =
            serde_json::from_str(r#"{"requiredMerge": "positional"}"#).unwrap();
        assert_eq!(options.required_merge, RequiredMerge::Positional);
        assert!(!options.resolve_inline_items);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"resolveInlineItems": true}}"#).unwrap();

        let options = ResolverOptions::load(file.path()).unwrap();
        assert!(options.resolve_inline_items);
        assert_eq!(options.required_merge, RequiredMerge::ByName);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ResolverOptions::load(Path::new("/nonexistent/options.json"));
        assert!(matches!(result, Err(crate::ParseError::IoError(_))));
    }
}
