//! Loading OpenAPI documents into the typed model and writing them back

use crate::error::{ParseError, ParseResult};
use crate::types::OpenApi;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// OpenAPI 3.0.x document loader
pub struct DocumentLoader;

impl DocumentLoader {
    /// Parse a document from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> ParseResult<OpenApi> {
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return Err(ParseError::InvalidFormat("document is empty".to_string()));
        }
        if trimmed.starts_with('{') {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    pub fn parse_json(content: &str) -> ParseResult<OpenApi> {
        let content = Self::sanitize_large_numbers(content);
        let document: OpenApi = serde_json::from_str(&content)?;
        Self::check_version(document)
    }

    pub fn parse_yaml(content: &str) -> ParseResult<OpenApi> {
        let content = Self::sanitize_large_numbers(content);
        let document: OpenApi = serde_yaml::from_str(&content)?;
        Self::check_version(document)
    }

    /// Read a document from disk; `.json`/`.yaml`/`.yml` pick the format
    pub fn from_file(path: &Path) -> ParseResult<OpenApi> {
        debug!("Reading OpenAPI document from {:?}", path);
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Self::parse(&content),
        }
    }

    /// Fetch and parse a document from a URL
    pub async fn fetch_and_parse(url: &str) -> ParseResult<OpenApi> {
        let parsed = url::Url::parse(url).map_err(|e| ParseError::InvalidUrl(e.to_string()))?;
        info!("Fetching OpenAPI document from: {}", parsed);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ParseError::HttpError(e.to_string()))?;

        let response = client
            .get(parsed.clone())
            .header("Accept", "application/json, application/yaml, text/yaml")
            .send()
            .await
            .map_err(|e| ParseError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ParseError::FetchError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let content = response
            .text()
            .await
            .map_err(|e| ParseError::FetchError(e.to_string()))?;

        let path = parsed.path();
        if content_type.contains("yaml") || path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::parse_yaml(&content)
        } else {
            Self::parse(&content)
        }
    }

    pub fn to_json(document: &OpenApi) -> ParseResult<String> {
        Ok(serde_json::to_string_pretty(document)?)
    }

    pub fn to_yaml(document: &OpenApi) -> ParseResult<String> {
        Ok(serde_yaml::to_string(document)?)
    }

    /// Clamp integer bounds too large to parse.
    ///
    /// Some published documents use 64-bit sentinels for `minimum`/`maximum`
    /// that overflow the YAML number parser; the exact value does not matter
    /// to resolution.
    fn sanitize_large_numbers(content: &str) -> String {
        static LARGE_BOUND: OnceLock<Regex> = OnceLock::new();
        let re = LARGE_BOUND.get_or_init(|| {
            Regex::new(
                r#"(?m)((?:^\s*|"|,\s*|\{\s*)(?:minimum|maximum|exclusiveMinimum|exclusiveMaximum)"?\s*:\s*)(-?\d{16,})"#,
            )
            .expect("valid bound pattern")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let prefix = &caps[1];
            if caps[2].starts_with('-') {
                format!("{}-2147483648", prefix)
            } else {
                format!("{}2147483647", prefix)
            }
        })
        .into_owned()
    }

    /// Only 3.0.x is accepted; 3.1 allows `type` arrays the schema model
    /// does not represent.
    fn check_version(document: OpenApi) -> ParseResult<OpenApi> {
        if !document.openapi.starts_with("3.0.") {
            return Err(ParseError::UnsupportedVersion(document.openapi));
        }
        debug!(
            "Parsed OpenAPI {} document with {} paths",
            document.openapi,
            document.paths.len()
        );
        Ok(document)
    }
}
