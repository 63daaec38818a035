//! openapi-resolve - fully dereference an OpenAPI document
//!
//! Loads a document from a file or URL, replaces every component schema
//! reference reachable from its operations with the referenced schema, and
//! writes the result as JSON or YAML.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use openapi_resolver::{
    resolve_fully_with, DocumentLoader, OpenApi, ParseResult, RequiredMerge, ResolverOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

/// Fully resolve component schema references in an OpenAPI 3.0.x document
#[derive(Parser, Debug)]
#[command(name = "openapi-resolve")]
#[command(version)]
#[command(about = "Replace $ref schemas with their definitions and flatten allOf/oneOf/anyOf")]
struct Args {
    /// Path or http(s) URL of the OpenAPI document
    input: String,

    /// Write the resolved document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (defaults to the input's format)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// JSON file with resolver options
    #[arg(long, env = "OPENAPI_RESOLVE_CONFIG")]
    config: Option<PathBuf>,

    /// Mark composed properties required by position instead of by name
    #[arg(long)]
    positional_required: bool,

    /// Also resolve inline array item schemas
    #[arg(long)]
    resolve_inline_items: bool,

    /// Exit with status 2 if any reference could not be resolved
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn is_url(&self) -> bool {
        url::Url::parse(&self.input)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    fn resolver_options(&self) -> ParseResult<ResolverOptions> {
        let mut options = match &self.config {
            Some(path) => ResolverOptions::load(path)?,
            None => ResolverOptions::default(),
        };
        if self.positional_required {
            options.required_merge = RequiredMerge::Positional;
        }
        if self.resolve_inline_items {
            options.resolve_inline_items = true;
        }
        Ok(options)
    }

    fn output_format(&self) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        let target = self
            .output
            .as_deref()
            .unwrap_or_else(|| Path::new(&self.input));
        match target.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

async fn load(args: &Args) -> ParseResult<OpenApi> {
    if args.is_url() {
        DocumentLoader::fetch_and_parse(&args.input).await
    } else {
        DocumentLoader::from_file(Path::new(&args.input))
    }
}

/// `RUST_LOG` when set, `warn` otherwise
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn operation_count(document: &OpenApi) -> usize {
    document
        .paths
        .values()
        .map(|item| item.operations().count())
        .sum()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays a clean document
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .init();

    let options = args
        .resolver_options()
        .map_err(|e| format!("Failed to load resolver options: {}", e))?;
    let mut document = load(&args)
        .await
        .map_err(|e| format!("Failed to load {}: {}", args.input, e))?;
    info!(
        "Loaded {}: {} operations, {} schemas",
        args.input,
        operation_count(&document),
        document.schemas().map_or(0, |schemas| schemas.len())
    );

    let diagnostics = resolve_fully_with(&mut document, &options);
    let unresolved = diagnostics.iter().filter(|d| d.is_unresolved()).count();
    info!(
        "Resolution finished: {} diagnostics, {} unresolved references",
        diagnostics.len(),
        unresolved
    );

    let rendered = match args.output_format() {
        OutputFormat::Json => DocumentLoader::to_json(&document)?,
        OutputFormat::Yaml => DocumentLoader::to_yaml(&document)?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Wrote resolved document to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    if args.strict && unresolved > 0 {
        warn!("{} references could not be resolved", unresolved);
        std::process::exit(2);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["openapi-resolve", "api.yaml", "--strict"]);
        assert_eq!(args.input, "api.yaml");
        assert!(args.strict);
        assert!(!args.is_url());
        assert_eq!(args.output_format(), OutputFormat::Yaml);
    }

    #[test]
    fn test_url_input() {
        let args = Args::parse_from(["openapi-resolve", "https://example.com/openapi.json"]);
        assert!(args.is_url());
        assert_eq!(args.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "openapi-resolve",
            "api.json",
            "--positional-required",
            "--resolve-inline-items",
            "--format",
            "yaml",
        ]);

        let options = args.resolver_options().unwrap();
        assert_eq!(options.required_merge, RequiredMerge::Positional);
        assert!(options.resolve_inline_items);
        assert_eq!(args.output_format(), OutputFormat::Yaml);
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        use tracing::level_filters::LevelFilter;

        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::DEBUG));

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_operation_count() {
        let document = DocumentLoader::parse(
            r#"{"openapi": "3.0.0", "paths": {
                "/pets": {"get": {}, "post": {}},
                "/pets/{id}": {"delete": {}, "parameters": []}
            }}"#,
        )
        .unwrap();
        assert_eq!(operation_count(&document), 3);
        assert!(document.schemas().is_none());
    }

    #[test]
    fn test_output_extension_picks_format() {
        let args = Args::parse_from(["openapi-resolve", "api.yaml", "-o", "out.json"]);
        assert_eq!(args.output_format(), OutputFormat::Json);
    }
}
