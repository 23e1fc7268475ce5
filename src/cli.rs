use crate::client::HelpClient;
use crate::config::{NameOverrides, ResponsePolicy, StatusCodeStyle};
use crate::endpoint::EndpointTranslator;
use crate::help::{AppInfo, ConsoleHelp, FullHelp};
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::schema_generator::{SchemaGenerator, TypeTranslator};
use crate::serializer::{serialize_fragment, serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Generates an OpenAPI document from a local service's /help endpoint
#[derive(Parser, Debug)]
#[command(name = "help-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Port the local service listens on (https://127.0.0.1:<PORT>)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Shared secret used as the basic-auth password
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: String,

    /// Full base URL of the service, overrides --port
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<Url>,

    /// JSON file mapping raw type names to output names
    #[arg(long = "overrides", value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// How success responses are keyed
    #[arg(long = "status-style", value_enum, default_value = "range")]
    pub status_style: StatusCodeStyle,

    /// Attach a 403 response to every operation
    #[arg(long = "forbidden-response")]
    pub forbidden_response: bool,

    /// Also write schemas.json and paths.json into this directory
    #[arg(long = "dump-dir", value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: port={:?} base_url={:?}", args.port, args.base_url);

    if args.port.is_none() && args.base_url.is_none() {
        anyhow::bail!("Either --port (or PORT) or --base-url must be given");
    }

    if let Some(ref overrides) = args.overrides {
        if !overrides.is_file() {
            anyhow::bail!("Overrides file does not exist: {}", overrides.display());
        }
        info!("Name overrides: {}", overrides.display());
    }

    info!("Output format: {:?}", args.output_format);
    match args.output_path {
        Some(ref output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    info!(
        "Responses: {:?}{}",
        args.status_style,
        if args.forbidden_response { " + 403" } else { "" }
    );

    Ok(args)
}

/// The three payloads one run is built from
#[derive(Debug, Clone, Default)]
pub struct Introspection {
    pub app_info: AppInfo,
    pub console: ConsoleHelp,
    pub full: FullHelp,
}

/// Fetches all introspection payloads concurrently. Any failure aborts.
pub async fn fetch_introspection(client: &HelpClient) -> Result<Introspection> {
    info!("Fetching app info and \"Console\"/\"Full\" help from {}", client.base_url());
    let (app_info, console, full) = tokio::try_join!(
        client.fetch_app_info(),
        client.fetch_console_help(),
        client.fetch_full_help(),
    )
    .context("Failed to fetch introspection data")?;

    info!(
        "Fetched {} types, {} console functions, {} full functions",
        console.types.len(),
        console.functions.len(),
        full.functions.len()
    );
    Ok(Introspection {
        app_info,
        console,
        full,
    })
}

/// Runs both catalog builders and assembles the document. Pure: no I/O.
pub fn generate(
    introspection: &Introspection,
    overrides: NameOverrides,
    policy: ResponsePolicy,
    server_url: &str,
) -> OpenApiDocument {
    let translator = TypeTranslator::new(overrides);

    let mut schema_gen = SchemaGenerator::new(translator.clone());
    schema_gen.add_types(&introspection.console.types);
    let schemas = schema_gen.into_schemas();
    info!("Generated {} schemas", schemas.len());

    let mut builder = OpenApiBuilder::new(EndpointTranslator::new(translator, policy))
        .with_app_info(&introspection.app_info)
        .with_server(server_url);
    builder.add_functions(&introspection.console, &introspection.full);
    info!("Generated {} paths", builder.paths().len());

    builder.build(schemas)
}

/// Run the main workflow
pub async fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let overrides = match &args.overrides {
        Some(path) => NameOverrides::load(path)
            .with_context(|| format!("Failed to load overrides from {}", path.display()))?,
        None => NameOverrides::new(),
    };

    let timeout = Duration::from_secs(args.timeout);
    let client = match (&args.base_url, args.port) {
        (Some(base_url), _) => HelpClient::with_base_url(base_url.clone(), args.secret.clone(), timeout)?,
        (None, Some(port)) => HelpClient::new(port, args.secret.clone(), timeout)?,
        (None, None) => anyhow::bail!("No service address given"),
    };

    let introspection = fetch_introspection(&client).await?;

    let policy = ResponsePolicy {
        status_code_style: args.status_style,
        include_forbidden_response: args.forbidden_response,
    };
    let document = generate(&introspection, overrides, policy, &client.base_url());

    if let Some(dir) = &args.dump_dir {
        info!("Writing intermediate schemas and paths to {}", dir.display());
        write_to_file(
            &serialize_fragment(&document.components.schemas, "schemas")?,
            &dir.join("schemas.json"),
        )?;
        write_to_file(&serialize_fragment(&document.paths, "paths")?, &dir.join("paths.json"))?;
    }

    let content = match args.output_format {
        OutputFormat::Json => serialize_json(&document)?,
        OutputFormat::Yaml => serialize_yaml(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Summary:");
    info!("  - Schemas: {}", document.components.schemas.len());
    info!("  - Paths: {}", document.paths.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("help-openapi").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--port", "2999", "--secret", "abc"]);
        assert_eq!(args.port, Some(2999));
        assert!(matches!(args.output_format, OutputFormat::Json));
        assert_eq!(args.status_style, StatusCodeStyle::Range);
        assert!(!args.forbidden_response);
        assert_eq!(args.timeout, 30);
    }

    #[test]
    fn test_response_policy_flags() {
        let args = parse(&[
            "--port",
            "1",
            "--secret",
            "abc",
            "--status-style",
            "exact",
            "--forbidden-response",
            "-f",
            "yaml",
        ]);
        assert_eq!(args.status_style, StatusCodeStyle::Exact);
        assert!(args.forbidden_response);
        assert!(matches!(args.output_format, OutputFormat::Yaml));
    }

    #[test]
    fn test_address_is_required() {
        let args = CliArgs {
            port: None,
            base_url: None,
            ..parse(&["--secret", "abc"])
        };
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_missing_overrides_file_is_rejected() {
        let args = parse(&["--port", "1", "--secret", "abc", "--overrides", "/no/such/file.json"]);
        assert!(parse_args_from_parsed(args).is_err());
    }
}
