//! help-openapi - Command-line tool for generating OpenAPI documentation from a
//! local service's self-describing `/help` endpoint.
//!
//! # Usage
//!
//! ```bash
//! PORT=2999 SECRET=... help-openapi [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Write the document to a file:
//! ```bash
//! help-openapi --port 2999 --secret hunter2 -o out/openapi.json
//! ```
//!
//! Rename ambiguous types and keep the intermediate maps:
//! ```bash
//! help-openapi --overrides overrides.json --dump-dir dist -o out/openapi.json
//! ```

use anyhow::Result;
use clap::Parser;
use help_openapi::cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("help-openapi starting...");

    let args = cli::parse_args_from_parsed(args)?;

    cli::run(args).await?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
