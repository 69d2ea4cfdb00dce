//! mcpsmith CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Invalid configuration
//! - 4: Template error
//! - 5: Generation I/O failure

use std::process::ExitCode;

use clap::Parser;
use smith_templates::SmithError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, LogFormat};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INVALID_CONFIGURATION: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const GENERATION_IO: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Generate(ref args) => commands::generate::execute(&cli, args).await,
        Commands::List(ref args) => commands::list::execute(&cli, args).await,
        Commands::Validate(ref args) => commands::validate::execute(&cli, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "smith=debug"
    } else if cli.quiet {
        "smith=warn"
    } else {
        "smith=info"
    };
    // `smith` also covers the `smith_templates` target.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", default_level)));

    let log_result = match cli.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
    };

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.chain().find_map(|c| c.downcast_ref::<SmithError>()) {
        Some(SmithError::InvalidConfiguration { .. }) => ExitCodes::INVALID_CONFIGURATION,
        Some(SmithError::TemplateNotFound(_)) | Some(SmithError::Render { .. }) => {
            ExitCodes::TEMPLATE_ERROR
        }
        Some(SmithError::GenerationIo { .. }) => ExitCodes::GENERATION_IO,
        Some(SmithError::Config(_)) | Some(SmithError::Json(_)) | Some(SmithError::Toml(_)) => {
            ExitCodes::INVALID_ARGS
        }
        _ => ExitCodes::GENERAL_ERROR,
    }
}
