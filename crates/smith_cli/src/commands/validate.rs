//! Validate command - Check a configuration against a template schema.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use smith_templates::{Generator, SmithError};

use super::{read_configuration, Cli};

#[derive(Args)]
pub struct ValidateArgs {
    /// Template to validate against
    #[arg(short, long)]
    template: String,

    /// JSON configuration payload (`-` for stdin)
    #[arg(short, long)]
    config: PathBuf,
}

pub async fn execute(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    info!("Validating configuration for template: {}", args.template);

    let engine = cli.engine_config()?;
    let config = read_configuration(&args.config)?;
    let generator = Generator::new(engine).context("Failed to set up generator")?;

    let report = generator.check(&args.template, &config)?;

    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }

    if !report.valid {
        println!("❌ Configuration rejected:");
        for error in &report.errors {
            println!("   - {}", error);
        }
        return Err(SmithError::InvalidConfiguration {
            template: args.template.clone(),
            reasons: report.errors,
        }
        .into());
    }

    println!("✅ Configuration is valid for '{}'", args.template);
    Ok(())
}
