//! Generate command - Render a template into a server project.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use smith_templates::{GenerationOutput, Generator};

use super::{read_configuration, Cli};

#[derive(Args)]
pub struct GenerateArgs {
    /// Template to use
    #[arg(short, long)]
    template: String,

    /// JSON configuration payload (`-` for stdin)
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory (defaults to a fresh temporary directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the generation report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let engine = cli.engine_config()?;
    let config = read_configuration(&args.config)?;
    let generator = Generator::new(engine).context("Failed to set up generator")?;

    info!("Generating from template: {}", args.template);

    let template = args.template.clone();
    let output_dir = args.output.clone();
    let task = tokio::task::spawn_blocking(move || {
        generator.generate(&template, &config, output_dir.as_deref())
    });

    let joined = match args.timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Generation still running after {}s", secs);
                anyhow::bail!(
                    "Generation timed out after {}s; discard {} if it was written",
                    secs,
                    args.output
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "the temporary output directory".to_string())
                );
            }
        },
        None => task.await,
    };

    let output = match joined.context("Generation task failed")? {
        Ok(output) => output,
        Err(e) => {
            if let Some(partial) = e.partial_output() {
                eprintln!("⚠️  {} may be partially written; delete it before retrying", partial.display());
            }
            return Err(e).context(format!("Failed to generate from template '{}'", args.template));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&output, cli.quiet);
    }
    Ok(())
}

fn print_summary(output: &GenerationOutput, quiet: bool) {
    if quiet {
        println!("{}", output.path.display());
        return;
    }
    println!("✅ Generated MCP server from '{}'", output.template);
    println!();
    println!("Location: {}", output.path.display());
    println!(
        "Files:    {} copied, {} rendered, plus {}",
        output.copied.len(),
        output.rendered.len(),
        output.env_file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    println!();
    println!("⚠️  {} holds plaintext credentials.", output.env_file.display());
}
