//! List command - Show available templates.

use anyhow::{Context, Result};
use clap::Args;

use smith_templates::{TemplateCategory, TemplateLoader};

use super::Cli;

#[derive(Args)]
pub struct ListArgs {
    /// Only show templates of this category (data-source, tool, custom)
    #[arg(long)]
    category: Option<String>,

    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(cli: &Cli, args: &ListArgs) -> Result<()> {
    let engine = cli.engine_config()?;
    let catalog = TemplateLoader::new(&engine.templates_root)
        .load_all()
        .context("Failed to load templates")?;

    let templates = match &args.category {
        Some(name) => {
            let category = parse_category(name)?;
            catalog.by_category(category)
        }
        None => catalog.list(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("⚠️  No templates found in {}", engine.templates_root.display());
        return Ok(());
    }

    for t in templates {
        println!(
            "{:<20} {:<12} {:<8} {}{}",
            t.id,
            t.manifest.category,
            t.manifest.version,
            t.manifest.description.as_deref().unwrap_or("-"),
            if t.has_schema { "" } else { "  (no schema)" }
        );
    }
    Ok(())
}

fn parse_category(name: &str) -> Result<TemplateCategory> {
    match name {
        "data-source" => Ok(TemplateCategory::DataSource),
        "tool" => Ok(TemplateCategory::Tool),
        "custom" => Ok(TemplateCategory::Custom),
        other => anyhow::bail!("Unknown category argument: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("data-source").unwrap(), TemplateCategory::DataSource);
        assert!(parse_category("backend").is_err());
    }
}
