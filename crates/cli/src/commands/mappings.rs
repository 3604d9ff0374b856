//! Mappings command - inspect the tag to term table

use anyhow::{Context, Result};
use metadata_notifier_adapters::catalog::HttpCatalogSource;
use metadata_notifier_domain::{CatalogSource, MappingStore, Term, usecases::CatalogReloader};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::{MappingsArgs, MappingsCommands};
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct MappingsOutput {
    entries: Vec<MappingRow>,
    rejected: usize,
}

#[derive(Debug, Serialize)]
struct MappingRow {
    tag: String,
    #[serde(flatten)]
    term: Term,
}

pub async fn execute(args: MappingsArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        MappingsCommands::List { mapping_url, json } => {
            list_mappings(config_path, mapping_url, json).await
        }
    }
}

async fn list_mappings(
    config_path: Option<PathBuf>,
    mapping_url: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(url) = mapping_url {
        config.catalog.mapping_url = url;
    }
    config.validate()?;

    let source = Arc::new(
        HttpCatalogSource::new(&config.catalog.mapping_url, config.catalog_timeout())
            .context("Failed to initialize catalog client")?,
    );
    let reloader =
        CatalogReloader::<dyn CatalogSource>::new(source, Arc::new(MappingStore::new()));
    let parsed = reloader
        .load_table()
        .await
        .context("Failed to load mappings")?;

    let mut entries: Vec<MappingRow> = parsed
        .table
        .into_iter()
        .map(|(tag, term)| MappingRow { tag, term })
        .collect();
    entries.sort_by(|a, b| a.tag.cmp(&b.tag));

    let output = MappingsOutput {
        entries,
        rejected: parsed.rejected,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_mappings(&output);
    }

    Ok(())
}

fn print_mappings(output: &MappingsOutput) {
    println!(
        "{} mappings ({} rejected)",
        output.entries.len(),
        output.rejected
    );
    println!();

    for row in &output.entries {
        println!("{} -> {} [{}]", row.tag, row.term.id, row.term.taxonomy);
    }
}
