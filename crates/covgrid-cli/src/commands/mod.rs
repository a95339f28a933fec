//! Command implementations

mod config;
mod coverage;
mod grid;
mod order;
mod search;
mod zone;

use crate::cli::{CatalogOptions, Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use covgrid_client::{HttpCatalogClient, MemoryCatalog};
use covgrid_core::config::LayeredConfig;
use covgrid_core::ports::CatalogClient;
use covgrid_geo::GeoPolygon;
use covgrid_pipeline::SearchTemplate;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match &cli.command {
        Commands::Zone(args) => zone::execute(args, &output),
        Commands::Grid(args) => grid::execute(&cli, args, &output),
        Commands::Coverage(args) => coverage::execute(&cli, args, &output).await,
        Commands::Search(args) => search::execute(&cli, args, &output).await,
        Commands::Order(args) => order::execute(&cli, args, &output).await,
        Commands::Config => config::execute(&cli, &output),
    }
}

fn load_aoi(path: &Path) -> Result<GeoPolygon> {
    covgrid_geo::load_aoi_file(path).with_context(|| format!("Failed to load AOI from {}", path.display()))
}

/// In-memory catalog when `--items` is given, otherwise the Data API
fn catalog_for(options: &CatalogOptions, config: &LayeredConfig) -> Result<Box<dyn CatalogClient>> {
    match &options.items {
        Some(path) => {
            let catalog = MemoryCatalog::load(path, &config.item_type())
                .with_context(|| format!("Failed to load items from {}", path.display()))?;
            tracing::debug!(items = catalog.len(), path = %path.display(), "Loaded item file");
            Ok(Box::new(catalog))
        }
        None => {
            let context = config.api_context()?;
            Ok(Box::new(HttpCatalogClient::new(context)?))
        }
    }
}

fn search_template(options: &CatalogOptions, config: &LayeredConfig) -> SearchTemplate {
    let template = SearchTemplate::new(config.item_type())
        .acquired_between(options.start, options.end)
        .with_limit(config.result_cap.value);
    match options.max_cloud {
        Some(max) => template.max_cloud_cover(max),
        None => template,
    }
}
