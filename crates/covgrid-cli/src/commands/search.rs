//! Search command implementation

use crate::cli::{Cli, SearchArgs};
use crate::config_loader::{load_with_overrides, overrides};
use crate::output::OutputWriter;
use crate::output_types::{ItemRow, SearchOutput};
use crate::progress::{create_spinner, finish_success};
use anyhow::{Context, Result};
use covgrid_core::models::Item;
use covgrid_core::ports::CatalogClient;
use std::fs;

pub async fn execute(cli: &Cli, args: &SearchArgs, output: &OutputWriter) -> Result<()> {
    let config = load_with_overrides(cli, overrides(None, Some(&args.catalog)))?;
    let aoi = super::load_aoi(&args.aoi)?;
    let catalog = super::catalog_for(&args.catalog, &config)?;
    let request = super::search_template(&args.catalog, &config).to_request(&aoi);

    let spinner = create_spinner("Searching catalog...", !output.is_json());
    let items = catalog.search(&request).await?;
    finish_success(&spinner, &format!("Found {} items", items.len()));

    let saved_to = match &args.save {
        Some(path) => {
            let collection = geojson::FeatureCollection {
                bbox: None,
                features: items.iter().map(Item::to_feature).collect(),
                foreign_members: None,
            };
            fs::write(path, serde_json::to_string_pretty(&collection)?)
                .with_context(|| format!("Failed to save items to {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };

    let rows: Vec<ItemRow> = items.iter().map(item_row).collect();
    if output.is_json() {
        return output.result(SearchOutput { count: rows.len(), items: rows, saved_to });
    }

    output.table(rows);
    if let Some(path) = saved_to {
        output.success(format!("Saved {} items to {}", items.len(), path.display()));
    }
    Ok(())
}

fn item_row(item: &Item) -> ItemRow {
    ItemRow {
        id: item.id.clone(),
        item_type: item.item_type.to_string(),
        acquired: item
            .acquired()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string()),
        cloud_cover: item.cloud_cover().map(|c| format!("{:.0}%", c * 100.0)).unwrap_or_else(|| "-".to_string()),
    }
}
