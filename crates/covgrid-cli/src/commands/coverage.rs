//! Coverage command implementation

use crate::cli::{Cli, CoverageArgs};
use crate::config_loader::{load_with_overrides, overrides};
use crate::output::OutputWriter;
use crate::output_types::HistogramRow;
use crate::preview;
use crate::progress::{create_spinner, finish_error, finish_success};
use anyhow::{Context, Result};
use covgrid_pipeline::{CoverageReport, CoveragePipeline};
use std::fs;

pub async fn execute(cli: &Cli, args: &CoverageArgs, output: &OutputWriter) -> Result<()> {
    let config = load_with_overrides(cli, overrides(Some(&args.grid), Some(&args.catalog)))?;
    let spec = config.grid_spec()?;
    let aoi = super::load_aoi(&args.aoi)?;

    // Domain checks first so a bad AOI never needs credentials
    let prepared = covgrid_pipeline::prepare_aoi(&aoi, &spec)?;
    output.info(format!(
        "AOI in UTM zone {} ({} x {} cells)",
        prepared.zone, prepared.dimensions.rows, prepared.dimensions.cols
    ));

    let catalog = super::catalog_for(&args.catalog, &config)?;
    let template = super::search_template(&args.catalog, &config);
    let pipeline = CoveragePipeline::new(catalog, spec);

    let spinner = create_spinner("Searching catalog and computing coverage...", !output.is_json());
    let report = match pipeline.run_prepared(&prepared, &template).await {
        Ok(report) => {
            finish_success(&spinner, &format!("{} items analysed", report.item_ids.len()));
            report
        }
        Err(e) => {
            finish_error(&spinner, "Coverage run failed");
            return Err(e.into());
        }
    };

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
        output.success(format!("Report written to {}", path.display()));
    }

    if output.is_json() {
        return output.result(&report);
    }

    display(&report, args.preview_width, output);
    Ok(())
}

fn display(report: &CoverageReport, preview_width: usize, output: &OutputWriter) {
    output.section("Coverage");
    output.kv("Zone", format!("{} ({})", report.zone, report.zone.crs().authority()));
    output.kv(
        "Grid",
        format!(
            "{} x {} cells of {:.1} m",
            report.dimensions.rows, report.dimensions.cols, report.explanation.grid.cell_width_m
        ),
    );
    output.kv(
        "Items",
        format!("{} returned, {} overlap the AOI", report.item_ids.len(), report.non_empty_overlaps),
    );
    output.kv("Min", report.summary.min);
    output.kv("Median", report.summary.median);
    output.kv("Max", report.summary.max);
    output.kv("Covered", format!("{:.1}% of cells", report.fraction_covered * 100.0));

    if report.non_empty_overlaps == 0 {
        output.warning("No item footprint overlaps the AOI");
    }

    output.section("Histogram");
    output.table(histogram_rows(&report.histogram));

    output.section("Preview (north up)");
    output.block(preview::render(&report.grid, preview_width));
    output.block(preview::legend(report.summary.max));
}

fn histogram_rows(histogram: &[usize]) -> Vec<HistogramRow> {
    let total: usize = histogram.iter().sum();
    histogram
        .iter()
        .enumerate()
        .filter(|(_, &cells)| cells > 0)
        .map(|(coverage, &cells)| HistogramRow {
            coverage,
            cells,
            share: format!("{:.1}%", 100.0 * cells as f64 / total.max(1) as f64),
        })
        .collect()
}
