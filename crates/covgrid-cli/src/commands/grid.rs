//! Grid command implementation

use crate::cli::{Cli, GridArgs};
use crate::config_loader::{load_with_overrides, overrides};
use crate::output::OutputWriter;
use crate::output_types::GridOutput;
use anyhow::Result;
use covgrid_pipeline::prepare_aoi;

pub fn execute(cli: &Cli, args: &GridArgs, output: &OutputWriter) -> Result<()> {
    let config = load_with_overrides(cli, overrides(Some(&args.grid), None))?;
    let spec = config.grid_spec()?;
    let aoi = super::load_aoi(&args.aoi)?;

    let prepared = prepare_aoi(&aoi, &spec)?;
    let phase = &prepared.grid_phase;
    let result = GridOutput {
        zone: prepared.zone,
        bbox: prepared.bbox,
        width_m: phase.width_m,
        height_m: phase.height_m,
        dimensions: prepared.dimensions,
        cell_width_m: phase.cell_width_m,
        cell_height_m: phase.cell_height_m,
        geo_transform: prepared.geo_transform().to_gdal(),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Coverage Grid");
    output.kv("CRS", prepared.zone.crs().authority());
    output.kv(
        "Extent",
        format!(
            "{:.1}, {:.1} .. {:.1}, {:.1}",
            result.bbox.min_x, result.bbox.min_y, result.bbox.max_x, result.bbox.max_y
        ),
    );
    output.kv("Size", format!("{:.1} m x {:.1} m", result.width_m, result.height_m));
    output.kv("Dimensions", format!("{} rows x {} cols", result.dimensions.rows, result.dimensions.cols));
    output.kv("Cell", format!("{:.2} m x {:.2} m", result.cell_width_m, result.cell_height_m));
    Ok(())
}
