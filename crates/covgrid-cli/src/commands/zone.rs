//! Zone command implementation

use crate::cli::ZoneArgs;
use crate::output::OutputWriter;
use crate::output_types::ZoneOutput;
use anyhow::{Context, Result};

pub fn execute(args: &ZoneArgs, output: &OutputWriter) -> Result<()> {
    let aoi = super::load_aoi(&args.aoi)?;
    let centroid = aoi.centroid().context("AOI has no centroid")?;
    let zone = covgrid_geo::zone_for(centroid)?;

    let result = ZoneOutput {
        centroid: [centroid.x(), centroid.y()],
        zone,
        epsg: zone.epsg(),
        crs_name: zone.crs().name,
        central_meridian: zone.central_meridian(),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("UTM Zone");
    output.kv("Centroid", format!("{:.6}, {:.6}", result.centroid[0], result.centroid[1]));
    output.kv("Zone", zone);
    output.kv("CRS", format!("EPSG:{} ({})", result.epsg, result.crs_name));
    output.kv("Central meridian", format!("{}°", result.central_meridian));
    Ok(())
}
