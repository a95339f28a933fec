//! Config command implementation

use crate::cli::Cli;
use crate::config_loader::load_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;
use covgrid_core::config::CliConfigOverrides;

pub fn execute(cli: &Cli, output: &OutputWriter) -> Result<()> {
    let config = load_with_overrides(cli, CliConfigOverrides::default())?;

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow::new(key, value, source))
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        return output.result(rows);
    }

    output.section("Configuration");
    output.table(rows);
    Ok(())
}
