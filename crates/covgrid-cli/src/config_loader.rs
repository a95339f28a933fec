//! Configuration loading for CLI commands

use crate::cli::{CatalogOptions, Cli, GridOptions};
use anyhow::{Context, Result};
use covgrid_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "covgrid.toml";

/// Defaults, then the config file, then the environment
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(explicit) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    Ok(config.load_from_env())
}

/// Full layering with the command's own overrides on top
pub fn load_with_overrides(cli: &Cli, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    config.update_from_cli(CliConfigOverrides { api_key: cli.api_key.clone(), ..overrides });
    Ok(config)
}

pub fn overrides(grid: Option<&GridOptions>, catalog: Option<&CatalogOptions>) -> CliConfigOverrides {
    CliConfigOverrides {
        min_cell_size_m: grid.and_then(|g| g.min_cell_size),
        max_cells: grid.and_then(|g| g.max_cells),
        result_cap: catalog.and_then(|c| c.limit),
        item_type: catalog.and_then(|c| c.item_type.clone()),
        api_key: None,
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.exists().then_some(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covgrid_core::config::ConfigSource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[grid]\nmax_cells = 250").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.max_cells.value, 250);
        assert_eq!(config.max_cells.source, ConfigSource::File);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = load_config(Some(Path::new("/nonexistent/covgrid.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/covgrid.toml"));
    }

    #[test]
    fn test_overrides_from_args() {
        let grid = GridOptions { min_cell_size: Some(30.0), max_cells: None };
        let catalog = CatalogOptions { limit: Some(20), item_type: Some("SkySatScene".into()), ..Default::default() };

        let overrides = overrides(Some(&grid), Some(&catalog));
        assert_eq!(overrides.min_cell_size_m, Some(30.0));
        assert_eq!(overrides.max_cells, None);
        assert_eq!(overrides.result_cap, Some(20));
        assert_eq!(overrides.item_type.as_deref(), Some("SkySatScene"));
    }
}
