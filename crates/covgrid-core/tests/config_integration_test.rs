//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use covgrid_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn clear_env() {
    for key in [
        "COVGRID_MIN_CELL_SIZE",
        "COVGRID_MAX_CELLS",
        "COVGRID_RESULT_CAP",
        "COVGRID_ITEM_TYPE",
        "COVGRID_DATA_URL",
        "COVGRID_ORDERS_URL",
        "PL_API_KEY",
    ] {
        env::remove_var(key);
    }
}

fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_key = "from-file"

[grid]
min_cell_size_m = 5.0
max_cells = 2000

[catalog]
result_cap = 100
"#
    )
    .unwrap();
    file
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file();
    env::set_var("COVGRID_MAX_CELLS", "1500");
    env::set_var("PL_API_KEY", "from-env");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.min_cell_size_m.value, 5.0);
    assert_eq!(config.min_cell_size_m.source, ConfigSource::File);
    assert_eq!(config.max_cells.value, 1500);
    assert_eq!(config.max_cells.source, ConfigSource::Environment);
    assert_eq!(config.api_key.value.as_deref(), Some("from-env"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    let file = config_file();
    env::set_var("COVGRID_RESULT_CAP", "300");

    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        result_cap: Some(10),
        min_cell_size_m: Some(30.0),
        ..Default::default()
    });

    assert_eq!(config.result_cap.value, 10);
    assert_eq!(config.result_cap.source, ConfigSource::Cli);
    assert_eq!(config.min_cell_size_m.value, 30.0);
    assert_eq!(config.api_key.value.as_deref(), Some("from-file"));

    let spec = config.grid_spec().unwrap();
    assert_eq!(spec.min_cell_size_m, 30.0);
    assert_eq!(spec.max_cells, 2000);

    clear_env();
}

#[test]
#[serial]
fn test_empty_api_key_env_is_ignored() {
    clear_env();
    env::set_var("PL_API_KEY", "");

    let config = LayeredConfig::with_defaults().load_from_env();
    assert!(config.api_key.value.is_none());
    assert!(config.api_context().is_err());

    clear_env();
}

#[test]
fn test_missing_file_is_config_error() {
    let err = LayeredConfig::with_defaults().load_from_file("/nonexistent/covgrid.toml").unwrap_err();
    assert_eq!(err.kind(), covgrid_core::ErrorKind::Config);
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[grid\nmin_cell_size_m = ").unwrap();

    let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
    assert_eq!(err.kind(), covgrid_core::ErrorKind::Config);
}
