use crate::error::{CoverageError, Result};
use crate::models::{GridSpec, ItemType, PollSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DATA_URL: &str = "https://api.planet.com/data/v1";
pub const DEFAULT_ORDERS_URL: &str = "https://api.planet.com/compute/ops/orders/v2";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for covgrid
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub min_cell_size_m: ConfigValue<f64>,
    pub min_cells: ConfigValue<usize>,
    pub max_cells: ConfigValue<usize>,
    pub result_cap: ConfigValue<usize>,
    pub item_type: ConfigValue<String>,
    pub data_url: ConfigValue<String>,
    pub orders_url: ConfigValue<String>,
    pub api_key: ConfigValue<Option<String>>,
    pub poll_interval_secs: ConfigValue<u64>,
    pub poll_max_attempts: ConfigValue<u32>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let grid = GridSpec::default();
        let poll = PollSettings::default();
        Self {
            min_cell_size_m: ConfigValue::new(grid.min_cell_size_m, ConfigSource::Default),
            min_cells: ConfigValue::new(grid.min_cells, ConfigSource::Default),
            max_cells: ConfigValue::new(grid.max_cells, ConfigSource::Default),
            result_cap: ConfigValue::new(
                crate::models::DEFAULT_RESULT_CAP,
                ConfigSource::Default,
            ),
            item_type: ConfigValue::new(ItemType::default().0, ConfigSource::Default),
            data_url: ConfigValue::new(DEFAULT_DATA_URL.to_string(), ConfigSource::Default),
            orders_url: ConfigValue::new(DEFAULT_ORDERS_URL.to_string(), ConfigSource::Default),
            api_key: ConfigValue::new(None, ConfigSource::Default),
            poll_interval_secs: ConfigValue::new(poll.interval.as_secs(), ConfigSource::Default),
            poll_max_attempts: ConfigValue::new(poll.max_attempts, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| CoverageError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CoverageError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(grid) = file_config.grid {
            if let Some(v) = grid.min_cell_size_m {
                self.min_cell_size_m.update(v, ConfigSource::File);
            }
            if let Some(v) = grid.min_cells {
                self.min_cells.update(v, ConfigSource::File);
            }
            if let Some(v) = grid.max_cells {
                self.max_cells.update(v, ConfigSource::File);
            }
        }

        if let Some(catalog) = file_config.catalog {
            if let Some(v) = catalog.result_cap {
                self.result_cap.update(v, ConfigSource::File);
            }
            if let Some(v) = catalog.item_type {
                self.item_type.update(v, ConfigSource::File);
            }
            if let Some(v) = catalog.data_url {
                self.data_url.update(v, ConfigSource::File);
            }
        }

        if let Some(orders) = file_config.orders {
            if let Some(v) = orders.orders_url {
                self.orders_url.update(v, ConfigSource::File);
            }
            if let Some(v) = orders.poll_interval_secs {
                self.poll_interval_secs.update(v, ConfigSource::File);
            }
            if let Some(v) = orders.poll_max_attempts {
                self.poll_max_attempts.update(v, ConfigSource::File);
            }
        }

        if let Some(api_key) = file_config.api_key {
            self.api_key.update(Some(api_key), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables.
    ///
    /// Only the binary calls this; library code receives an [`ApiContext`].
    pub fn load_from_env(self) -> Self {
        self.load_from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup (`COVGRID_*` and `PL_API_KEY`)
    pub fn load_from_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("COVGRID_MIN_CELL_SIZE") {
            match raw.parse::<f64>() {
                Ok(v) => self.min_cell_size_m.update(v, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid COVGRID_MIN_CELL_SIZE value '{}': expected metres as a number",
                    raw
                ),
            }
        }

        if let Some(raw) = lookup("COVGRID_MAX_CELLS") {
            match raw.parse::<usize>() {
                Ok(v) => self.max_cells.update(v, ConfigSource::Environment),
                Err(_) => {
                    tracing::warn!("Invalid COVGRID_MAX_CELLS value '{}': expected integer", raw)
                }
            }
        }

        if let Some(raw) = lookup("COVGRID_RESULT_CAP") {
            match raw.parse::<usize>() {
                Ok(v) => self.result_cap.update(v, ConfigSource::Environment),
                Err(_) => {
                    tracing::warn!("Invalid COVGRID_RESULT_CAP value '{}': expected integer", raw)
                }
            }
        }

        if let Some(v) = lookup("COVGRID_ITEM_TYPE") {
            self.item_type.update(v, ConfigSource::Environment);
        }

        if let Some(v) = lookup("COVGRID_DATA_URL") {
            self.data_url.update(v, ConfigSource::Environment);
        }

        if let Some(v) = lookup("COVGRID_ORDERS_URL") {
            self.orders_url.update(v, ConfigSource::Environment);
        }

        if let Some(v) = lookup("PL_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key.update(Some(v), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(v) = overrides.min_cell_size_m {
            self.min_cell_size_m.update(v, ConfigSource::Cli);
        }

        if let Some(v) = overrides.max_cells {
            self.max_cells.update(v, ConfigSource::Cli);
        }

        if let Some(v) = overrides.result_cap {
            self.result_cap.update(v, ConfigSource::Cli);
        }

        if let Some(v) = overrides.item_type {
            self.item_type.update(v, ConfigSource::Cli);
        }

        if let Some(v) = overrides.api_key {
            self.api_key.update(Some(v), ConfigSource::Cli);
        }
    }

    /// Grid sizing parameters, validated
    pub fn grid_spec(&self) -> Result<GridSpec> {
        let spec = GridSpec {
            min_cell_size_m: self.min_cell_size_m.value,
            min_cells: self.min_cells.value,
            max_cells: self.max_cells.value,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs.value),
            max_attempts: self.poll_max_attempts.value,
        }
    }

    pub fn item_type(&self) -> ItemType {
        ItemType::new(self.item_type.value.clone())
    }

    /// Credentials and endpoints for the remote clients
    pub fn api_context(&self) -> Result<ApiContext> {
        let api_key = self
            .api_key
            .value
            .clone()
            .ok_or_else(|| CoverageError::ConfigMissing { key: "api_key".to_string() })?;
        Ok(ApiContext::new(api_key, &self.data_url.value, &self.orders_url.value))
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "min_cell_size_m".to_string(),
            (self.min_cell_size_m.value.to_string(), self.min_cell_size_m.source),
        );
        map.insert(
            "min_cells".to_string(),
            (self.min_cells.value.to_string(), self.min_cells.source),
        );
        map.insert(
            "max_cells".to_string(),
            (self.max_cells.value.to_string(), self.max_cells.source),
        );
        map.insert(
            "result_cap".to_string(),
            (self.result_cap.value.to_string(), self.result_cap.source),
        );
        map.insert("item_type".to_string(), (self.item_type.value.clone(), self.item_type.source));
        map.insert("data_url".to_string(), (self.data_url.value.clone(), self.data_url.source));
        map.insert(
            "orders_url".to_string(),
            (self.orders_url.value.clone(), self.orders_url.source),
        );
        map.insert(
            "api_key".to_string(),
            (
                match self.api_key.value {
                    Some(_) => "********".to_string(),
                    None => "(not set)".to_string(),
                },
                self.api_key.source,
            ),
        );
        map.insert(
            "poll_interval_secs".to_string(),
            (self.poll_interval_secs.value.to_string(), self.poll_interval_secs.source),
        );
        map.insert(
            "poll_max_attempts".to_string(),
            (self.poll_max_attempts.value.to_string(), self.poll_max_attempts.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_key: Option<String>,
    grid: Option<GridSection>,
    catalog: Option<CatalogSection>,
    orders: Option<OrdersSection>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GridSection {
    min_cell_size_m: Option<f64>,
    min_cells: Option<usize>,
    max_cells: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogSection {
    result_cap: Option<usize>,
    item_type: Option<String>,
    data_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct OrdersSection {
    orders_url: Option<String>,
    poll_interval_secs: Option<u64>,
    poll_max_attempts: Option<u32>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub min_cell_size_m: Option<f64>,
    pub max_cells: Option<usize>,
    pub result_cap: Option<usize>,
    pub item_type: Option<String>,
    pub api_key: Option<String>,
}

/// Credentials and endpoint settings handed to the remote clients.
///
/// Built once by the caller and passed explicitly; nothing in the library
/// reads credentials from the process environment.
#[derive(Clone)]
pub struct ApiContext {
    pub api_key: String,
    pub data_url: String,
    pub orders_url: String,
    pub timeout: Duration,
}

impl ApiContext {
    pub fn new(api_key: impl Into<String>, data_url: &str, orders_url: &str) -> Self {
        Self {
            api_key: api_key.into(),
            data_url: data_url.trim_end_matches('/').to_string(),
            orders_url: orders_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("api_key", &"********")
            .field("data_url", &self.data_url)
            .field("orders_url", &self.orders_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.min_cell_size_m.value, 9.0);
        assert_eq!(config.min_cells.value, 3);
        assert_eq!(config.max_cells.value, 3000);
        assert_eq!(config.result_cap.value, 500);
        assert_eq!(config.item_type.value, "PSScene");
        assert_eq!(config.api_key.value, None);
        assert_eq!(config.min_cell_size_m.source, ConfigSource::Default);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_key = "file-key"

[grid]
min_cell_size_m = 3.0
max_cells = 1000

[catalog]
result_cap = 250
item_type = "REOrthoTile"

[orders]
poll_interval_secs = 5
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.min_cell_size_m.value, 3.0);
        assert_eq!(config.min_cell_size_m.source, ConfigSource::File);
        assert_eq!(config.max_cells.value, 1000);
        assert_eq!(config.min_cells.source, ConfigSource::Default);
        assert_eq!(config.result_cap.value, 250);
        assert_eq!(config.item_type.value, "REOrthoTile");
        assert_eq!(config.poll_interval_secs.value, 5);
        assert_eq!(config.api_key.value.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_load_from_vars() {
        let vars: HashMap<&str, &str> = [
            ("COVGRID_MIN_CELL_SIZE", "4.5"),
            ("COVGRID_MAX_CELLS", "not-a-number"),
            ("PL_API_KEY", "env-key"),
        ]
        .into_iter()
        .collect();

        let config = LayeredConfig::with_defaults()
            .load_from_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.min_cell_size_m.value, 4.5);
        assert_eq!(config.min_cell_size_m.source, ConfigSource::Environment);
        // Invalid values are ignored with a warning
        assert_eq!(config.max_cells.value, 3000);
        assert_eq!(config.max_cells.source, ConfigSource::Default);
        assert_eq!(config.api_key.value.as_deref(), Some("env-key"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            min_cell_size_m: Some(20.0),
            max_cells: None,
            result_cap: Some(50),
            item_type: None,
            api_key: None,
        };

        config.update_from_cli(overrides);

        assert_eq!(config.min_cell_size_m.value, 20.0);
        assert_eq!(config.min_cell_size_m.source, ConfigSource::Cli);
        assert_eq!(config.result_cap.value, 50);
        assert_eq!(config.max_cells.source, ConfigSource::Default);
    }

    #[test]
    fn test_grid_spec_from_config() {
        let mut config = LayeredConfig::with_defaults();
        let spec = config.grid_spec().unwrap();
        assert_eq!(spec, GridSpec::default());

        config.min_cell_size_m.update(-1.0, ConfigSource::Cli);
        assert!(config.grid_spec().is_err());
    }

    #[test]
    fn test_api_context_requires_key() {
        let config = LayeredConfig::with_defaults();
        let err = config.api_context().unwrap_err();
        assert!(matches!(err, CoverageError::ConfigMissing { ref key } if key == "api_key"));

        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            api_key: Some("secret".to_string()),
            ..Default::default()
        });
        let ctx = config.api_context().unwrap();
        assert_eq!(ctx.api_key, "secret");
        assert_eq!(ctx.data_url, DEFAULT_DATA_URL);
        assert!(!format!("{:?}", ctx).contains("secret"));
    }

    #[test]
    fn test_inspection_map_redacts_key() {
        let mut config = LayeredConfig::with_defaults();
        let (value, source) = &config.to_inspection_map()["api_key"];
        assert_eq!(value, "(not set)");
        assert_eq!(*source, ConfigSource::Default);

        config.api_key.update(Some("secret".to_string()), ConfigSource::Environment);
        let map = config.to_inspection_map();
        assert_eq!(map["api_key"].0, "********");
        assert_eq!(map["max_cells"].0, "3000");
    }
}
