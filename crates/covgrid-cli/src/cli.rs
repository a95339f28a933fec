use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// covgrid - Satellite imagery coverage analysis
#[derive(Parser, Debug)]
#[command(name = "covgrid")]
#[command(about = "Count how many catalog images cover each cell of an area of interest", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML); defaults to ./covgrid.toml when present
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// API key for the catalog and order services
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the UTM zone selected for an AOI
    Zone(ZoneArgs),

    /// Show the projected extent and grid dimensions of an AOI
    Grid(GridArgs),

    /// Count per-cell image coverage over an AOI
    Coverage(CoverageArgs),

    /// List catalog items over an AOI
    Search(SearchArgs),

    /// Create, track and download orders
    Order(OrderArgs),

    /// Show effective configuration and where each value comes from
    Config,
}

#[derive(Args, Debug)]
pub struct ZoneArgs {
    /// AOI file (GeoJSON Polygon, Feature or FeatureCollection)
    pub aoi: PathBuf,
}

/// Grid sizing overrides
#[derive(Args, Debug, Clone, Default)]
pub struct GridOptions {
    /// Minimum cell side in metres
    #[arg(long, value_name = "METRES")]
    pub min_cell_size: Option<f64>,

    /// Maximum cells per axis
    #[arg(long)]
    pub max_cells: Option<usize>,
}

#[derive(Args, Debug)]
pub struct GridArgs {
    /// AOI file (GeoJSON Polygon, Feature or FeatureCollection)
    pub aoi: PathBuf,

    #[command(flatten)]
    pub grid: GridOptions,
}

/// Catalog selection shared by `coverage` and `search`
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Serve items from a saved FeatureCollection instead of the Data API
    #[arg(long, value_name = "FILE")]
    pub items: Option<PathBuf>,

    /// Item type to search (e.g. PSScene)
    #[arg(long)]
    pub item_type: Option<String>,

    /// Earliest acquisition date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<DateTime<Utc>>,

    /// Latest acquisition date (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<DateTime<Utc>>,

    /// Maximum cloud cover fraction (0.0 - 1.0)
    #[arg(long, value_name = "FRACTION")]
    pub max_cloud: Option<f64>,

    /// Maximum number of items to collect
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// AOI file (GeoJSON Polygon, Feature or FeatureCollection)
    pub aoi: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogOptions,

    #[command(flatten)]
    pub grid: GridOptions,

    /// Write the full report (grid included) to a JSON file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Widest text preview of the grid, in characters
    #[arg(long, default_value = "60")]
    pub preview_width: usize,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// AOI file (GeoJSON Polygon, Feature or FeatureCollection)
    pub aoi: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogOptions,

    /// Save matching items as a FeatureCollection, reusable with --items
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    /// Submit an order for a set of items
    Create(OrderCreateArgs),

    /// Show the current state of an order
    Status {
        /// Order id
        order_id: String,
    },

    /// Poll an order until it finishes
    Wait {
        /// Order id
        order_id: String,

        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,

        /// Give up after this many polls
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Download the results of a finished order
    Download {
        /// Order id
        order_id: String,

        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct OrderCreateArgs {
    /// Order name
    pub name: String,

    /// Item ids to order (comma separated)
    #[arg(long, value_delimiter = ',', required_unless_present = "from_search")]
    pub item_ids: Vec<String>,

    /// Take item ids from a FeatureCollection saved by `search --save`
    #[arg(long, value_name = "FILE")]
    pub from_search: Option<PathBuf>,

    /// Item type of the ordered items
    #[arg(long)]
    pub item_type: Option<String>,

    /// Product bundle
    #[arg(long, default_value = "analytic_udm2")]
    pub bundle: String,

    /// Clip scenes to this AOI
    #[arg(long, value_name = "AOI")]
    pub clip: Option<PathBuf>,

    /// Reproject scenes to the UTM zone of the clip AOI
    #[arg(long, requires = "clip")]
    pub reproject: bool,

    /// Deliver results as a single zip archive
    #[arg(long)]
    pub zip: bool,
}

/// Accept a bare date (midnight UTC) or a full RFC 3339 timestamp
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD or RFC 3339)", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2023-06-01").unwrap(), Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(
            parse_date("2023-06-01T12:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2023, 6, 1, 10, 30, 0).unwrap()
        );
        assert!(parse_date("June 1st").is_err());
    }

    #[test]
    fn test_coverage_args() {
        let cli = Cli::parse_from([
            "covgrid", "coverage", "aoi.geojson", "--items", "items.geojson", "--max-cloud", "0.1",
            "--start", "2023-01-01", "--max-cells", "500", "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Coverage(args) => {
                assert_eq!(args.catalog.items, Some(PathBuf::from("items.geojson")));
                assert_eq!(args.catalog.max_cloud, Some(0.1));
                assert_eq!(args.grid.max_cells, Some(500));
                assert!(args.catalog.start.is_some());
                assert!(args.catalog.end.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_order_create_needs_items() {
        assert!(Cli::try_parse_from(["covgrid", "order", "create", "june"]).is_err());

        let cli = Cli::parse_from(["covgrid", "order", "create", "june", "--item-ids", "a,b"]);
        match cli.command {
            Commands::Order(OrderArgs { command: OrderCommand::Create(args) }) => {
                assert_eq!(args.item_ids, vec!["a", "b"]);
                assert_eq!(args.bundle, "analytic_udm2");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
