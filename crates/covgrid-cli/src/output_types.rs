use covgrid_core::config::ConfigSource;
use covgrid_core::models::{BoundingBox, GridDimensions, Order, OrderState, UtmZone};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Output for zone command
#[derive(Debug, Serialize)]
pub struct ZoneOutput {
    pub centroid: [f64; 2],
    pub zone: UtmZone,
    pub epsg: u32,
    pub crs_name: String,
    pub central_meridian: f64,
}

/// Output for grid command
#[derive(Debug, Serialize)]
pub struct GridOutput {
    pub zone: UtmZone,
    pub bbox: BoundingBox,
    pub width_m: f64,
    pub height_m: f64,
    pub dimensions: GridDimensions,
    pub cell_width_m: f64,
    pub cell_height_m: f64,
    pub geo_transform: [f64; 6],
}

/// One item in search results
#[derive(Debug, Serialize, Tabled)]
pub struct ItemRow {
    #[tabled(rename = "Item")]
    pub id: String,
    #[tabled(rename = "Type")]
    pub item_type: String,
    #[tabled(rename = "Acquired")]
    pub acquired: String,
    #[tabled(rename = "Cloud")]
    pub cloud_cover: String,
}

/// Output for search command
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub count: usize,
    pub items: Vec<ItemRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
}

/// One histogram bucket
#[derive(Debug, Serialize, Tabled)]
pub struct HistogramRow {
    #[tabled(rename = "Images")]
    pub coverage: usize,
    #[tabled(rename = "Cells")]
    pub cells: usize,
    #[tabled(rename = "Share")]
    pub share: String,
}

/// Output for order commands
#[derive(Debug, Serialize)]
pub struct OrderOutput {
    pub id: String,
    pub name: String,
    pub state: OrderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    pub results: usize,
}

impl From<&Order> for OrderOutput {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            name: order.name.clone(),
            state: order.state,
            last_message: order.last_message.clone(),
            results: order.results().len(),
        }
    }
}

/// Output for order download
#[derive(Debug, Serialize)]
pub struct DownloadOutput {
    pub order_id: String,
    pub files: Vec<PathBuf>,
}

/// One configuration entry
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigRow {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: format!("{:?}", source) }
    }
}
