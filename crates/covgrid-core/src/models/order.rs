//! Order models for the Orders v2 API

use crate::models::catalog::ItemType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A bundle of items to deliver with the same product bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub item_ids: Vec<String>,
    pub item_type: ItemType,
    pub product_bundle: String,
}

/// Processing applied to an order before delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderTool {
    /// Clip every scene to the AOI
    Clip { aoi: geojson::Geometry },
    /// Reproject to the given CRS, e.g. `EPSG:32610`
    Reproject {
        projection: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        resolution: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        kernel: Option<String>,
    },
    /// Merge scenes into a single raster
    Composite {},
}

/// Delivery options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub archive_type: String,
    pub single_archive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_filename: Option<String>,
}

impl Delivery {
    pub fn zip(filename: Option<String>) -> Self {
        Self { archive_type: "zip".to_string(), single_archive: true, archive_filename: filename }
    }
}

/// Request body for creating an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub name: String,
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OrderTool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
}

impl OrderRequest {
    pub fn new(
        name: impl Into<String>,
        item_ids: Vec<String>,
        item_type: ItemType,
        product_bundle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            products: vec![Product { item_ids, item_type, product_bundle: product_bundle.into() }],
            tools: Vec::new(),
            delivery: None,
        }
    }

    pub fn with_tool(mut self, tool: OrderTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn item_count(&self) -> usize {
        self.products.iter().map(|p| p.item_ids.len()).sum()
    }
}

/// Lifecycle state reported by the order service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Queued,
    Running,
    Success,
    Partial,
    Failed,
    Cancelled,
}

impl OrderState {
    /// No further state changes will happen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Success | OrderState::Partial | OrderState::Failed | OrderState::Cancelled
        )
    }

    /// Results are available for download
    pub fn has_results(&self) -> bool {
        matches!(self, OrderState::Success | OrderState::Partial)
    }
}

/// A downloadable result file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLocation {
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLinks {
    #[serde(rename = "_self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default)]
    pub results: Vec<ResultLocation>,
}

/// Order handle as returned by the order service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub state: OrderState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_hints: Vec<String>,
    #[serde(rename = "_links", default)]
    pub links: OrderLinks,
}

impl Order {
    pub fn results(&self) -> &[ResultLocation] {
        &self.links.results
    }
}

/// How often and how long to poll an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval: Duration::from_secs(10), max_attempts: 360 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_request_body() {
        let aoi = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]]));
        let request = OrderRequest::new(
            "sacramento",
            vec!["a".to_string(), "b".to_string()],
            ItemType::ps_scene(),
            "analytic_udm2",
        )
        .with_tool(OrderTool::Clip { aoi })
        .with_tool(OrderTool::Reproject {
            projection: "EPSG:32610".to_string(),
            resolution: None,
            kernel: Some("cubic".to_string()),
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["products"][0]["item_ids"], json!(["a", "b"]));
        assert_eq!(value["products"][0]["product_bundle"], "analytic_udm2");
        assert_eq!(value["tools"][0]["clip"]["aoi"]["type"], "Polygon");
        assert_eq!(value["tools"][1], json!({"reproject": {"projection": "EPSG:32610", "kernel": "cubic"}}));
        assert!(value.get("delivery").is_none());
        assert_eq!(request.item_count(), 2);
    }

    #[test]
    fn test_order_response_parsing() {
        let order: Order = serde_json::from_value(json!({
            "id": "5ece1dc0-ea81-4d27-a4b6-31b0a2b50d2f",
            "name": "sacramento",
            "state": "success",
            "last_message": "Manifest delivery completed",
            "_links": {
                "_self": "https://api.planet.com/compute/ops/orders/v2/5ece1dc0",
                "results": [
                    {"name": "sacramento/manifest.json", "location": "https://example.com/manifest"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(order.state, OrderState::Success);
        assert!(order.state.is_terminal());
        assert_eq!(order.results().len(), 1);
        assert_eq!(order.results()[0].name, "sacramento/manifest.json");
    }

    #[test]
    fn test_order_state_terminal() {
        assert!(!OrderState::Queued.is_terminal());
        assert!(!OrderState::Running.is_terminal());
        assert!(OrderState::Failed.is_terminal());
        assert!(!OrderState::Failed.has_results());
        assert!(OrderState::Partial.has_results());
    }
}
