//! Quick-search client for the Data API

use crate::http::{authorize, build_client, failure};
use async_trait::async_trait;
use covgrid_core::config::ApiContext;
use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{Item, ItemType, SearchRequest};
use covgrid_core::ports::CatalogClient;
use serde::Deserialize;

/// Largest page the Data API serves
const MAX_PAGE_SIZE: usize = 250;

/// Catalog search over HTTP, following `_links._next` until the result cap
pub struct HttpCatalogClient {
    context: ApiContext,
    client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(context: ApiContext) -> Result<Self> {
        let client = build_client(&context)?;
        Ok(Self { context, client })
    }

    fn search_url(&self, page_size: usize) -> String {
        format!("{}/quick-search?_page_size={}", self.context.data_url, page_size)
    }

    async fn fetch_page(&self, request: reqwest::RequestBuilder) -> Result<SearchPage> {
        let response = authorize(request, &self.context).send().await?;
        if !response.status().is_success() {
            let (status, reason) = failure(response).await;
            return Err(CoverageError::Catalog { status: status.to_string(), reason });
        }
        response
            .json::<SearchPage>()
            .await
            .map_err(|e| CoverageError::Serialization(format!("Failed to parse search page: {}", e)))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>> {
        let cap = request.limit;
        let mut items = Vec::new();
        if cap == 0 {
            return Ok(items);
        }

        let default_type = request.item_types.first().cloned().unwrap_or_else(ItemType::ps_scene);
        let page_size = cap.min(MAX_PAGE_SIZE);

        let first = self.client.post(self.search_url(page_size)).json(request);
        let mut page = self.fetch_page(first).await?;
        let mut pages = 1;

        loop {
            for feature in page.features {
                if items.len() >= cap {
                    break;
                }
                items.push(Item::from_feature(feature, &default_type)?);
            }

            let next = match page.links.next {
                Some(next) if items.len() < cap => next,
                _ => break,
            };
            tracing::debug!(page = pages, collected = items.len(), "Following next search page");
            page = self.fetch_page(self.client.get(next)).await?;
            pages += 1;
        }

        tracing::info!(items = items.len(), pages, "Catalog search complete");
        Ok(items)
    }
}

/// One page of quick-search results
#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    features: Vec<geojson::Feature>,
    #[serde(rename = "_links", default)]
    links: PageLinks,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    #[serde(rename = "_next", default)]
    next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let context = ApiContext::new("key", "https://api.planet.com/data/v1/", "https://example.com/orders");
        let client = HttpCatalogClient::new(context).unwrap();
        assert_eq!(client.search_url(250), "https://api.planet.com/data/v1/quick-search?_page_size=250");
    }

    #[test]
    fn test_page_parsing() {
        let page: SearchPage = serde_json::from_value(serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "20230601_181712_24_2474",
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]},
                "properties": {"item_type": "PSScene", "cloud_cover": 0.02}
            }],
            "_links": {"_self": "https://x/self", "_next": "https://x/next"}
        }))
        .unwrap();
        assert_eq!(page.features.len(), 1);
        assert_eq!(page.links.next.as_deref(), Some("https://x/next"));

        let last: SearchPage = serde_json::from_value(serde_json::json!({"features": []})).unwrap();
        assert!(last.links.next.is_none());
    }
}
