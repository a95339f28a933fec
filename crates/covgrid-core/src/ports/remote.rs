use crate::error::Result;
use crate::models::{Item, Order, OrderRequest, PollSettings, SearchRequest};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Port for searching an imagery catalog
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Return the items matching the request, in catalog order, at most
    /// `request.limit` of them
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>>;
}

/// Port for submitting and tracking processing orders
#[async_trait]
pub trait OrderClient: Send + Sync {
    /// Submit an order and return its initial handle
    async fn create_order(&self, request: &OrderRequest) -> Result<Order>;

    /// Fetch the current state of an order
    async fn get_order(&self, order_id: &str) -> Result<Order>;

    /// Poll until the order reaches a terminal state
    async fn wait_for_order(&self, order_id: &str, poll: PollSettings) -> Result<Order>;

    /// Download every result file of a finished order into `dir`
    async fn download(&self, order: &Order, dir: &Path) -> Result<Vec<PathBuf>>;
}

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Box<T> {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Item>> {
        (**self).search(request).await
    }
}
