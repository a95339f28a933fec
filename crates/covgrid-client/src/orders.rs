//! Orders API client: create, poll and download

use crate::http::{authorize, build_client, failure};
use async_trait::async_trait;
use covgrid_core::config::ApiContext;
use covgrid_core::error::{CoverageError, Result};
use covgrid_core::models::{Order, OrderRequest, PollSettings, ResultLocation};
use covgrid_core::ports::OrderClient;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct HttpOrderClient {
    context: ApiContext,
    client: reqwest::Client,
}

impl HttpOrderClient {
    pub fn new(context: ApiContext) -> Result<Self> {
        let client = build_client(&context)?;
        Ok(Self { context, client })
    }

    fn order_url(&self, order_id: &str) -> String {
        format!("{}/{}", self.context.orders_url, order_id)
    }

    async fn parse_order(response: reqwest::Response, order_id: &str) -> Result<Order> {
        if !response.status().is_success() {
            let (status, reason) = failure(response).await;
            return Err(CoverageError::Order {
                order_id: order_id.to_string(),
                reason: format!("{} ({})", reason, status),
            });
        }
        response
            .json::<Order>()
            .await
            .map_err(|e| CoverageError::Serialization(format!("Failed to parse order: {}", e)))
    }

    async fn download_one(&self, result: &ResultLocation, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(relative_result_path(&result.name)?);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut response = self.client.get(&result.location).send().await?;
        if !response.status().is_success() {
            let (status, reason) = failure(response).await;
            return Err(CoverageError::Order {
                order_id: result.name.clone(),
                reason: format!("download failed: {} ({})", reason, status),
            });
        }

        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(path = %path.display(), "Downloaded order result");
        Ok(path)
    }
}

#[async_trait]
impl OrderClient for HttpOrderClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<Order> {
        tracing::info!(name = %request.name, items = request.item_count(), "Submitting order");
        let builder = self.client.post(&self.context.orders_url).json(request);
        let response = authorize(builder, &self.context).send().await?;
        Self::parse_order(response, &request.name).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Order> {
        let builder = self.client.get(self.order_url(order_id));
        let response = authorize(builder, &self.context).send().await?;
        Self::parse_order(response, order_id).await
    }

    async fn wait_for_order(&self, order_id: &str, poll: PollSettings) -> Result<Order> {
        for attempt in 1..=poll.max_attempts {
            let order = self.get_order(order_id).await?;
            if order.state.is_terminal() {
                tracing::info!(order = order_id, state = ?order.state, attempt, "Order finished");
                return Ok(order);
            }
            tracing::debug!(order = order_id, state = ?order.state, attempt, "Order still in progress");
            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval).await;
            }
        }

        Err(CoverageError::Order {
            order_id: order_id.to_string(),
            reason: format!("not finished after {} polls", poll.max_attempts),
        })
    }

    async fn download(&self, order: &Order, dir: &Path) -> Result<Vec<PathBuf>> {
        if !order.state.has_results() {
            return Err(CoverageError::Order {
                order_id: order.id.clone(),
                reason: format!("no results to download in state {:?}", order.state),
            });
        }

        tokio::fs::create_dir_all(dir).await?;
        let mut paths = Vec::with_capacity(order.results().len());
        for result in order.results() {
            paths.push(self.download_one(result, dir).await?);
        }

        tracing::info!(order = %order.id, files = paths.len(), "Order results downloaded");
        Ok(paths)
    }
}

/// Result names are relative paths like `<order>/PSScene/<file>`. Anything
/// that would escape the download directory is rejected.
fn relative_result_path(name: &str) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => {
                return Err(CoverageError::Order {
                    order_id: name.to_string(),
                    reason: "result name is not a relative path".to_string(),
                })
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(CoverageError::Order {
            order_id: name.to_string(),
            reason: "result name is empty".to_string(),
        });
    }
    Ok(relative)
}
