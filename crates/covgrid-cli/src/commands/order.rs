//! Order command implementations

use crate::cli::{Cli, OrderArgs, OrderCommand, OrderCreateArgs};
use crate::config_loader::load_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{DownloadOutput, OrderOutput};
use crate::progress::{create_spinner, finish_error, finish_success};
use anyhow::{bail, Context, Result};
use covgrid_client::{HttpOrderClient, MemoryCatalog};
use covgrid_core::config::{CliConfigOverrides, LayeredConfig};
use covgrid_core::models::{Delivery, Order, OrderRequest, OrderState, OrderTool};
use covgrid_core::ports::OrderClient;
use std::time::Duration;

pub async fn execute(cli: &Cli, args: &OrderArgs, output: &OutputWriter) -> Result<()> {
    let item_type = match &args.command {
        OrderCommand::Create(create) => create.item_type.clone(),
        _ => None,
    };
    let config = load_with_overrides(cli, CliConfigOverrides { item_type, ..Default::default() })?;

    match &args.command {
        OrderCommand::Create(create) => {
            let request = build_request(create, &config)?;
            let client = HttpOrderClient::new(config.api_context()?)?;
            let order = client.create_order(&request).await?;
            output.success(format!("Order {} submitted ({} items)", order.id, request.item_count()));
            show_order(&order, output)
        }
        OrderCommand::Status { order_id } => {
            let client = HttpOrderClient::new(config.api_context()?)?;
            let order = client.get_order(order_id).await?;
            show_order(&order, output)
        }
        OrderCommand::Wait { order_id, interval, max_attempts } => {
            let mut poll = config.poll_settings();
            if let Some(secs) = interval {
                poll.interval = Duration::from_secs(*secs);
            }
            if let Some(n) = max_attempts {
                poll.max_attempts = *n;
            }

            let client = HttpOrderClient::new(config.api_context()?)?;
            let spinner = create_spinner(&format!("Waiting for order {}...", order_id), !output.is_json());
            let order = match client.wait_for_order(order_id, poll).await {
                Ok(order) => order,
                Err(e) => {
                    finish_error(&spinner, "Order did not finish");
                    return Err(e.into());
                }
            };
            finish_success(&spinner, &format!("Order {} is {:?}", order.id, order.state));
            if matches!(order.state, OrderState::Failed | OrderState::Cancelled) {
                output.warning(format!("Order {} ended as {:?}", order.id, order.state));
            }
            show_order(&order, output)
        }
        OrderCommand::Download { order_id, dir } => {
            let client = HttpOrderClient::new(config.api_context()?)?;
            let order = client.get_order(order_id).await?;
            if !order.state.has_results() {
                bail!("Order {} has no results yet (state {:?})", order.id, order.state);
            }

            let spinner = create_spinner(&format!("Downloading {} files...", order.results().len()), !output.is_json());
            let files = client.download(&order, dir).await?;
            finish_success(&spinner, &format!("Downloaded {} files to {}", files.len(), dir.display()));

            if output.is_json() {
                return output.result(DownloadOutput { order_id: order.id, files });
            }
            for file in &files {
                output.block(file.display());
            }
            Ok(())
        }
    }
}

fn build_request(args: &OrderCreateArgs, config: &LayeredConfig) -> Result<OrderRequest> {
    let item_type = config.item_type();
    let mut item_ids = args.item_ids.clone();
    if let Some(path) = &args.from_search {
        let saved = MemoryCatalog::load(path, &item_type)
            .with_context(|| format!("Failed to read saved search {}", path.display()))?;
        item_ids.extend(saved.items().iter().map(|item| item.id.clone()));
    }
    if item_ids.is_empty() {
        bail!("No item ids to order");
    }

    let mut request = OrderRequest::new(&args.name, item_ids, item_type, &args.bundle);

    if let Some(path) = &args.clip {
        let aoi = super::load_aoi(path)?;
        request = request.with_tool(OrderTool::Clip { aoi: aoi.to_geojson() });
        if args.reproject {
            let zone = covgrid_geo::projection_for(&aoi)?.zone();
            request = request.with_tool(OrderTool::Reproject {
                projection: zone.crs().authority(),
                resolution: None,
                kernel: None,
            });
        }
    }

    if args.zip {
        request = request.with_delivery(Delivery::zip(Some(format!("{}.zip", args.name))));
    }
    Ok(request)
}

fn show_order(order: &Order, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        return output.result(OrderOutput::from(order));
    }

    output.section("Order");
    output.kv("Id", &order.id);
    output.kv("Name", &order.name);
    output.kv("State", format!("{:?}", order.state));
    if let Some(message) = &order.last_message {
        output.kv("Message", message);
    }
    for hint in &order.error_hints {
        output.warning(hint);
    }
    if order.state.has_results() {
        output.kv("Results", order.results().len());
    }
    Ok(())
}
