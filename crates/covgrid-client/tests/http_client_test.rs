//! HTTP client tests against a local fake of the Data and Orders APIs

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use covgrid_client::{HttpCatalogClient, HttpOrderClient};
use covgrid_core::config::ApiContext;
use covgrid_core::models::{
    ItemType, OrderRequest, OrderState, PollSettings, SearchFilter, SearchRequest,
};
use covgrid_core::ports::{CatalogClient, OrderClient};
use covgrid_core::ErrorKind;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const API_KEY: &str = "test-key";
// base64("test-key:")
const EXPECTED_AUTH: &str = "Basic dGVzdC1rZXk6";

struct FakePlanet {
    base_url: String,
    search_calls: AtomicUsize,
    page_calls: AtomicUsize,
    polls: AtomicUsize,
    running_polls: usize,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(EXPECTED_AUTH)
}

fn feature(id: &str) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]},
        "properties": {"item_type": "PSScene", "cloud_cover": 0.01, "acquired": "2023-06-01T18:17:12Z"}
    })
}

async fn quick_search(
    State(state): State<Arc<FakePlanet>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Please enter your API key."})))
            .into_response();
    }
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(body["item_types"], json!(["PSScene"]));
    assert_eq!(body["filter"]["type"], "AndFilter");

    Json(json!({
        "type": "FeatureCollection",
        "features": [feature("scene-1"), feature("scene-2")],
        "_links": {"_next": format!("{}/data/v1/searches/page-2", state.base_url)}
    }))
    .into_response()
}

async fn next_page(State(state): State<Arc<FakePlanet>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.page_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"type": "FeatureCollection", "features": [feature("scene-3")], "_links": {}})).into_response()
}

async fn create_order(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["products"][0]["item_ids"].as_array().map_or(true, |ids| ids.is_empty()) {
        return (StatusCode::BAD_REQUEST, Json(json!({"general": [{"message": "No items in order"}]})))
            .into_response();
    }
    Json(json!({"id": "order-1", "name": body["name"], "state": "queued"})).into_response()
}

async fn get_order(
    State(state): State<Arc<FakePlanet>>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if order_id != "order-1" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "order not found"}))).into_response();
    }
    let poll = state.polls.fetch_add(1, Ordering::SeqCst);
    if poll < state.running_polls {
        return Json(json!({"id": order_id, "name": "test", "state": "running"})).into_response();
    }
    Json(json!({
        "id": order_id,
        "name": "test",
        "state": "success",
        "_links": {
            "_self": format!("{}/orders/v2/{}", state.base_url, order_id),
            "results": [
                {"name": "order-1/PSScene/manifest.json", "location": format!("{}/downloads/manifest", state.base_url)}
            ]
        }
    }))
    .into_response()
}

async fn download() -> &'static str {
    "{\"files\": []}"
}

async fn start(running_polls: usize) -> (Arc<FakePlanet>, ApiContext) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let state = Arc::new(FakePlanet {
        base_url: base_url.clone(),
        search_calls: AtomicUsize::new(0),
        page_calls: AtomicUsize::new(0),
        polls: AtomicUsize::new(0),
        running_polls,
    });

    let app = Router::new()
        .route("/data/v1/quick-search", post(quick_search))
        .route("/data/v1/searches/page-2", get(next_page))
        .route("/orders/v2", post(create_order))
        .route("/orders/v2/{order_id}", get(get_order))
        .route("/downloads/manifest", get(download))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let context = ApiContext::new(
        API_KEY,
        &format!("{}/data/v1", base_url),
        &format!("{}/orders/v2", base_url),
    );
    (state, context)
}

fn search_request() -> SearchRequest {
    let aoi = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
        vec![0.2, 0.2],
        vec![0.8, 0.2],
        vec![0.8, 0.8],
        vec![0.2, 0.2],
    ]]));
    SearchRequest::new(
        vec![ItemType::ps_scene()],
        SearchFilter::geometry(aoi).and_also(SearchFilter::max_cloud_cover(0.1)),
    )
}

#[tokio::test]
async fn test_search_follows_next_links() {
    let (state, context) = start(0).await;
    let client = HttpCatalogClient::new(context).unwrap();

    let items = client.search(&search_request()).await.unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["scene-1", "scene-2", "scene-3"]);
    assert_eq!(items[0].cloud_cover(), Some(0.01));
    assert_eq!(state.page_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_search_stops_at_cap() {
    let (state, context) = start(0).await;
    let client = HttpCatalogClient::new(context).unwrap();

    let items = client.search(&search_request().with_limit(2)).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(state.search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.page_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_rejected_key_is_collaborator_error() {
    let (_, context) = start(0).await;
    let bad = ApiContext::new("wrong", &context.data_url, &context.orders_url);
    let client = HttpCatalogClient::new(bad).unwrap();

    let err = client.search(&search_request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Collaborator);
    let message = err.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("API key"), "{}", message);
}

#[tokio::test]
async fn test_order_create_wait_download() {
    let (state, context) = start(2).await;
    let client = HttpOrderClient::new(context).unwrap();

    let request = OrderRequest::new("test", vec!["scene-1".to_string()], ItemType::ps_scene(), "analytic_udm2");
    let order = client.create_order(&request).await.unwrap();
    assert_eq!(order.id, "order-1");
    assert_eq!(order.state, OrderState::Queued);

    let poll = PollSettings { interval: Duration::from_millis(5), max_attempts: 5 };
    let finished = client.wait_for_order(&order.id, poll).await.unwrap();
    assert_eq!(finished.state, OrderState::Success);
    assert_eq!(state.polls.load(Ordering::SeqCst), 3);

    let dir = TempDir::new().unwrap();
    let paths = client.download(&finished, dir.path()).await.unwrap();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("order-1/PSScene/manifest.json"));
    assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "{\"files\": []}");
}

#[tokio::test]
async fn test_wait_gives_up_after_max_attempts() {
    let (_, context) = start(100).await;
    let client = HttpOrderClient::new(context).unwrap();

    let poll = PollSettings { interval: Duration::from_millis(1), max_attempts: 3 };
    let err = client.wait_for_order("order-1", poll).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Collaborator);
    assert!(err.to_string().contains("3 polls"));
}

#[tokio::test]
async fn test_order_errors_carry_service_message() {
    let (_, context) = start(1).await;
    let client = HttpOrderClient::new(context).unwrap();

    let empty = OrderRequest::new("empty", vec![], ItemType::ps_scene(), "analytic_udm2");
    let err = client.create_order(&empty).await.unwrap_err();
    assert!(err.to_string().contains("No items in order"));

    let err = client.get_order("missing").await.unwrap_err();
    assert!(err.to_string().contains("order not found"));

    let running = client.get_order("order-1").await.unwrap();
    let dir = TempDir::new().unwrap();
    let err = client.download(&running, dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("no results"));
}
