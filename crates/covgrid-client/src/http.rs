//! Shared HTTP plumbing for the remote clients

use covgrid_core::config::ApiContext;
use covgrid_core::error::Result;
use reqwest::{RequestBuilder, Response, StatusCode};

/// Build a client with the context's timeout
pub(crate) fn build_client(context: &ApiContext) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(context.timeout)
        .user_agent(concat!("covgrid/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// HTTP basic auth with the API key as username and an empty password
pub(crate) fn authorize(builder: RequestBuilder, context: &ApiContext) -> RequestBuilder {
    builder.basic_auth(&context.api_key, None::<&str>)
}

/// Status and reason of a failed response, consuming its body
pub(crate) async fn failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    (status, summarize_body(status, &body))
}

/// Short, human-readable reason for a failed request
fn summarize_body(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("general").and_then(|g| g.get(0)).and_then(|g| g.get("message")))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    match (message, status) {
        (Some(message), _) => message,
        (None, StatusCode::UNAUTHORIZED) => "invalid or missing API key".to_string(),
        (None, StatusCode::TOO_MANY_REQUESTS) => "rate limit exceeded".to_string(),
        (None, _) if body.trim().is_empty() => {
            status.canonical_reason().unwrap_or("request failed").to_string()
        }
        (None, _) => body.chars().take(200).collect(),
    }
}
