//! `revalidate`: ask a running portal to drop its cached pages.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

/// POST the shared secret to `{server}/api/revalidate` and return the
/// portal's JSON answer. Any non-2xx answer is an error carrying the portal's
/// message.
pub async fn run(server: &str, secret: &str) -> Result<Value> {
    let url = format!("{server}/api/revalidate");
    let response = reqwest::Client::new()
        .post(&url)
        .json(&json!({ "secret": secret }))
        .send()
        .await
        .with_context(|| format!("failed to reach {url}"))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message");
        bail!("revalidation failed with {status}: {message}");
    }

    tracing::info!("revalidated {}", server);
    Ok(body)
}
