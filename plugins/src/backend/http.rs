//! Shared reqwest plumbing for HTTP backends.
use dossier_core::error::GatewayError;
use serde_json::Value;

const BODY_PREVIEW_LIMIT: usize = 512;

pub(crate) fn client(timeout_ms: u64) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(timeout_ms))
        .user_agent(concat!("dossier/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Transport failures (connect, timeout, broken body) are all transient.
pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> GatewayError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_request() {
        "request"
    } else if err.is_body() {
        "body"
    } else if err.is_decode() {
        return GatewayError::MalformedResponse(format!("decode error from {url}: {err}"));
    } else {
        "unknown"
    };
    GatewayError::ServiceUnavailable(format!("{kind} error from {url}: {err}"))
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().nth(BODY_PREVIEW_LIMIT).is_some() {
        out.push_str("...");
    }
    out
}

/// Body text of a 2xx response; any other status is `ServiceUnavailable`.
pub(crate) async fn success_text(resp: reqwest::Response) -> Result<String, GatewayError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp.text().await.map_err(|err| from_reqwest(err, &url))?;

    if !status.is_success() {
        return Err(GatewayError::ServiceUnavailable(format!(
            "status {} from {url}: {}",
            status.as_u16(),
            preview_body(&body)
        )));
    }
    Ok(body)
}

pub(crate) async fn success_json(resp: reqwest::Response) -> Result<Value, GatewayError> {
    let body = success_text(resp).await?;
    serde_json::from_str::<Value>(&body).map_err(|err| {
        GatewayError::MalformedResponse(format!(
            "invalid JSON ({err}): {}",
            preview_body(&body)
        ))
    })
}
