use std::time::Duration;

use reqwest::StatusCode;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::{Result, TsdbError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Performs one blocking GET and returns the fully buffered body.
pub trait Transport: Send + Sync {
    fn perform(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// HTTP transport backed by a blocking `reqwest` client.
///
/// Error statuses the Prometheus API uses to describe a rejected query
/// (400, 422, 503) still return their body so the caller can read the
/// backend's `error` and `errorType`. Any other non-2xx status fails.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn perform(&self, url: &str, timeout: Duration) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).timeout(timeout).send()?;
        let status = response.status();
        if !status.is_success() && !is_api_error_status(status) {
            return Err(TsdbError::Transport(format!(
                "unexpected HTTP status {} from {}",
                status, url
            )));
        }
        let body = response.text()?;
        debug!("{} returned {} ({} bytes)", url, status, body.len());
        check_error_body(status, body, url)
    }
}

/// An API error status is only trusted when its body is JSON; anything else
/// (an HTML page from a proxy, a plain-text 503) is a transport failure.
fn check_error_body(status: StatusCode, body: String, url: &str) -> Result<String> {
    if status.is_success() || serde_json::from_str::<IgnoredAny>(&body).is_ok() {
        return Ok(body);
    }
    Err(TsdbError::Transport(format!(
        "HTTP status {} from {} with non-JSON body",
        status, url
    )))
}

fn is_api_error_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::SERVICE_UNAVAILABLE
    )
}
