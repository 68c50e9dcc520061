use tracing::{debug, warn};

use super::response::parse_query_response;
use super::TsdbClient;
use crate::config::ClientConfig;
use crate::metrics::{self, RequestTimer};
use crate::models::{Metric, QueryRequest, Timestamp};
use crate::planner::effective_step;
use crate::transport::{HttpTransport, Transport};
use crate::{Result, TsdbError};

/// Exact body served by `/-/healthy` on a healthy server, minus the trailing newline.
pub const HEALTHY_SENTINEL: &str = "Prometheus Server is Healthy.";

const ENDPOINT_QUERY_RANGE: &str = "query_range";
const ENDPOINT_QUERY: &str = "query";
const ENDPOINT_HEALTHY: &str = "healthy";

/// Client for the Prometheus HTTP query API.
///
/// Holds no session state besides its configuration; concurrent calls are
/// safe whenever the transport is.
#[derive(Debug, Clone)]
pub struct PrometheusClient<T = HttpTransport> {
    base_url: String,
    config: ClientConfig,
    transport: T,
}

impl PrometheusClient<HttpTransport> {
    /// Create a client for `base_url` (e.g. `http://localhost:9090`) with
    /// default settings. No request is made.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> PrometheusClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn query_range_url(&self, request: &QueryRequest) -> String {
        format!(
            "{}/api/v1/query_range?query={}&start={}&end={}&step={}",
            self.base_url,
            urlencoding::encode(&request.query),
            request.start,
            request.end,
            request.step
        )
    }

    pub fn query_url(&self, query: &str, time: Timestamp) -> String {
        format!(
            "{}/api/v1/query?query={}&time={}",
            self.base_url,
            urlencoding::encode(query),
            time
        )
    }

    pub fn health_url(&self) -> String {
        format!("{}/-/healthy", self.base_url)
    }

    fn fetch(&self, endpoint: &'static str, url: &str) -> Result<Vec<Metric>> {
        let _timer = RequestTimer::new(endpoint);
        let result = self
            .transport
            .perform(url, self.config.timeout)
            .and_then(|body| parse_query_response(&body));

        match &result {
            Ok(series) => metrics::record_series(series.len()),
            Err(e) => {
                debug!("{} request failed: {}", endpoint, e);
                metrics::record_failure(endpoint, e.kind());
            }
        }
        result
    }
}

impl<T: Transport> TsdbClient for PrometheusClient<T> {
    fn default_step(&self) -> u64 {
        self.config.default_step
    }

    fn query_with_step(
        &self,
        query: &str,
        start: Timestamp,
        end: Timestamp,
        step: u64,
    ) -> Result<Vec<Metric>> {
        if end < start {
            return Err(TsdbError::InvalidRequest {
                error_type: "bad_data".to_string(),
                message: format!("end timestamp {} is before start timestamp {}", end, start),
            });
        }

        let selected = step.max(1);
        let interval = end.abs_diff(start);
        let step = effective_step(selected, interval, self.config.max_points_per_request);
        if step != selected {
            debug!(
                "step raised from {}s to {}s to stay within {} points",
                selected, step, self.config.max_points_per_request
            );
        }

        let request = QueryRequest {
            query: query.to_string(),
            start,
            end,
            step,
        };
        self.fetch(ENDPOINT_QUERY_RANGE, &self.query_range_url(&request))
    }

    fn query_instant(&self, query: &str, time: Timestamp) -> Result<Vec<Metric>> {
        let url = self.query_url(query, time);
        self.fetch(ENDPOINT_QUERY, &url)
    }

    fn is_available(&self) -> bool {
        let _timer = RequestTimer::new(ENDPOINT_HEALTHY);
        match self.transport.perform(&self.health_url(), self.config.timeout) {
            Ok(body) if body.trim_end() == HEALTHY_SENTINEL => true,
            Ok(body) => {
                warn!("{} is not healthy: {:?}", self.base_url, body);
                metrics::record_failure(ENDPOINT_HEALTHY, "unhealthy");
                false
            }
            Err(e) => {
                warn!("health check against {} failed: {}", self.base_url, e);
                metrics::record_failure(ENDPOINT_HEALTHY, e.kind());
                false
            }
        }
    }
}
