pub mod prometheus;
mod response;

use std::collections::BTreeMap;

use crate::models::{Metric, Timestamp};
use crate::Result;

pub use self::prometheus::{PrometheusClient, HEALTHY_SENTINEL};

/// Backend-agnostic time-series client.
///
/// Every query call is one blocking round trip. An empty vector means the
/// backend matched nothing; failures always come back as `Err`.
pub trait TsdbClient: Send + Sync {
    /// Resolution used when the caller does not pass one.
    fn default_step(&self) -> u64;

    /// Range query over `[start, end]` with an explicit step in seconds.
    fn query_with_step(
        &self,
        query: &str,
        start: Timestamp,
        end: Timestamp,
        step: u64,
    ) -> Result<Vec<Metric>>;

    /// Range query at the client's default step.
    fn query(&self, query: &str, start: Timestamp, end: Timestamp) -> Result<Vec<Metric>> {
        self.query_with_step(query, start, end, self.default_step())
    }

    /// Evaluate `query` at a single instant.
    fn query_instant(&self, query: &str, time: Timestamp) -> Result<Vec<Metric>>;

    /// Health probe. Never fails; any error reads as unavailable.
    fn is_available(&self) -> bool;

    fn format_line_name(&self, metric: &Metric) -> String {
        format_line_name(metric)
    }
}

/// Human-readable series label, e.g. `up[instance=db:9100;job=node]`.
pub fn format_line_name(metric: &Metric) -> String {
    format_labels(&metric.name, &metric.labels)
}

/// Same as [`format_line_name`] for a name and label set held separately.
pub fn format_labels(name: &str, labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return name.to_string();
    }
    let rendered: Vec<String> = labels
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("{}[{}]", name, rendered.join(";"))
}
