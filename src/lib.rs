//! Blocking client for time-series databases, with a Prometheus backend.
//!
//! ```no_run
//! use tsdb_client::{PrometheusClient, TimeRange, TsdbClient};
//!
//! let client = PrometheusClient::new("http://localhost:9090")?;
//! let range = TimeRange::last(3600);
//! for metric in client.query("up", range.start, range.end)? {
//!     println!("{} ({} points)", client.format_line_name(&metric), metric.values.len());
//! }
//! # Ok::<(), tsdb_client::TsdbError>(())
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod planner;
pub mod transport;
pub mod tsdb;

pub use config::ClientConfig;
pub use error::{Result, TsdbError};
pub use models::{Metric, Point, QueryRequest, TimeRange, Timestamp};
pub use transport::{HttpTransport, Transport};
pub use tsdb::{format_labels, format_line_name, PrometheusClient, TsdbClient};
