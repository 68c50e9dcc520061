use std::env;

use chrono::{TimeZone, Utc};
use tracing::{error, info};
use tsdb_client::{
    logging, metrics, ClientConfig, Metric, PrometheusClient, TimeRange, TsdbClient, TsdbError,
};

const DEFAULT_QUERY: &str = "process_resident_memory_bytes";
const DEFAULT_FETCH_RANGE: u64 = 3600;

fn main() {
    if let Err(e) = logging::init_logger("promq") {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), TsdbError> {
    let mut args = env::args().skip(1);
    let query = args.next().unwrap_or_else(|| DEFAULT_QUERY.to_string());
    let fetch_range = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| TsdbError::Config(format!("fetch range {:?}: {}", raw, e)))?,
        None => DEFAULT_FETCH_RANGE,
    };

    let config = ClientConfig::from_env()?;
    let client = PrometheusClient::with_config(config)?;

    if !client.is_available() {
        return Err(TsdbError::Transport(format!(
            "Prometheus at {} is not available",
            client.base_url()
        )));
    }
    info!("Connected to {}", client.base_url());

    let range = TimeRange::last(fetch_range);
    let series = client.query(&query, range.start, range.end)?;
    info!("{} returned {} series", query, series.len());

    if env::var("PROMQ_OUTPUT").as_deref() == Ok("json") {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else {
        for metric in &series {
            println!("{}", summarize(&client, metric));
        }
    }

    if env::var("PROMQ_CLIENT_METRICS").is_ok() {
        eprint!("{}", metrics::gather());
    }
    Ok(())
}

fn summarize(client: &impl TsdbClient, metric: &Metric) -> String {
    let name = client.format_line_name(metric);
    match metric.last_point() {
        Some(point) => {
            let at = Utc
                .timestamp_opt(point.timestamp, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| point.timestamp.to_string());
            format!("{}\t{} points\tlast={} @ {}", name, metric.values.len(), point.value, at)
        }
        None => format!("{}\t0 points", name),
    }
}
