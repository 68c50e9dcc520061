//! Wire format of the Prometheus HTTP query API and its conversion into
//! [`Metric`] values.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Metric, Point, Timestamp};
use crate::{Result, TsdbError};

pub(crate) const NAME_LABEL: &str = "__name__";
const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    // Decoded only after `status` is known to be "success"
    #[serde(default)]
    data: Option<Value>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(rename = "resultType", default)]
    result_type: Option<String>,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct SeriesResult {
    #[serde(default)]
    metric: HashMap<String, String>,
    #[serde(default)]
    values: Option<Vec<(Value, String)>>,
    #[serde(default)]
    value: Option<(Value, String)>,
}

/// Decode a query response body.
///
/// A non-success `status` is reported as [`TsdbError::InvalidRequest`] before
/// `data` is looked at. Anything structurally wrong is [`TsdbError::Parse`].
pub(crate) fn parse_query_response(body: &str) -> Result<Vec<Metric>> {
    let response: ApiResponse = serde_json::from_str(body)?;

    if response.status != STATUS_SUCCESS {
        return Err(TsdbError::InvalidRequest {
            error_type: response.error_type.unwrap_or_else(|| response.status.clone()),
            message: response
                .error
                .unwrap_or_else(|| format!("backend returned status {:?}", response.status)),
        });
    }

    for warning in &response.warnings {
        warn!("backend warning: {}", warning);
    }

    let data: QueryData = response
        .data
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| TsdbError::Parse("missing \"data\" in success response".to_string()))?;

    match data.result_type.as_deref() {
        Some("string") => Err(TsdbError::Parse(
            "string results carry no numeric samples".to_string(),
        )),
        Some("scalar") => {
            let (ts, raw) = serde_json::from_value::<(Value, String)>(data.result)?;
            Ok(vec![Metric {
                values: vec![parse_point(&ts, &raw)?],
                ..Metric::default()
            }])
        }
        _ => {
            let results = serde_json::from_value::<Vec<SeriesResult>>(data.result)?;
            results.into_iter().map(into_metric).collect()
        }
    }
}

fn into_metric(result: SeriesResult) -> Result<Metric> {
    let mut labels: BTreeMap<String, String> = result.metric.into_iter().collect();
    let name = labels.remove(NAME_LABEL).unwrap_or_default();

    let values = match (result.values, result.value) {
        (Some(values), _) => values
            .iter()
            .map(|(ts, raw)| parse_point(ts, raw))
            .collect::<Result<Vec<_>>>()?,
        (None, Some((ts, raw))) => vec![parse_point(&ts, &raw)?],
        (None, None) => Vec::new(),
    };

    Ok(Metric {
        name,
        labels,
        values,
    })
}

fn parse_point(ts: &Value, raw: &str) -> Result<Point> {
    let timestamp = parse_timestamp(ts)?;
    // f64::from_str accepts Prometheus' NaN, +Inf and -Inf spellings
    let value = raw
        .parse::<f64>()
        .map_err(|_| TsdbError::Parse(format!("invalid sample value {:?} at {}", raw, timestamp)))?;
    Ok(Point { value, timestamp })
}

fn parse_timestamp(ts: &Value) -> Result<Timestamp> {
    if let Some(seconds) = ts.as_i64() {
        return Ok(seconds);
    }
    match ts.as_f64() {
        Some(seconds) if seconds.is_finite() => Ok(seconds.trunc() as Timestamp),
        _ => Err(TsdbError::Parse(format!("invalid sample timestamp {}", ts))),
    }
}
