use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tsdb_client::{ClientConfig, PrometheusClient, TsdbClient, TsdbError};

async fn query_range(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("query").cloned().unwrap_or_default();
    if query == "behind_proxy" {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Html("<html><body><h1>503 Service Unavailable</h1></body></html>"),
        )
            .into_response();
    }
    let reply: (StatusCode, Json<Value>) = match query.as_str() {
        r#"node_load1{job="node"}"# => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "resultType": "matrix",
                    "result": [{
                        "metric": {"__name__": "node_load1", "job": "node", "instance": "a:9100"},
                        "values": [
                            [params["start"].parse::<i64>().unwrap(), "0.25"],
                            [params["end"].parse::<i64>().unwrap(), "0.5"]
                        ]
                    }]
                }
            })),
        ),
        "step" => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": {
                    "resultType": "matrix",
                    "result": [{
                        "metric": {"step": params["step"]},
                        "values": []
                    }]
                }
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "errorType": "bad_data",
                "error": format!("1:1: parse error: unexpected {:?}", query)
            })),
        ),
    };
    reply.into_response()
}

async fn healthy() -> &'static str {
    "Prometheus Server is Healthy.\n"
}

/// Runs a fake Prometheus on its own runtime thread and returns its address.
fn spawn_fake_prometheus() -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let app = Router::new()
                .route("/api/v1/query_range", get(query_range))
                .route("/-/healthy", get(healthy));
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

fn client_for(addr: SocketAddr) -> PrometheusClient {
    PrometheusClient::new(&format!("http://{}", addr)).unwrap()
}

#[test_log::test]
fn test_range_query_over_http() {
    let client = client_for(spawn_fake_prometheus());

    let metrics = client
        .query(r#"node_load1{job="node"}"#, 1_700_000_000, 1_700_000_600)
        .unwrap();

    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].name, "node_load1");
    assert_eq!(metrics[0].values.len(), 2);
    assert_eq!(metrics[0].values[0].timestamp, 1_700_000_000);
    assert_eq!(metrics[0].values[1].value, 0.5);
    assert_eq!(
        client.format_line_name(&metrics[0]),
        "node_load1[instance=a:9100;job=node]"
    );
}

#[test]
fn test_step_sent_to_backend() {
    let addr = spawn_fake_prometheus();
    let config = ClientConfig::new(format!("http://{}", addr)).with_max_points_per_request(100);
    let client = PrometheusClient::with_config(config).unwrap();

    let metrics = client.query_with_step("step", 0, 86_400, 15).unwrap();
    assert_eq!(metrics[0].labels["step"], "864");
}

#[test]
fn test_rejected_query_over_http() {
    let client = client_for(spawn_fake_prometheus());

    match client.query("sum(", 0, 60).unwrap_err() {
        TsdbError::InvalidRequest { error_type, message } => {
            assert_eq!(error_type, "bad_data");
            assert!(message.contains("parse error"), "{}", message);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_html_error_page_is_transport_error() {
    let client = client_for(spawn_fake_prometheus());
    let err = client.query("behind_proxy", 0, 60).unwrap_err();
    assert!(err.is_transport(), "unexpected error: {}", err);
}

#[test]
fn test_healthy_over_http() {
    let client = client_for(spawn_fake_prometheus());
    assert!(client.is_available());
}

#[test]
fn test_unknown_route_is_transport_error() {
    let client = client_for(spawn_fake_prometheus());
    let err = client.query_instant("up", 0).unwrap_err();
    assert!(err.is_transport(), "unexpected error: {}", err);
}

#[test]
fn test_unreachable_backend() {
    let client = PrometheusClient::new("http://127.0.0.1:1").unwrap();
    assert!(!client.is_available());
    assert!(client.query("up", 0, 60).unwrap_err().is_transport());
}
