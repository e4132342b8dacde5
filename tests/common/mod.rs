//! Shared utilities for integration testing.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use api_spec_check::config::{AccountingModel, CheckConfig, ConstructionConfig};
use api_spec_check::fetcher::types::NetworkIdentifier;

/// Requests seen by a mock node, as `(path, body)`.
pub type RequestLog = Arc<Mutex<Vec<(String, Value)>>>;

/// Start a programmable mock node on an ephemeral port.
///
/// `handler` receives the request path and JSON body and returns the status
/// code and JSON body to answer with.
pub async fn start_programmable_node<F>(handler: F) -> (SocketAddr, RequestLog)
where
    F: Fn(&str, &Value) -> (u16, Value) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));

    let requests = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, handler.as_ref(), &requests).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

async fn serve<F>(mut socket: TcpStream, handler: &F, log: &RequestLog) -> std::io::Result<()>
where
    F: Fn(&str, &Value) -> (u16, Value),
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body: Value = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);

    log.lock().unwrap().push((path.clone(), body.clone()));
    let (status, response) = handler(&path, &body);

    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let payload = response.to_string();
    let response_str = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        payload.len(),
        payload
    );
    socket.write_all(response_str.as_bytes()).await?;
    socket.shutdown().await
}

pub fn sweet() -> NetworkIdentifier {
    NetworkIdentifier::new("sweet", "sweeter")
}

/// Configuration pointing both endpoints at `addr`.
#[allow(dead_code)]
pub fn config_for(addr: SocketAddr, model: AccountingModel) -> CheckConfig {
    let url = format!("http://{}", addr);
    CheckConfig {
        network: sweet(),
        online_url: url.clone(),
        max_retries: 0,
        http_timeout_secs: 5,
        construction: Some(ConstructionConfig {
            offline_url: url,
            accounting_model: model,
            ..ConstructionConfig::default()
        }),
        ..CheckConfig::default()
    }
}

fn block_json(index: i64, with_transfer: bool) -> Value {
    let transactions = if with_transfer {
        json!([{
            "transaction_identifier": {"hash": format!("tx-{}", index)},
            "operations": [{
                "operation_identifier": {"index": 0},
                "type": "TRANSFER",
                "status": "SUCCESS",
                "account": {"address": "alice"},
                "amount": {"value": "100", "currency": {"symbol": "BTC", "decimals": 8}}
            }]
        }])
    } else {
        json!([])
    };
    json!({
        "block_identifier": {"index": index, "hash": format!("block-{}", index)},
        "parent_block_identifier": {
            "index": (index - 1).max(0),
            "hash": format!("block-{}", (index - 1).max(0))
        },
        "timestamp": 1_600_000_000_000i64 + index,
        "transactions": transactions
    })
}

fn error_json(code: i64, message: &str) -> Value {
    json!({"code": code, "message": message, "retriable": false})
}

/// Answer like a conforming node serving `sweet/sweeter` with blocks
/// `0..=tip` and a single transfer to `alice` in block `account_block`.
pub fn conforming_node(
    tip: i64,
    account_block: i64,
) -> impl Fn(&str, &Value) -> (u16, Value) + Send + Sync + 'static {
    move |path: &str, body: &Value| {
        if path == "/network/list" {
            return (
                200,
                json!({"network_identifiers": [
                    {"blockchain": "sweet", "network": "sweeter"},
                    {"blockchain": "other", "network": "x"}
                ]}),
            );
        }

        let blockchain = body["network_identifier"]["blockchain"].as_str().unwrap_or("");
        if blockchain.is_empty() {
            return (500, error_json(4, "invalid network identifier"));
        }

        match path {
            "/network/status" => (
                200,
                json!({
                    "current_block_identifier": {"index": tip, "hash": format!("block-{}", tip)},
                    "current_block_timestamp": 1_600_000_000_000i64 + tip,
                    "genesis_block_identifier": {"index": 0, "hash": "block-0"}
                }),
            ),
            "/network/options" => (
                200,
                json!({
                    "version": {"rosetta_version": "1.4.13", "node_version": "1.0.0"},
                    "allow": {
                        "operation_statuses": [
                            {"status": "SUCCESS", "successful": true},
                            {"status": "FAILURE", "successful": false}
                        ],
                        "operation_types": ["TRANSFER"],
                        "errors": [{"code": 4, "message": "invalid network identifier", "retriable": false}],
                        "historical_balance_lookup": true
                    }
                }),
            ),
            "/account/balance" => (
                200,
                json!({
                    "block_identifier": {"index": account_block, "hash": format!("block-{}", account_block)},
                    "balances": [{"value": "100", "currency": {"symbol": "BTC", "decimals": 8}}]
                }),
            ),
            "/account/coins" => (
                200,
                json!({
                    "block_identifier": {"index": tip, "hash": format!("block-{}", tip)},
                    "coins": [{
                        "coin_identifier": {"identifier": "tx-1:0"},
                        "amount": {"value": "100", "currency": {"symbol": "BTC", "decimals": 8}}
                    }]
                }),
            ),
            "/block" => {
                let requested = &body["block_identifier"];
                let index = match (requested["index"].as_i64(), requested["hash"].as_str()) {
                    (Some(index), _) => index,
                    (None, Some(hash)) => hash
                        .strip_prefix("block-")
                        .and_then(|i| i.parse().ok())
                        .unwrap_or(-1),
                    (None, None) => tip,
                };
                if !(0..=tip).contains(&index) {
                    return (500, error_json(6, "block not found"));
                }
                (200, json!({"block": block_json(index, index == account_block)}))
            }
            _ => (404, error_json(1, "unknown endpoint")),
        }
    }
}

/// Paths requested from a node, in order.
pub fn paths(log: &RequestLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(path, _)| path.clone()).collect()
}
