//! Tally stdio server
//!
//! Newline-delimited JSON-RPC 2.0 over stdin/stdout. Logs go to stderr.
//!
//! Methods:
//! - initialize: server info and the analysis vocabulary
//! - ping
//! - analyses/list: metadata for every analysis
//! - analyses/help: metadata for one analysis
//! - datasets/parse: validate one labeled text token
//! - analyze: run requested analyses over a set of datasets

mod config;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::io::{self, BufRead, Write};
use tally::{outcome_to_json, Tally};
use tally_core::{Dataset, TallyError, MAX_DECIMALS};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const SERVER_NAME: &str = "tally";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<JsonValue>,
    method: String,
    #[serde(default)]
    params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl RpcError {
    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }
}

/// Raw values: a comma-separated token or an array of numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValuesInput {
    Text(String),
    Numbers(Vec<f64>),
}

#[derive(Debug, Deserialize)]
struct DatasetInput {
    label: String,
    values: ValuesInput,
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    datasets: Vec<DatasetInput>,
    analyses: Vec<String>,
    #[serde(default)]
    decimals: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ParseParams {
    label: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct HelpParams {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    category: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_logging();

    let engine_config = config::from_env();
    let tally = Tally::with_standard_library().with_config(engine_config);

    info!(version = SERVER_VERSION, "Tally server started");
    info!(
        decimals = engine_config.decimals,
        ttest_deviation = engine_config.ttest_deviation.as_str(),
        "engine configured"
    );

    let stdin = io::stdin();
    let reader = io::BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading input: {}", e);
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!(bytes = line.len(), "request received");

        if let Some(response) = handle_line(&tally, line) {
            if let Err(e) = write_response(&response) {
                error!("Error writing response: {}", e);
                break;
            }
        }
    }

    info!("Client disconnected, shutting down");
}

fn write_response(response: &RpcResponse) -> io::Result<()> {
    let body = serde_json::to_string(response)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", body)?;
    stdout.flush()
}

/// Handle one input line; `None` for notifications
fn handle_line(tally: &Tally, line: &str) -> Option<RpcResponse> {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!("Error parsing request: {}", e);
            return Some(RpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(RpcError {
                    code: PARSE_ERROR,
                    message: format!("Parse error: {}", e),
                    data: None,
                }),
            });
        }
    };

    let response = handle_request(tally, &request);

    // Notifications (no id) do not receive a response
    if request.id.is_none() {
        debug!(method = %request.method, "notification processed");
        return None;
    }
    Some(response)
}

fn handle_request(tally: &Tally, request: &RpcRequest) -> RpcResponse {
    let result = match request.method.as_str() {
        "initialize" => handle_initialize(tally, &request.params),
        "initialized" | "ping" => Ok(json!({})),
        "analyses/list" => handle_list(tally, &request.params),
        "analyses/help" => handle_help(tally, &request.params),
        "datasets/parse" => handle_parse(tally, &request.params),
        "analyze" => handle_analyze(tally, &request.params),
        _ => Err(RpcError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", request.method),
            data: None,
        }),
    };

    match result {
        Ok(r) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: Some(r),
            error: None,
        },
        Err(e) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id.clone(),
            result: None,
            error: Some(e),
        },
    }
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: &Option<JsonValue>) -> Result<T, RpcError> {
    let params = params.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn handle_initialize(tally: &Tally, params: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
    let client = params
        .as_ref()
        .and_then(|p| p.get("clientInfo"))
        .and_then(|c| c.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    info!(client, "client connected");

    let names: Vec<&str> = tally.list_analyses(None).iter().map(|m| m.name).collect();
    Ok(json!({
        "serverInfo": {
            "name": SERVER_NAME,
            "version": SERVER_VERSION,
        },
        "analyses": names,
        "decimals": tally.config().decimals,
        "ttestDeviation": tally.config().ttest_deviation,
    }))
}

fn handle_list(tally: &Tally, params: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
    let params: ListParams = parse_params(params)?;
    Ok(json!({ "analyses": tally.list_analyses(params.category.as_deref()) }))
}

fn handle_help(tally: &Tally, params: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
    let params: HelpParams = parse_params(params)?;
    match tally.help(&params.name) {
        Some(meta) => Ok(json!(meta)),
        None => Err(RpcError {
            code: INVALID_PARAMS,
            message: format!("No analysis named '{}'", params.name),
            data: Some(json!({ "available": tally.list_analyses(None).iter().map(|m| m.name).collect::<Vec<_>>() })),
        }),
    }
}

fn handle_parse(tally: &Tally, params: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
    let params: ParseParams = parse_params(params)?;
    let decimals = tally.config().decimals;
    Ok(match tally.parse_dataset(&params.label, &params.text) {
        Ok(d) => json!({
            "label": d.label,
            "values": d.values(),
            "n": d.len(),
            "summary": summary_json(tally, &d, decimals),
        }),
        Err(e) => json!({ "error": e }),
    })
}

/// Rounded descriptive summary, or the error when the values overflow
fn summary_json(tally: &Tally, dataset: &Dataset, decimals: u32) -> JsonValue {
    match tally.describe(dataset) {
        Ok(summary) => json!(summary.rounded(decimals)),
        Err(e) => json!({ "error": e }),
    }
}

fn build_dataset(tally: &Tally, input: &DatasetInput) -> Result<Dataset, TallyError> {
    match &input.values {
        ValuesInput::Text(text) => tally.parse_dataset(&input.label, text),
        ValuesInput::Numbers(values) => Dataset::from_values(input.label.as_str(), values.clone())
            .map_err(|e| TallyError::from(e).for_dataset(input.label.as_str())),
    }
}

fn handle_analyze(tally: &Tally, params: &Option<JsonValue>) -> Result<JsonValue, RpcError> {
    let params: AnalyzeParams = parse_params(params)?;
    if params.analyses.is_empty() {
        return Err(RpcError::invalid_params("No analyses requested"));
    }
    let decimals = match params.decimals {
        Some(d) if d > MAX_DECIMALS => {
            return Err(RpcError::invalid_params(format!(
                "decimals must be at most {}, got {}",
                MAX_DECIMALS, d
            )))
        }
        Some(d) => d,
        None => tally.config().decimals,
    };

    let mut datasets = Vec::with_capacity(params.datasets.len());
    let mut dataset_errors = Vec::new();
    for input in &params.datasets {
        match build_dataset(tally, input) {
            Ok(d) => datasets.push(d),
            Err(e) => {
                warn!(dataset = %input.label, "dataset rejected: {}", e.message);
                dataset_errors.push(e);
            }
        }
    }

    let summaries: Vec<JsonValue> = datasets
        .iter()
        .map(|d| json!({ "label": d.label, "summary": summary_json(tally, d, decimals) }))
        .collect();

    let report = tally.analyze(&datasets, &params.analyses);
    let results: serde_json::Map<String, JsonValue> = report
        .iter()
        .map(|(name, outcome)| (name.to_string(), outcome_to_json(outcome, decimals)))
        .collect();

    info!(
        analyses = report.len(),
        failed = report.failed().count(),
        datasets = datasets.len(),
        "analysis batch complete"
    );

    Ok(json!({
        "results": results,
        "datasets": summaries,
        "datasetErrors": dataset_errors,
    }))
}
