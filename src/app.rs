use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::calculator::{Calculator, MetricSet};
use crate::config::CalculatorConfig;
use crate::error::CalcError;
use crate::metric::MetricId;

pub struct AppState {
    calculator: Mutex<Calculator>,
}

impl AppState {
    pub fn new(config: &CalculatorConfig) -> Self {
        AppState {
            calculator: Mutex::new(Calculator::new(config)),
        }
    }

    fn calculator(&self) -> MutexGuard<'_, Calculator> {
        // Every handler leaves the calculator consistent, so a poisoned
        // lock still guards valid state.
        self.calculator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Value of an edit: text from an input box or a number from a slider.
#[derive(Deserialize)]
#[serde(untagged)]
enum EditValue {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct EditRequest {
    metric: String,
    value: EditValue,
}

#[derive(Deserialize)]
struct CommitRequest {
    metric: Option<String>,
}

#[derive(Serialize)]
struct MetricsResponse {
    status: &'static str,
    metrics: MetricSet,
    display: BTreeMap<MetricId, String>,
    changed: Vec<MetricId>,
    can_undo: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    message: String,
}

impl MetricsResponse {
    fn new(calc: &Calculator, changed: Vec<MetricId>) -> Self {
        let metrics = calc.metrics().clone();
        let display = MetricId::ALL
            .iter()
            .map(|id| (*id, metrics.display(*id)))
            .collect();
        MetricsResponse {
            status: "ok",
            metrics,
            display,
            changed,
            can_undo: calc.can_undo(),
        }
    }
}

impl From<JsonRejection> for CalcError {
    fn from(rejection: JsonRejection) -> Self {
        CalcError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for CalcError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                status: "error",
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/metrics", get(get_metrics))
        .route("/api/metrics/edit", post(edit_metric))
        .route("/api/metrics/commit", post(commit_metric))
        .route("/api/metrics/undo", post(undo))
        .route("/api/metrics/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(addr: &str, config: CalculatorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = Arc::new(AppState::new(&config));
    let app = router(app_state);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let calc = state.calculator();
    Json(MetricsResponse::new(&calc, Vec::new()))
}

async fn edit_metric(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EditRequest>, JsonRejection>,
) -> Result<Json<MetricsResponse>, CalcError> {
    let Json(payload) = payload?;
    let metric: MetricId = payload.metric.parse()?;
    let mut calc = state.calculator();

    let changed = match payload.value {
        EditValue::Number(value) => calc.set(metric, value),
        EditValue::Text(text) => calc.edit(metric, &text),
    };
    debug!("edit {} changed {:?}", metric, changed);

    Ok(Json(MetricsResponse::new(&calc, changed)))
}

async fn commit_metric(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CommitRequest>, JsonRejection>,
) -> Result<Json<MetricsResponse>, CalcError> {
    let Json(payload) = payload?;
    let metric = payload
        .metric
        .map(|name| name.parse::<MetricId>())
        .transpose()?;
    let mut calc = state.calculator();

    match metric {
        Some(metric) => {
            calc.commit(metric);
        }
        None => calc.commit_all(),
    }

    Ok(Json(MetricsResponse::new(&calc, Vec::new())))
}

async fn undo(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut calc = state.calculator();
    if calc.undo() {
        Json(MetricsResponse::new(&calc, Vec::new())).into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                status: "error",
                message: "nothing to undo".to_string(),
            }),
        )
            .into_response()
    }
}

async fn reset(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    let mut calc = state.calculator();
    calc.reset();
    Json(MetricsResponse::new(&calc, Vec::new()))
}
