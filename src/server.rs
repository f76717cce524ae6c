//! Embedded HTTP surface of the dashboard.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::binding::{Dependency, InputValues, Output, Registry};
use crate::dataset::Dataset;
use crate::error::{BindingError, ServerError};
use crate::layout::{dashboard_layout, dashboard_page, error_page, Node};

const STYLE_CSS: &str = include_str!("../assets/style.css");
const DASHBOARD_JS: &str = include_str!("../assets/dashboard.js");

#[derive(Clone)]
enum DataState {
    Ready(Arc<Dataset>),
    Unavailable(Arc<str>),
}

/// Shared, read-only state behind every request.
#[derive(Clone)]
pub struct AppState {
    data: DataState,
    registry: Arc<Registry>,
}

impl AppState {
    pub fn ready(dataset: Dataset, registry: Registry) -> Self {
        Self {
            data: DataState::Ready(dataset.into_shared()),
            registry: Arc::new(registry),
        }
    }

    /// State for a dataset that failed to load: the page shows `reason` and
    /// every update fails with [`BindingError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>, registry: Registry) -> Self {
        let reason: String = reason.into();
        Self {
            data: DataState::Unavailable(Arc::from(reason)),
            registry: Arc::new(registry),
        }
    }

    pub fn update(&self, output: &str, values: &InputValues) -> Result<Output, BindingError> {
        match &self.data {
            DataState::Ready(dataset) => self.registry.dispatch(dataset, output, values),
            DataState::Unavailable(reason) => Err(BindingError::Unavailable {
                reason: reason.to_string(),
            }),
        }
    }

    fn rows(&self) -> usize {
        match &self.data {
            DataState::Ready(dataset) => dataset.len(),
            DataState::Unavailable(_) => 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub output: String,
    #[serde(default)]
    pub inputs: InputValues,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub output: String,
    pub kind: &'static str,
    pub value: Value,
}

impl UpdateResponse {
    fn new(output: String, result: Output) -> Self {
        let (kind, value) = match result {
            Output::Figure(spec) => ("figure", spec.to_figure()),
            Output::Text(text) => ("text", Value::String(text)),
        };
        Self {
            output,
            kind,
            value,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    rows: usize,
}

fn status_for(error: &BindingError) -> StatusCode {
    match error {
        BindingError::UnknownOutput { .. } => StatusCode::NOT_FOUND,
        BindingError::MissingInput { .. } | BindingError::InvalidInput { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        BindingError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/assets/style.css", get(style))
        .route("/assets/dashboard.js", get(script))
        .route("/api/layout", get(layout))
        .route("/api/dependencies", get(dependencies))
        .route("/api/update", post(update))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Serves the dashboard on `addr` until ctrl-c.
pub async fn serve(state: AppState, addr: &str) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn index(State(state): State<AppState>) -> Response {
    match &state.data {
        DataState::Ready(_) => Html(dashboard_page()).into_response(),
        DataState::Unavailable(reason) => {
            (StatusCode::SERVICE_UNAVAILABLE, Html(error_page(reason))).into_response()
        }
    }
}

async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        DASHBOARD_JS,
    )
}

async fn layout() -> Json<Node> {
    Json(dashboard_layout())
}

async fn dependencies(State(state): State<AppState>) -> Json<Vec<Dependency>> {
    Json(state.registry.dependencies())
}

async fn update(State(state): State<AppState>, Json(req): Json<UpdateRequest>) -> Response {
    match state.update(&req.output, &req.inputs) {
        Ok(result) => Json(UpdateResponse::new(req.output, result)).into_response(),
        Err(e) => {
            warn!("update of {:?} failed: {}", req.output, e);
            let body = ErrorBody {
                error: e.to_string(),
            };
            (status_for(&e), Json(body)).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let status = match state.data {
        DataState::Ready(_) => "ok",
        DataState::Unavailable(_) => "unavailable",
    };
    Json(Health {
        status,
        rows: state.rows(),
    })
}
