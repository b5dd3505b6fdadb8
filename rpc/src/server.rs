//! Axum-based RPC server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use proofpass_registry::{RegistryMetrics, VerificationRegistry};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::error::RpcError;
use crate::handlers::{dispatch, RpcRequest};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RpcState {
    pub registry: Arc<VerificationRegistry>,
    pub metrics: Option<Arc<RegistryMetrics>>,
}

/// Build the router: `POST /`, `GET /health`, `GET /metrics`.
///
/// `cors_origins` lists the front-end origins allowed to call the server;
/// `"*"` allows any origin.
pub fn router(state: RpcState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}

async fn rpc_handler(
    State(state): State<RpcState>,
    body: Result<Json<RpcRequest>, JsonRejection>,
) -> Result<Json<Value>, RpcError> {
    let Json(request) = body.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    let action = request.action();
    tracing::debug!(action, "rpc request");

    let registry = Arc::clone(&state.registry);
    let response = tokio::task::spawn_blocking(move || dispatch(&registry, request))
        .await
        .map_err(|e| RpcError::Server(format!("{action} task failed: {e}")))??;
    Ok(Json(response))
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn metrics_handler(State(state): State<RpcState>) -> Result<Response, RpcError> {
    let metrics = state.metrics.as_ref().ok_or(RpcError::MetricsDisabled)?;
    let text = metrics
        .encode_text()
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}

pub struct RpcServer {
    pub bind: SocketAddr,
    pub cors_origins: Vec<String>,
    state: RpcState,
}

impl RpcServer {
    pub fn new(bind: SocketAddr, state: RpcState, cors_origins: Vec<String>) -> Self {
        Self {
            bind,
            cors_origins,
            state,
        }
    }

    /// Bind and serve until `shutdown` resolves, then drain open requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state, &self.cors_origins);
        let listener = TcpListener::bind(self.bind)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.bind)))?;
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        tracing::info!(addr = %local, "RPC server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;

        tracing::info!("RPC server stopped");
        Ok(())
    }
}
