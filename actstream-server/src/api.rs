use std::sync::Arc;

use actstream_models::{
    DescribeDbClustersRequest, DescribeDbClustersResponse, StartActivityStreamRequest,
    StartActivityStreamResponse, StopActivityStreamRequest, StopActivityStreamResponse,
};
use actstream_orchestrations::control_plane::routes;
use actstream_orchestrations::{ControlPlane, ControlPlaneError, SandboxControlPlane};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub control_plane: Arc<SandboxControlPlane>,
}

/// Create the sandbox control plane router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health_check))
        .route(routes::START_ACTIVITY_STREAM, post(start_activity_stream))
        .route(routes::STOP_ACTIVITY_STREAM, post(stop_activity_stream))
        .route(routes::DESCRIBE_DB_CLUSTERS, post(describe_db_clusters))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the sandbox server
pub async fn start_server(port: u16, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("✓ Sandbox control plane listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "actstream-sandbox",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn start_activity_stream(
    State(state): State<AppState>,
    Json(request): Json<StartActivityStreamRequest>,
) -> Result<Json<StartActivityStreamResponse>, AppError> {
    let response = state.control_plane.start_activity_stream(request).await?;
    Ok(Json(response))
}

async fn stop_activity_stream(
    State(state): State<AppState>,
    Json(request): Json<StopActivityStreamRequest>,
) -> Result<Json<StopActivityStreamResponse>, AppError> {
    let response = state.control_plane.stop_activity_stream(request).await?;
    Ok(Json(response))
}

async fn describe_db_clusters(
    State(state): State<AppState>,
    Json(request): Json<DescribeDbClustersRequest>,
) -> Result<Json<DescribeDbClustersResponse>, AppError> {
    let response = state.control_plane.describe_db_clusters(request).await?;
    Ok(Json(response))
}

/// Control plane fault rendered as `{"code", "message"}`
#[derive(Debug)]
struct AppError(ControlPlaneError);

impl From<ControlPlaneError> for AppError {
    fn from(err: ControlPlaneError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = self.0.to_api_body();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        tracing::debug!(%status, code = %body.code, "Control plane request failed");
        (status, Json(body)).into_response()
    }
}
