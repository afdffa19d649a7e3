//! HTTP surface for the health monitor
//!
//! One route, `/`, accepting GET and POST identically. The request body is
//! handed to [`HealthMonitor::handle`] untouched.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use lbsync_core::{HealthMonitor, HealthStatus};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Build the health router
pub fn router(monitor: Arc<HealthMonitor>) -> Router {
    Router::new()
        .route("/", get(health_handler).post(health_handler))
        .with_state(monitor)
}

/// Serve the health router on an already bound listener until it fails
pub async fn serve(listener: TcpListener, monitor: Arc<HealthMonitor>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Health endpoint listening");

    axum::serve(listener, router(monitor)).await?;
    Ok(())
}

/// GET|POST / - Compare domains against their load balancers
async fn health_handler(
    State(monitor): State<Arc<HealthMonitor>>,
    body: Bytes,
) -> impl IntoResponse {
    let (status, text) = monitor.handle(&body).await;
    (
        status_code(status),
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::NOT_FOUND,
        HealthStatus::BadRequest => StatusCode::BAD_REQUEST,
    }
}
