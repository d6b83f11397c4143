use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};
use sea_orm::DatabaseConnection;
use tracing::warn;

pub struct HealthMonitor {
    db: DatabaseConnection,
}

impl HealthMonitor {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Healthy as long as the database answers.
    pub async fn is_healthy(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(err) => {
                warn!("Database ping failed: {}", err);
                false
            }
        }
    }
}

pub(crate) fn health_routes(monitor: Arc<HealthMonitor>) -> Router {
    Router::new().route("/up", get(|| async { "OK" })).route(
        "/health",
        get(move || async move {
            if monitor.is_healthy().await {
                (StatusCode::OK, "OK")
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "UNHEALTHY")
            }
        }),
    )
}
