//! Liveness endpoint.
//!
//! Answers as soon as the router is serving. Store reachability is not part
//! of the check: with `DATABASE_URL` set the pool and migrations are already
//! verified at startup, and the in-memory stores cannot be down.

use axum::Json;
use serde::Serialize;

const STATUS_OK: &str = "ok";

/// Body of the liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: STATUS_OK })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_reports_ok() {
        let Json(body) = check().await;
        assert_eq!(body.status, "ok");
    }
}
