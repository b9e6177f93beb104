use std::sync::Arc;

use archivbot_archive::ArchiveApi;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    archive: Arc<dyn ArchiveApi>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub archive: HealthCheck,
    pub checked_at: String,
}

pub fn router(archive: Arc<dyn ArchiveApi>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { archive })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    archive: Arc<dyn ArchiveApi>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(event_name = "system.health.start", bind_address = %address, "health endpoint started");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(archive)).await {
            error!(
                event_name = "system.health.error",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let archive = archive_check(state.archive.as_ref()).await;
    let ready = archive.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck { status: "ready", detail: "archivbot runtime initialized".to_string() },
        archive,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn archive_check(archive: &dyn ArchiveApi) -> HealthCheck {
    match archive.stats().await {
        Ok(stats) => HealthCheck {
            status: "ready",
            detail: format!("archive answered with {} recordings", stats.recordings_total),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("archive request failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use archivbot_archive::ArchiveApi;
    use archivbot_core::{ApiError, Recording, SearchResult, StatsSnapshot};
    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};

    struct StaticArchive {
        stats: Result<StatsSnapshot, ApiError>,
    }

    #[async_trait]
    impl ArchiveApi for StaticArchive {
        async fn search(&self, _query: &str, _limit: u32) -> Result<SearchResult, ApiError> {
            Ok(SearchResult::default())
        }

        async fn lookup(&self, id: &str) -> Result<Recording, ApiError> {
            Err(ApiError::NotFound { id: id.to_owned() })
        }

        async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
            self.stats.clone()
        }
    }

    #[tokio::test]
    async fn health_returns_ready_when_archive_answers() {
        let archive = StaticArchive {
            stats: Ok(StatsSnapshot { recordings_total: 1200, ..StatsSnapshot::default() }),
        };

        let (status, Json(payload)) = health(State(HealthState { archive: Arc::new(archive) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.archive.status, "ready");
        assert!(payload.archive.detail.contains("1200"));
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_archive_fails() {
        let archive = StaticArchive { stats: Err(ApiError::UnexpectedStatus { code: 502 }) };

        let (status, Json(payload)) = health(State(HealthState { archive: Arc::new(archive) })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.archive.status, "degraded");
        assert!(payload.archive.detail.contains("502"));
        assert_eq!(payload.service.status, "ready");
    }
}
