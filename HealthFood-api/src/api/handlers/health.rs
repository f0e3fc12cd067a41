use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use health_food_domain::health::{HealthStatus, SystemHealth};

use crate::api::state::AppState;

/// Health check response with component details
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// `database`, `ai` and `speech`
    pub components: BTreeMap<String, ComponentHealthStatus>,
    /// Environment information
    pub environment: String,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting
pub fn initialize_server_start_time() {
    SERVER_START_TIME.get_or_init(unix_now);
}

/// Build the public health response from the domain report
pub fn health_response(system_health: SystemHealth) -> (StatusCode, HealthResponse) {
    let now = unix_now();
    // Missing AI or speech credentials still leave the API usable
    let code = match system_health.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };

    let components = system_health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealthStatus {
                    status: component.status.label().to_string(),
                    message: component.details,
                },
            )
        })
        .collect();

    let response = HealthResponse {
        status: system_health.status.label().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|&start| now.saturating_sub(start)),
        components,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };
    (code, response)
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API is healthy or running without optional services", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");
    let (code, response) = health_response(state.health.get_system_health().await);
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_food_domain::health::HealthComponent;
    use std::collections::BTreeMap;

    fn report(database: HealthStatus, ai: HealthStatus) -> SystemHealth {
        let mut components = BTreeMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: database,
                details: Some("SQLite".to_string()),
            },
        );
        components.insert("ai".to_string(), HealthComponent { status: ai, details: None });
        SystemHealth::from_components(components)
    }

    #[test]
    fn degraded_is_still_ok() {
        let (code, response) = health_response(report(HealthStatus::Healthy, HealthStatus::Degraded));
        assert_eq!(code, StatusCode::OK);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.components["database"].status, "ok");
    }

    #[test]
    fn unhealthy_is_unavailable() {
        let (code, response) = health_response(report(HealthStatus::Unhealthy, HealthStatus::Healthy));
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.components["database"].status, "error");
    }
}
