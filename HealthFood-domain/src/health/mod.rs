//! Readiness report covering the database, the AI model and the speech service

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use health_food_data::database::{self, DatabasePool};
use tracing::warn;

use crate::ai::ChatModel;
use crate::speech::SpeechService;

/// Status of one component or of the whole system
///
/// Ordered from best to worst, so the system status is the maximum over its
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    /// Usable, but running without an optional collaborator
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Label used on the wire
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "ok",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: HealthStatus,
    pub details: Option<String>,
}

impl HealthComponent {
    fn healthy(details: Option<String>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            details,
        }
    }

    /// Healthy when configured, degraded with `missing` otherwise
    fn optional(configured: bool, missing: &str) -> Self {
        if configured {
            Self::healthy(None)
        } else {
            Self {
                status: HealthStatus::Degraded,
                details: Some(missing.to_string()),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: HealthStatus,
    /// Keyed by component name: `database`, `ai`, `speech`
    pub components: BTreeMap<String, HealthComponent>,
}

impl SystemHealth {
    pub fn from_components(components: BTreeMap<String, HealthComponent>) -> Self {
        let status = components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self { status, components }
    }
}

#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    async fn get_system_health(&self) -> SystemHealth;
}

#[derive(Clone)]
pub struct HealthService {
    pool: DatabasePool,
    model: Arc<dyn ChatModel>,
    speech: Arc<dyn SpeechService>,
}

impl HealthService {
    pub fn new(pool: DatabasePool, model: Arc<dyn ChatModel>, speech: Arc<dyn SpeechService>) -> Self {
        Self { pool, model, speech }
    }

    fn database(&self) -> HealthComponent {
        match database::check_connection(&self.pool) {
            Ok(()) => HealthComponent::healthy(Some(database::get_connection_info(&self.pool))),
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: HealthStatus::Unhealthy,
                    details: Some(format!("Database connection error: {}", e)),
                }
            }
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = BTreeMap::new();
        components.insert("database".to_string(), self.database());
        components.insert(
            "ai".to_string(),
            HealthComponent::optional(self.model.is_configured(), "Azure OpenAI is not configured"),
        );
        components.insert(
            "speech".to_string(),
            HealthComponent::optional(self.speech.is_available(), "Azure Speech is not configured"),
        );
        SystemHealth::from_components(components)
    }
}
