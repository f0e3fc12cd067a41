use std::sync::Arc;

use axum::extract::FromRef;

use health_food_data::database::DatabasePool;
use health_food_domain::ai::{AzureOpenAiClient, ChatModel, UnconfiguredChatModel};
use health_food_domain::config::AppConfig;
use health_food_domain::health::{HealthService, HealthServiceTrait};
use health_food_domain::services::{AccountService, Services};
use health_food_domain::speech::{AzureSpeechClient, DisabledSpeech, SpeechService};
use tracing::{info, warn};

/// Settings of the HTTP server itself
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Empty or `*` allows any origin
    pub allowed_origins: Vec<String>,
    /// Static frontend served for non-API paths
    pub frontend_dir: Option<String>,
    pub seed_foods_csv: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            allowed_origins: vec!["*".to_string()],
            frontend_dir: None,
            seed_foods_csv: "data/seed_food.csv".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            frontend_dir: std::env::var("FRONTEND_DIR").ok().filter(|dir| !dir.trim().is_empty()),
            seed_foods_csv: std::env::var("SEED_FOODS_CSV").unwrap_or(defaults.seed_foods_csv),
        }
    }
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub speech: Arc<dyn SpeechService>,
    pub health: Arc<dyn HealthServiceTrait>,
}

impl AppState {
    /// Wire services to the pool and the configured AI and speech clients
    pub fn new(pool: DatabasePool, config: &AppConfig) -> Self {
        let model: Arc<dyn ChatModel> = match AzureOpenAiClient::from_config(&config.ai) {
            Some(client) => {
                info!("Azure OpenAI client configured for {}", config.ai.deployment);
                Arc::new(client)
            }
            None => {
                warn!("AZURE_OPENAI_ENDPOINT or AZURE_OPENAI_API_KEY missing, AI features use fallbacks");
                Arc::new(UnconfiguredChatModel)
            }
        };

        let speech: Arc<dyn SpeechService> = match AzureSpeechClient::from_config(&config.speech) {
            Some(client) => Arc::new(client),
            None => {
                warn!("AZURE_SPEECH_KEY missing, speech endpoints are disabled");
                Arc::new(DisabledSpeech)
            }
        };

        Self::with_clients(pool, config, model, speech)
    }

    /// Wire services to explicit clients
    pub fn with_clients(
        pool: DatabasePool,
        config: &AppConfig,
        model: Arc<dyn ChatModel>,
        speech: Arc<dyn SpeechService>,
    ) -> Self {
        let health = Arc::new(HealthService::new(pool.clone(), model.clone(), speech.clone()));
        Self {
            services: Services::new(pool, config, model),
            speech,
            health,
        }
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        state.services.accounts.clone()
    }
}
