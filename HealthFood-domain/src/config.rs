//! Runtime configuration read from environment variables.
//!
//! Every setting has a default so the server starts with an empty
//! environment; AI and speech features switch off when their keys are absent.

use std::env;

use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

fn var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

/// Token signing settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_minutes: 1440,
            issuer: "healthfood-api".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET is not set, using the built-in development secret");
            defaults.jwt_secret.clone()
        });

        Self {
            jwt_secret,
            token_ttl_minutes: var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(defaults.token_ttl_minutes),
            issuer: var_or("JWT_ISSUER", &defaults.issuer),
        }
    }
}

/// Azure OpenAI chat completion settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_version: String,
    pub deployment: String,
    /// Language the assistant answers in
    pub reply_language: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: "2024-06-01".to_string(),
            deployment: "gpt-4o-mini".to_string(),
            reply_language: "Vietnamese".to_string(),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: var("AZURE_OPENAI_ENDPOINT"),
            api_key: var("AZURE_OPENAI_API_KEY"),
            api_version: var_or("AZURE_OPENAI_API_VERSION", &defaults.api_version),
            deployment: var_or("AZURE_OPENAI_DEPLOYMENT", &defaults.deployment),
            reply_language: var_or("ASSISTANT_LANGUAGE", &defaults.reply_language),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }
}

/// Azure Speech settings
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub region: String,
    pub voice: String,
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: "southeastasia".to_string(),
            voice: "vi-VN-HoaiMyNeural".to_string(),
            language: "vi-VN".to_string(),
        }
    }
}

impl SpeechConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: var("AZURE_SPEECH_KEY"),
            region: var_or("AZURE_SPEECH_REGION", &defaults.region),
            voice: var_or("AZURE_SPEECH_VOICE", &defaults.voice),
            language: var_or("AZURE_SPEECH_LANGUAGE", &defaults.language),
        }
    }
}

/// Bootstrap administrator account
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
            full_name: "System Admin".to_string(),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            email: var_or("ADMIN_EMAIL", &defaults.email),
            password: var_or("ADMIN_PASSWORD", &defaults.password),
            full_name: var_or("ADMIN_FULL_NAME", &defaults.full_name),
        }
    }
}

/// All domain settings
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub speech: SpeechConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            auth: AuthConfig::from_env(),
            ai: AiConfig::from_env(),
            speech: SpeechConfig::from_env(),
            admin: AdminConfig::from_env(),
        }
    }
}
