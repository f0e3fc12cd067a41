use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{AiError, ChatMessage, ChatModel, CompletionRequest, ToolDefinition};
use crate::config::AiConfig;

/// Azure OpenAI chat completions over REST
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl AzureOpenAiClient {
    /// Build a client when endpoint and key are both configured
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let endpoint = config.endpoint.as_ref()?;
        let api_key = config.api_key.as_ref()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Some(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
            api_version: config.api_version.clone(),
            deployment: config.deployment.clone(),
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, AiError> {
        let body = ChatCompletionBody {
            messages: &request.messages,
            temperature: request.temperature,
            tools: &request.tools,
            tool_choice: (!request.tools.is_empty()).then_some("auto"),
            response_format: request.json_mode.then(|| json!({ "type": "json_object" })),
        };

        debug!(
            "Chat completion with {} messages and {} tools",
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Azure OpenAI request failed: {}", e);
                AiError::Request(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Azure OpenAI error: {} - {}", status, error_text);
            return Err(AiError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Azure OpenAI response: {}", e);
            AiError::InvalidResponse(e.to_string())
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AiError::InvalidResponse("No choices in response".to_string()))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Stand-in used when no credentials are configured
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredChatModel;

#[async_trait]
impl ChatModel for UnconfiguredChatModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<ChatMessage, AiError> {
        Err(AiError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        false
    }
}
