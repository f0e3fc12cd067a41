// Testing utilities for crates built on the domain layer
// This module is only available when the "mock" feature is enabled

pub use health_food_data::repository::testing::{insert_profile, insert_user, test_pool};

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::{AiError, ChatMessage, ChatModel, CompletionRequest};
use crate::speech::SpeechService;

/// Chat model answering from a queue of canned replies
///
/// Once the queue is drained every call fails with `NotConfigured`, which
/// exercises the fallback paths. Requests are recorded for assertions.
#[derive(Debug, Default)]
pub struct ScriptedChatModel {
    replies: Mutex<VecDeque<ChatMessage>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain assistant reply
    pub fn with_reply(self, text: &str) -> Self {
        self.with_message(ChatMessage::assistant(text))
    }

    /// Queue any assistant message, such as one carrying tool calls
    pub fn with_message(self, message: ChatMessage) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(message);
        }
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, AiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .ok_or(AiError::NotConfigured)
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Speech service returning fixed results
#[derive(Debug, Clone)]
pub struct StubSpeech {
    pub audio_url: Option<String>,
    pub transcript: Option<String>,
}

impl Default for StubSpeech {
    fn default() -> Self {
        Self {
            audio_url: Some("data:audio/mp3;base64,AAAA".to_string()),
            transcript: Some("xin chào".to_string()),
        }
    }
}

#[async_trait]
impl SpeechService for StubSpeech {
    async fn synthesize(&self, _text: &str) -> Option<String> {
        self.audio_url.clone()
    }

    async fn recognize(&self, _audio: Vec<u8>) -> Option<String> {
        self.transcript.clone()
    }

    fn is_available(&self) -> bool {
        true
    }

    fn voice(&self) -> String {
        "vi-VN-HoaiMyNeural".to_string()
    }

    fn voices(&self) -> Vec<String> {
        vec!["vi-VN-HoaiMyNeural".to_string(), "vi-VN-NamMinhNeural".to_string()]
    }
}
