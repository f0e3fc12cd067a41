use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::text::{build_ssml, detect_audio_format, preprocess_text};
use super::SpeechService;
use crate::config::SpeechConfig;

const OUTPUT_FORMAT: &str = "audio-16khz-32kbitrate-mono-mp3";

/// Azure Speech over its REST endpoints
#[derive(Debug, Clone)]
pub struct AzureSpeechClient {
    api_key: String,
    region: String,
    voice: String,
    language: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: String,
    #[serde(default)]
    display_text: Option<String>,
}

impl AzureSpeechClient {
    /// Build a client when a key is configured
    pub fn from_config(config: &SpeechConfig) -> Option<Self> {
        let api_key = config.api_key.as_ref()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Some(Self {
            api_key: api_key.clone(),
            region: config.region.clone(),
            voice: config.voice.clone(),
            language: config.language.clone(),
            client,
        })
    }

    fn synthesis_url(&self) -> String {
        format!("https://{}.tts.speech.microsoft.com/cognitiveservices/v1", self.region)
    }

    fn recognition_url(&self) -> String {
        format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={}&format=simple",
            self.region, self.language
        )
    }
}

#[async_trait]
impl SpeechService for AzureSpeechClient {
    async fn synthesize(&self, text: &str) -> Option<String> {
        let text = preprocess_text(text, &self.language)?;
        let ssml = build_ssml(&text, &self.voice, &self.language);
        info!("Synthesizing {} characters with {}", text.chars().count(), self.voice);

        let response = self
            .client
            .post(self.synthesis_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "healthfood-api")
            .body(ssml)
            .send()
            .await
            .map_err(|e| error!("Speech synthesis request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Speech synthesis error: {} - {}", status, error_text);
            return None;
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| error!("Failed to read synthesized audio: {}", e))
            .ok()?;

        if audio.is_empty() {
            warn!("Speech synthesis returned no audio");
            return None;
        }

        Some(format!("data:audio/mp3;base64,{}", general_purpose::STANDARD.encode(&audio)))
    }

    async fn recognize(&self, audio: Vec<u8>) -> Option<String> {
        if audio.is_empty() {
            return None;
        }

        let format = detect_audio_format(&audio);
        info!("Recognizing {} bytes of {:?} audio", audio.len(), format);

        let response = self
            .client
            .post(self.recognition_url())
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", format.content_type())
            .header("Accept", "application/json")
            .body(audio)
            .send()
            .await
            .map_err(|e| error!("Speech recognition request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Speech recognition error: {} - {}", status, error_text);
            return None;
        }

        let result: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| error!("Failed to parse recognition response: {}", e))
            .ok()?;

        match (result.recognition_status.as_str(), result.display_text) {
            ("Success", Some(text)) if !text.trim().is_empty() => Some(text),
            (status, _) => {
                warn!("No speech recognized (status {})", status);
                None
            }
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn voice(&self) -> String {
        self.voice.clone()
    }

    fn voices(&self) -> Vec<String> {
        let mut voices = match self.language.as_str() {
            "vi-VN" => vec!["vi-VN-HoaiMyNeural".to_string(), "vi-VN-NamMinhNeural".to_string()],
            _ => Vec::new(),
        };
        if !voices.contains(&self.voice) {
            voices.insert(0, self.voice.clone());
        }
        voices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AzureSpeechClient {
        AzureSpeechClient::from_config(&SpeechConfig {
            api_key: Some("key".to_string()),
            ..SpeechConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn needs_a_key() {
        assert!(AzureSpeechClient::from_config(&SpeechConfig::default()).is_none());
    }

    #[test]
    fn endpoints_use_region_and_language() {
        let client = client();
        assert_eq!(
            client.synthesis_url(),
            "https://southeastasia.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert!(client.recognition_url().ends_with("?language=vi-VN&format=simple"));
    }

    #[test]
    fn vietnamese_voices_are_listed() {
        assert_eq!(client().voices(), vec!["vi-VN-HoaiMyNeural", "vi-VN-NamMinhNeural"]);
    }

    #[test]
    fn recognition_payload_parses() {
        let parsed: RecognitionResponse =
            serde_json::from_str(r#"{"RecognitionStatus":"Success","DisplayText":"Xin chào.","Offset":0}"#).unwrap();
        assert_eq!(parsed.recognition_status, "Success");
        assert_eq!(parsed.display_text.as_deref(), Some("Xin chào."));
    }

    #[tokio::test]
    async fn blank_input_short_circuits() {
        let client = client();
        assert_eq!(client.synthesize("   ").await, None);
        assert_eq!(client.recognize(Vec::new()).await, None);
    }
}
