//! Text-to-speech and speech-to-text through a hosted speech service.

use async_trait::async_trait;

mod azure;
pub mod text;

pub use azure::AzureSpeechClient;

/// Speech synthesis and recognition
///
/// Failures are logged by the implementation and reported as `None`.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Synthesize text into a `data:audio/mp3;base64,...` URL
    async fn synthesize(&self, text: &str) -> Option<String>;

    /// Recognize speech in an uploaded audio clip
    async fn recognize(&self, audio: Vec<u8>) -> Option<String>;

    fn is_available(&self) -> bool;

    /// Voice used for synthesis
    fn voice(&self) -> String;

    /// Voices the client can use for its language
    fn voices(&self) -> Vec<String>;
}

/// Speech stand-in when no key is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledSpeech;

#[async_trait]
impl SpeechService for DisabledSpeech {
    async fn synthesize(&self, _text: &str) -> Option<String> {
        None
    }

    async fn recognize(&self, _audio: Vec<u8>) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }

    fn voice(&self) -> String {
        String::new()
    }

    fn voices(&self) -> Vec<String> {
        Vec::new()
    }
}
