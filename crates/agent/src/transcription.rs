use async_trait::async_trait;

use crate::provider::ProviderError;

/// Result of transcribing one audio clip.
#[derive(Clone, Debug)]
pub struct Transcription {
    pub text: String,
    pub confidence: Option<f32>,
    pub language: Option<String>,
    pub duration_ms: Option<u64>,
}

/// Pluggable speech-to-text capability. Like reasoning providers, concrete
/// vendors live behind this contract and are chosen at composition time;
/// voice turns transcribe first and then run the ordinary text pipeline.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Transcription, ProviderError>;
}

/// Default when no vendor is wired in: voice turns fail fast while text
/// turns are unaffected.
pub struct DisabledTranscription;

#[async_trait]
impl TranscriptionProvider for DisabledTranscription {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<Transcription, ProviderError> {
        Err(ProviderError::NotConfigured("no transcription provider configured".to_string()))
    }
}
