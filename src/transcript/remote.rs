use std::path::Path;

use crate::foundation::error::TalkcutResult;
#[cfg(feature = "remote-transcribe")]
use crate::foundation::error::{DIAGNOSTIC_TAIL_CHARS, TalkcutError, diagnostic_tail};
use crate::transcript::model::Transcript;

/// Environment variable holding the transcription service key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Remote transcription settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TranscribeConfig {
    /// Transcription endpoint URL.
    pub endpoint: String,
    /// Recognizer model name.
    pub model: String,
    /// Spoken language (ISO 639-1).
    pub language: String,
    /// Request timeout in seconds.
    pub timeout_sec: u64,
    /// Longest sentence group in the clean transcript.
    pub merge_max_sec: f64,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            language: "es".to_string(),
            timeout_sec: 300,
            merge_max_sec: 20.0,
        }
    }
}

/// Produces a word-level [`Transcript`] from an audio file.
pub trait Transcriber {
    /// Transcribe `audio` with word and segment timestamps.
    fn transcribe(&self, audio: &Path) -> TalkcutResult<Transcript>;
}

/// Blocking HTTP client for a Whisper-compatible transcription endpoint.
#[cfg(feature = "remote-transcribe")]
pub struct RemoteTranscriber {
    client: reqwest::blocking::Client,
    config: TranscribeConfig,
    api_key: String,
}

#[cfg(feature = "remote-transcribe")]
impl RemoteTranscriber {
    /// Build a client with the configured timeout.
    pub fn new(config: TranscribeConfig, api_key: impl Into<String>) -> TalkcutResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| TalkcutError::transcription(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Build a client reading the key from [`API_KEY_ENV`].
    pub fn from_env(config: TranscribeConfig) -> TalkcutResult<Self> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TalkcutError::transcription(format!("{API_KEY_ENV} is not set")))?;
        Self::new(config, key.trim())
    }
}

#[cfg(feature = "remote-transcribe")]
impl Transcriber for RemoteTranscriber {
    #[tracing::instrument(skip(self), fields(model = %self.config.model))]
    fn transcribe(&self, audio: &Path) -> TalkcutResult<Transcript> {
        use reqwest::blocking::multipart::{Form, Part};

        let bytes = std::fs::read(audio)
            .map_err(|e| TalkcutError::transcription(format!("read '{}': {e}", audio.display())))?;
        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.ogg".to_string());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/ogg")
            .map_err(|e| TalkcutError::transcription(format!("build upload: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment");

        tracing::info!(endpoint = %self.config.endpoint, "uploading audio for transcription");
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| TalkcutError::transcription(format!("request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| TalkcutError::transcription(format!("read response: {e}")))?;
        if !status.is_success() {
            return Err(TalkcutError::transcription(format!(
                "HTTP {status}: {}",
                diagnostic_tail(&body, DIAGNOSTIC_TAIL_CHARS)
            )));
        }
        let transcript = Transcript::from_reader(body.as_bytes())?;
        tracing::info!(
            words = transcript.words.len(),
            segments = transcript.segments.len(),
            "transcription received"
        );
        Ok(transcript)
    }
}
