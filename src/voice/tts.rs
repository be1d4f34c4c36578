//! Text-to-speech (TTS) via `ElevenLabs`
//!
//! Audio is streamed from the vendor's low-latency endpoint and handed back
//! chunk by chunk, so playback can start before synthesis finishes.
//!
//! The synthesis timeout bounds the wait for response headers and any stall
//! between chunks, never the total length of the stream.

use std::time::Duration;

use axum::body::Bytes;
use futures::Stream;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::catalog::{VoiceCatalog, VoiceListing};
use crate::config::ElevenLabsConfig;
use crate::error::{Error, ServiceError, TransportMessages};

const LIST_TIMEOUT: Duration = Duration::from_secs(10);

const ERRORS: TransportMessages = TransportMessages {
    timeout: Some("ElevenLabs timeout"),
    connect: Some("Unable to connect to ElevenLabs"),
    other: "TTS error",
};

/// `ElevenLabs` client for synthesis and the voice listing
#[derive(Debug)]
pub struct TextToSpeech {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    default_voice_id: String,
    model_id: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    /// Speaker boost adds latency
    use_speaker_boost: bool,
}

const STREAMING_SETTINGS: VoiceSettings = VoiceSettings {
    stability: 0.5,
    similarity_boost: 0.75,
    style: 0.0,
    use_speaker_boost: false,
};

impl TextToSpeech {
    /// Create a TTS client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: ElevenLabsConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create TTS client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url,
            default_voice_id: config.default_voice_id,
            model_id: config.model_id,
            timeout: config.timeout,
        })
    }

    /// Whether an API key is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Voice used when a request doesn't name one
    #[must_use]
    pub fn default_voice_id(&self) -> &str {
        &self.default_voice_id
    }

    /// Start synthesizing `text` and return the MP3 byte stream
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the key is missing, the vendor rejects the
    /// request, or the connection fails before audio starts
    pub async fn stream(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static, ServiceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("ElevenLabs API key not configured"))?;

        let voice_id = voice_id.unwrap_or(&self.default_voice_id);
        let url = format!(
            "{}/text-to-speech/{}/stream",
            self.base_url,
            urlencoding::encode(voice_id)
        );

        tracing::info!(chars = text.chars().count(), voice_id, "streaming TTS");

        let request = self
            .client
            .post(&url)
            .query(&[
                ("optimize_streaming_latency", "4"),
                ("output_format", "mp3_22050_32"),
            ])
            .header(header::ACCEPT, "audio/mpeg")
            .header("xi-api-key", api_key.expose_secret())
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
                voice_settings: STREAMING_SETTINGS,
            })
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                tracing::error!(timeout = ?self.timeout, "ElevenLabs did not start streaming");
                ERRORS.elapsed()
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "ElevenLabs request failed");
                ERRORS.classify(&e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "ElevenLabs TTS error");
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "ElevenLabs error ({}): {}",
                    status.as_u16(),
                    error_detail(&body)
                ),
            });
        }

        Ok(response.bytes_stream())
    }

    /// List voices, falling back to the built-in catalog on any failure
    pub async fn voice_catalog(&self) -> VoiceCatalog {
        match self.list_voices().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "voice listing unavailable, using built-in catalog");
                VoiceCatalog::builtin()
            }
        }
    }

    async fn list_voices(&self) -> Result<VoiceCatalog, ServiceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("ElevenLabs API key not configured"))?;

        let response = self
            .client
            .get(format!("{}/voices", self.base_url))
            .header("xi-api-key", api_key.expose_secret())
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ERRORS.classify(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message: format!("voice listing failed: {status}"),
            });
        }

        let listing: VoiceListing = response.json().await.map_err(|e| ERRORS.classify(&e))?;
        Ok(VoiceCatalog::from_listing(listing))
    }
}

/// Pull the human-readable reason out of an `ElevenLabs` error body
///
/// The API reports `{"detail": {"message": ...}}` or `{"detail": "..."}`;
/// anything else falls back to the raw body.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| body.to_string(), String::from),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => body.to_string(),
    }
}
