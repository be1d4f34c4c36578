//! Speech-to-text (STT) via Azure Speech
//!
//! Browsers record `WebM`/Opus, but the Azure short-audio REST endpoint wants
//! 16 kHz mono PCM WAV, so uploads are transcoded with ffmpeg first.

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::AzureSpeechConfig;
use crate::error::ServiceError;

const TIMEOUT: Duration = Duration::from_secs(15);
const WAV_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";
const RECOGNITION_SUCCESS: &str = "Success";

/// Response from the Azure short-audio recognition API (simple format)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    #[serde(default)]
    recognition_status: String,
    #[serde(default)]
    display_text: String,
}

/// Transcribes recorded speech to text
#[derive(Debug)]
pub struct SpeechToText {
    client: Client,
    api_key: Option<SecretString>,
    url: String,
    language: String,
    ffmpeg: String,
}

impl SpeechToText {
    /// Create an STT client from configuration
    #[must_use]
    pub fn new(config: AzureSpeechConfig) -> Self {
        let url = config.recognition_url();
        Self {
            client: Client::new(),
            api_key: config.api_key,
            url,
            language: config.language,
            ffmpeg: config.ffmpeg,
        }
    }

    /// Whether a subscription key is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Transcribe a browser recording (`WebM`)
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if transcoding or recognition fails
    pub async fn transcribe(&self, recording: &[u8]) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ServiceError::NotConfigured("Azure Speech key not configured"))?;

        let wav = self.transcode(recording).await?;
        self.recognize(api_key, wav).await
    }

    /// Convert a recording to 16 kHz mono WAV
    ///
    /// Scratch files live in a temporary directory removed on return.
    async fn transcode(&self, recording: &[u8]) -> Result<Vec<u8>, ServiceError> {
        let conversion_failed = || ServiceError::Other("Audio conversion failed".to_string());

        let scratch = tempfile::tempdir().map_err(|e| {
            tracing::error!(error = %e, "failed to create scratch directory");
            conversion_failed()
        })?;
        let input = scratch.path().join("recording.webm");
        let output = scratch.path().join("recording.wav");

        tokio::fs::write(&input, recording).await.map_err(|e| {
            tracing::error!(error = %e, "failed to write recording");
            conversion_failed()
        })?;

        let result = tokio::process::Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-i")
            .arg(&input)
            .args(["-ar", "16000", "-ac", "1"])
            .arg(&output)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ffmpeg = %self.ffmpeg, "failed to run ffmpeg");
                conversion_failed()
            })?;

        if !result.status.success() {
            tracing::error!(
                status = %result.status,
                stderr = %String::from_utf8_lossy(&result.stderr),
                "ffmpeg conversion failed"
            );
            return Err(conversion_failed());
        }

        tokio::fs::read(&output).await.map_err(|e| {
            tracing::error!(error = %e, "failed to read converted audio");
            conversion_failed()
        })
    }

    /// Recognize speech in 16 kHz mono WAV audio
    async fn recognize(&self, api_key: &SecretString, wav: Vec<u8>) -> Result<String, ServiceError> {
        tracing::debug!(audio_bytes = wav.len(), "starting Azure recognition");

        let response = self
            .client
            .post(&self.url)
            .query(&[("language", self.language.as_str()), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", api_key.expose_secret())
            .header(header::CONTENT_TYPE, WAV_CONTENT_TYPE)
            .body(wav)
            .timeout(TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Azure STT request failed");
                ServiceError::Other(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Azure STT error");
            return Err(ServiceError::Upstream {
                status: status.as_u16(),
                message: format!("Azure STT error ({}): {body}", status.as_u16()),
            });
        }

        let result: RecognitionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse response");
            ServiceError::Other(e.to_string())
        })?;

        interpret(result)
    }
}

fn interpret(result: RecognitionResponse) -> Result<String, ServiceError> {
    let transcript = result.display_text.trim();

    tracing::info!(
        recognition_status = %result.recognition_status,
        transcript,
        "recognition complete"
    );

    if result.recognition_status != RECOGNITION_SUCCESS || transcript.is_empty() {
        return Err(ServiceError::Upstream {
            status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
            message: format!("Recognition failed: {}", result.recognition_status),
        });
    }

    Ok(transcript.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, text: &str) -> RecognitionResponse {
        serde_json::from_value(serde_json::json!({
            "RecognitionStatus": status,
            "DisplayText": text,
            "Offset": 0,
            "Duration": 1_200_000
        }))
        .unwrap()
    }

    #[test]
    fn successful_recognition_is_trimmed() {
        assert_eq!(
            interpret(response("Success", "  What's the weather?  ")).unwrap(),
            "What's the weather?"
        );
    }

    #[test]
    fn no_match_is_unprocessable() {
        let err = interpret(response("NoMatch", "")).unwrap_err();
        assert!(matches!(err, ServiceError::Upstream { status: 422, .. }));
        assert_eq!(err.to_string(), "Recognition failed: NoMatch");
    }

    #[test]
    fn empty_text_fails_even_on_success() {
        let err = interpret(response("Success", "   ")).unwrap_err();
        assert_eq!(err.to_string(), "Recognition failed: Success");
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_conversion_failure() {
        let stt = SpeechToText::new(AzureSpeechConfig {
            api_key: Some(SecretString::from("key".to_string())),
            ffmpeg: "/nonexistent/ffmpeg".to_string(),
            ..AzureSpeechConfig::default()
        });

        let err = stt.transcribe(b"not really webm").await.unwrap_err();
        assert_eq!(err.to_string(), "Audio conversion failed");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let stt = SpeechToText::new(AzureSpeechConfig::default());
        let err = stt.transcribe(b"audio").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotConfigured(_)));
    }
}
