//! Concierge Gateway - chat and voice gateway for assistant front ends
//!
//! This library provides the HTTP backend behind a conversational web UI:
//! - Chat relayed to a remote conversational API (Keycloak-authenticated)
//! - Real-time lookups: weather, Wikipedia, news
//! - Voice: speech-to-text and streamed text-to-speech
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Web UI                           │
//! │     chat  │  microphone  │  speaker  │  widgets      │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                Concierge Gateway                     │
//! │   API  │  Sessions  │  Token cache  │  Transcoding   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Vendor APIs                          │
//! │ Chat │ OpenWeatherMap │ Wikipedia │ News │ Azure │ EL │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod integrations;
pub mod intent;
pub mod sessions;
pub mod voice;

pub use api::{ApiServer, ApiState};
pub use config::Config;
pub use error::{Error, Result, ServiceError};
pub use integrations::{NewsClient, RevinciClient, TokenCache, WeatherClient, WikipediaClient};
pub use sessions::SessionStore;
pub use voice::{SpeechToText, TextToSpeech, VoiceCatalog, VoiceInfo};
