//! Voice processing module
//!
//! Speech-to-text for uploaded recordings, streamed text-to-speech and the
//! selectable voice catalog.

mod catalog;
mod stt;
mod tts;

pub use catalog::{VoiceCatalog, VoiceInfo};
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
