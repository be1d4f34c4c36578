//! Voice catalog grouped by gender

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A selectable TTS voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    pub name: String,
    pub display_name: String,
}

impl VoiceInfo {
    fn new(voice_id: &str, name: &str, display_name: &str) -> Self {
        Self {
            voice_id: voice_id.to_string(),
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Voices grouped the way the UI presents them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoiceCatalog {
    pub female: Vec<VoiceInfo>,
    pub male: Vec<VoiceInfo>,
    pub other: Vec<VoiceInfo>,
}

/// Voice entry from the `ElevenLabs` `/voices` listing
#[derive(Debug, Deserialize)]
pub(crate) struct ListedVoice {
    voice_id: String,
    name: String,
    #[serde(default)]
    labels: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoiceListing {
    #[serde(default)]
    voices: Vec<ListedVoice>,
}

impl VoiceCatalog {
    /// Built-in catalog served when the listing can't be fetched
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            female: vec![
                VoiceInfo::new("21m00Tcm4TlvDq8ikWAM", "Rachel", "Rachel (Calm)"),
                VoiceInfo::new("EXAVITQu4vr4xnSDxMaL", "Bella", "Bella (Soft)"),
                VoiceInfo::new("MF3mGyEYCl7XYWbV9V6O", "Elli", "Elli (Energetic)"),
                VoiceInfo::new("XrExE9yKIg1WjnnlVkGX", "Matilda", "Matilda (Warm)"),
            ],
            male: vec![
                VoiceInfo::new("TxGEqnHWrfWFTfGW9XjX", "Josh", "Josh (Professional)"),
                VoiceInfo::new("VR6AewLTigWG4xSOukaG", "Arnold", "Arnold (Deep)"),
                VoiceInfo::new("pNInz6obpgDQGcFmaJgB", "Adam", "Adam (Narrator)"),
                VoiceInfo::new("yoZ06aMxZJJ28mfd3POQ", "Sam", "Sam (Dynamic)"),
            ],
            other: Vec::new(),
        }
    }

    /// Group a vendor listing by its `gender` label
    pub(crate) fn from_listing(listing: VoiceListing) -> Self {
        let mut catalog = Self::default();

        for voice in listing.voices {
            let gender = voice
                .labels
                .get("gender")
                .and_then(serde_json::Value::as_str)
                .map(str::to_lowercase)
                .unwrap_or_default();

            let info = VoiceInfo {
                voice_id: voice.voice_id,
                display_name: voice.name.clone(),
                name: voice.name,
            };

            match gender.as_str() {
                "female" => catalog.female.push(info),
                "male" => catalog.male.push(info),
                _ => catalog.other.push(info),
            }
        }

        catalog
    }
}
