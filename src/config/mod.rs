//! Configuration management for Concierge gateway
//!
//! Values resolve env > TOML file > defaults. Environment variable names
//! follow the vendor conventions already used in `.env` files
//! (`OPENWEATHERMAP_API_KEY`, `KEYCLOAK_URL`, ...).

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use self::file::ConciergeConfigFile;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Concierge gateway configuration
#[derive(Debug, Default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Weather lookups
    pub weather: WeatherConfig,

    /// Wikipedia lookups
    pub wikipedia: WikipediaConfig,

    /// News lookups
    pub news: NewsConfig,

    /// Remote conversational backend
    pub chat: ChatBackendConfig,

    /// Text-to-speech and voice catalog
    pub elevenlabs: ElevenLabsConfig,

    /// Speech-to-text
    pub azure_speech: AzureSpeechConfig,
}

/// HTTP server configuration
#[derive(Debug)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

/// `OpenWeatherMap` configuration
#[derive(Debug)]
pub struct WeatherConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Wikipedia (`MediaWiki` action API) configuration
#[derive(Debug)]
pub struct WikipediaConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: "ConversationalAI/1.0".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// News API configuration
#[derive(Debug)]
pub struct NewsConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,

    /// Upper bound on the `pageSize` requested from the API
    pub page_size: u32,

    pub financial: FinancialNewsConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://newsapi.org/v2".to_string(),
            page_size: 10,
            financial: FinancialNewsConfig::default(),
        }
    }
}

/// Financial news filter
#[derive(Debug)]
pub struct FinancialNewsConfig {
    pub enabled: bool,

    /// Source names, sent as `<source>.com` domains
    pub sources: Vec<String>,
}

impl Default for FinancialNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: ["bloomberg", "financial-times", "the-wall-street-journal", "cnbc"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Remote conversational backend and its Keycloak realm
#[derive(Debug)]
pub struct ChatBackendConfig {
    /// Query endpoint
    pub url: String,
    pub user_id: String,
    /// Value of the `tenant-id` header
    pub tenant_id: String,
    pub keycloak_url: String,
    pub realm: String,
    pub client_id: String,
    pub username: String,
    pub password: Option<SecretString>,

    /// Verify TLS certificates (the dev backend uses a self-signed one)
    pub tls_verify: bool,
}

impl Default for ChatBackendConfig {
    fn default() -> Self {
        Self {
            url: "https://api-dev.revinci.ai/ai/opportunity/query".to_string(),
            user_id: String::new(),
            tenant_id: "tessla".to_string(),
            keycloak_url: "https://auth-dev.revinci.ai".to_string(),
            realm: "tessla".to_string(),
            client_id: "tessla".to_string(),
            username: String::new(),
            password: None,
            tls_verify: false,
        }
    }
}

/// `ElevenLabs` configuration
#[derive(Debug)]
pub struct ElevenLabsConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub default_voice_id: String,
    pub model_id: String,

    /// Bounds the wait for synthesis to start and any stall mid-stream
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.elevenlabs.io/v1".to_string(),
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: "eleven_turbo_v2_5".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Azure speech-to-text configuration
#[derive(Debug)]
pub struct AzureSpeechConfig {
    pub api_key: Option<SecretString>,
    pub region: String,

    /// Full recognition endpoint; derived from `region` when unset
    pub endpoint: Option<String>,

    pub language: String,

    /// ffmpeg binary used to transcode uploads to 16 kHz mono WAV
    pub ffmpeg: String,
}

impl Default for AzureSpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: "westus".to_string(),
            endpoint: None,
            language: "en-US".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

impl AzureSpeechConfig {
    /// Recognition endpoint for the configured region
    #[must_use]
    pub fn recognition_url(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.region
            )
        })
    }
}

impl Config {
    /// Load configuration from `.env`, the environment and the TOML file
    #[must_use]
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let fc = file::load_config_file();
        Self::resolve(fc, |name| std::env::var(name).ok())
    }

    /// Merge a parsed config file with an environment lookup
    ///
    /// Empty environment values count as unset.
    pub fn resolve(fc: ConciergeConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let secret = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::from(v.trim().to_string()))
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: env("CONCIERGE_HOST")
                .or(fc.server.host)
                .unwrap_or(server_defaults.host),
            port: env("CONCIERGE_PORT")
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(server_defaults.port),
            static_dir: env("CONCIERGE_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        let weather_defaults = WeatherConfig::default();
        let weather = WeatherConfig {
            api_key: secret(env("OPENWEATHERMAP_API_KEY").or(fc.weather.api_key)),
            base_url: fc.weather.base_url.unwrap_or(weather_defaults.base_url),
            timeout: fc
                .weather
                .timeout_secs
                .map_or(weather_defaults.timeout, Duration::from_secs),
        };

        let wiki_defaults = WikipediaConfig::default();
        let wikipedia = WikipediaConfig {
            base_url: fc.wikipedia.base_url.unwrap_or(wiki_defaults.base_url),
            user_agent: fc.wikipedia.user_agent.unwrap_or(wiki_defaults.user_agent),
            timeout: fc
                .wikipedia
                .timeout_secs
                .map_or(wiki_defaults.timeout, Duration::from_secs),
        };

        let news_defaults = NewsConfig::default();
        let news = NewsConfig {
            api_key: secret(env("NEWS_API_KEY").or(fc.news.api_key)),
            base_url: fc.news.base_url.unwrap_or(news_defaults.base_url),
            page_size: fc.news.page_size.unwrap_or(news_defaults.page_size),
            financial: FinancialNewsConfig {
                enabled: fc
                    .news
                    .financial
                    .enabled
                    .unwrap_or(news_defaults.financial.enabled),
                sources: fc
                    .news
                    .financial
                    .sources
                    .unwrap_or(news_defaults.financial.sources),
            },
        };

        let chat_defaults = ChatBackendConfig::default();
        let chat = ChatBackendConfig {
            url: env("REVINCI_API_URL")
                .or(fc.chat.url)
                .unwrap_or(chat_defaults.url),
            user_id: env("REVINCI_USER_ID")
                .or(fc.chat.user_id)
                .unwrap_or(chat_defaults.user_id),
            tenant_id: env("REVINCI_TENANT_ID")
                .or(fc.chat.tenant_id)
                .unwrap_or(chat_defaults.tenant_id),
            keycloak_url: env("KEYCLOAK_URL")
                .or(fc.chat.keycloak_url)
                .unwrap_or(chat_defaults.keycloak_url),
            realm: env("KEYCLOAK_REALM")
                .or(fc.chat.realm)
                .unwrap_or(chat_defaults.realm),
            client_id: env("KEYCLOAK_CLIENT_ID")
                .or(fc.chat.client_id)
                .unwrap_or(chat_defaults.client_id),
            username: env("REVINCI_AUTH_USERNAME")
                .or(fc.chat.username)
                .unwrap_or(chat_defaults.username),
            password: secret(env("REVINCI_AUTH_PASSWORD").or(fc.chat.password)),
            tls_verify: env("REVINCI_TLS_VERIFY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(fc.chat.tls_verify)
                .unwrap_or(chat_defaults.tls_verify),
        };

        let eleven_defaults = ElevenLabsConfig::default();
        let elevenlabs = ElevenLabsConfig {
            api_key: secret(env("ELEVENLABS_API_KEY").or(fc.elevenlabs.api_key)),
            base_url: fc.elevenlabs.base_url.unwrap_or(eleven_defaults.base_url),
            default_voice_id: fc
                .elevenlabs
                .default_voice_id
                .unwrap_or(eleven_defaults.default_voice_id),
            model_id: fc.elevenlabs.model_id.unwrap_or(eleven_defaults.model_id),
            timeout: fc
                .elevenlabs
                .timeout_secs
                .map_or(eleven_defaults.timeout, Duration::from_secs),
        };

        let azure_defaults = AzureSpeechConfig::default();
        let azure_speech = AzureSpeechConfig {
            api_key: secret(env("AZURE_SPEECH_KEY").or(fc.azure_speech.api_key)),
            region: env("AZURE_SPEECH_REGION")
                .or(fc.azure_speech.region)
                .unwrap_or(azure_defaults.region),
            endpoint: env("AZURE_SPEECH_ENDPOINT").or(fc.azure_speech.endpoint),
            language: fc.azure_speech.language.unwrap_or(azure_defaults.language),
            ffmpeg: env("FFMPEG_PATH")
                .or(fc.azure_speech.ffmpeg)
                .unwrap_or(azure_defaults.ffmpeg),
        };

        Self {
            server,
            weather,
            wikipedia,
            news,
            chat,
            elevenlabs,
            azure_speech,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_env_or_file() {
        let config = Config::resolve(ConciergeConfigFile::default(), lookup(&[]));

        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.weather.api_key.is_none());
        assert_eq!(config.news.page_size, 10);
        assert_eq!(config.news.financial.sources.len(), 4);
        assert_eq!(config.chat.tenant_id, "tessla");
        assert!(!config.chat.tls_verify);
        assert_eq!(config.elevenlabs.default_voice_id, DEFAULT_VOICE_ID);
        assert_eq!(config.elevenlabs.timeout, Duration::from_secs(30));
        assert_eq!(config.weather.timeout, Duration::from_secs(10));
        assert_eq!(
            config.azure_speech.recognition_url(),
            "https://westus.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
        );
    }

    #[test]
    fn env_overrides_file() {
        let fc = file::parse_config(
            r#"
            [server]
            port = 7000

            [weather]
            api_key = "from-file"
            "#,
        )
        .unwrap();

        let config = Config::resolve(
            fc,
            lookup(&[("CONCIERGE_PORT", "7100"), ("OPENWEATHERMAP_API_KEY", "from-env")]),
        );

        assert_eq!(config.server.port, 7100);
        assert_eq!(
            config.weather.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("from-env".to_string())
        );
    }

    #[test]
    fn vendor_timeouts_from_file() {
        let fc = file::parse_config("[wikipedia]\ntimeout_secs = 4\n\n[elevenlabs]\ntimeout_secs = 60")
            .unwrap();
        let config = Config::resolve(fc, lookup(&[]));

        assert_eq!(config.wikipedia.timeout, Duration::from_secs(4));
        assert_eq!(config.elevenlabs.timeout, Duration::from_secs(60));
        assert_eq!(config.weather.timeout, Duration::from_secs(10));
    }

    #[test]
    fn empty_env_values_are_unset() {
        let fc = file::parse_config("[news]\napi_key = \"file-key\"").unwrap();
        let config = Config::resolve(fc, lookup(&[("NEWS_API_KEY", "  ")]));

        assert_eq!(
            config.news.api_key.as_ref().map(|k| k.expose_secret().to_string()),
            Some("file-key".to_string())
        );
    }

    #[test]
    fn blank_secrets_are_none() {
        let fc = file::parse_config("[elevenlabs]\napi_key = \"\"").unwrap();
        let config = Config::resolve(fc, lookup(&[]));
        assert!(config.elevenlabs.api_key.is_none());
    }

    #[test]
    fn region_drives_stt_endpoint_unless_overridden() {
        let config = Config::resolve(
            ConciergeConfigFile::default(),
            lookup(&[("AZURE_SPEECH_REGION", "eastus")]),
        );
        assert!(
            config
                .azure_speech
                .recognition_url()
                .starts_with("https://eastus.stt.speech.microsoft.com/")
        );

        let config = Config::resolve(
            ConciergeConfigFile::default(),
            lookup(&[("AZURE_SPEECH_ENDPOINT", "http://127.0.0.1:9/stt")]),
        );
        assert_eq!(config.azure_speech.recognition_url(), "http://127.0.0.1:9/stt");
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let config = Config::resolve(
            ConciergeConfigFile::default(),
            lookup(&[("REVINCI_AUTH_PASSWORD", "hunter2")]),
        );
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
