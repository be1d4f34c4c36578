//! Intent detection and prompt context
//!
//! Lightweight helpers for clients that enrich a chat message with
//! real-time data before sending it to a model: detect what the message
//! asks about, then format the lookup result as a context block.

mod detect;
mod format;

pub use detect::{NewsIntent, WeatherIntent, WikipediaIntent, detect_news, detect_weather, detect_wikipedia};
pub use format::{NewsDigest, format_news, format_weather, format_wikipedia};

/// System prompt for a model that receives the context blocks
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant with access to real-time weather information, Wikipedia knowledge, and news articles.

When users ask about weather, you can provide current conditions, forecasts, and weather-related advice.

When users ask about factual information, you can search Wikipedia for detailed information about people, places, events, and concepts.

When users ask about news, you can provide latest headlines, breaking news, and news about specific topics.

Always provide natural, conversational responses based on the data available.";
