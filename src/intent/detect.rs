//! Keyword-based intent detection
//!
//! Matching is plain case-insensitive substring search over fixed keyword
//! lists; extraction pulls the subject that follows the trigger.

const WEATHER_KEYWORDS: &[&str] = &[
    "weather", "temperature", "forecast", "rain", "raining", "rainy", "sunny", "cloudy",
    "humidity", "humid", "wind", "windy", "climate", "hot", "cold", "warm", "cool", "snow",
    "snowing", "storm", "stormy", "celsius", "fahrenheit", "degrees", "umbrella", "jacket",
];

/// Prepositions that introduce a place name
const LOCATION_PREPOSITIONS: &[&str] = &["in", "at", "for", "of"];

/// Words that end a place name
const CITY_STOP_WORDS: &[&str] = &["the", "weather", "forecast", "today", "tomorrow", "like"];

/// Longest place name taken after a preposition, in words
const MAX_CITY_WORDS: usize = 3;

const WIKIPEDIA_TRIGGERS: &[&str] = &[
    "who is", "who was", "who are", "what is", "what was", "what are", "tell me about",
    "information about", "explain", "define", "wikipedia", "wiki", "search for", "look up",
    "history of", "biography of", "facts about",
];

const NEWS_KEYWORDS: &[&str] = &[
    "news", "headline", "headlines", "latest news", "breaking news", "current events",
    "today news", "recent news", "news about", "whats happening", "what's happening",
    "tell me about news", "any news", "top news", "trending news",
];

const FINANCIAL_NEWS_KEYWORDS: &[&str] = &[
    "financial news", "business news", "market news", "stock news", "economy news",
    "finance news", "trading news", "wall street",
];

/// Filler removed from a news topic
const NEWS_FILLER_WORDS: &[&str] = &["about", "on", "regarding"];

/// A message asking about the weather
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherIntent {
    /// Place named in the message, in its original casing
    pub city: Option<String>,
}

/// A message asking for encyclopedic information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikipediaIntent {
    /// Lowercased subject following the trigger phrase
    pub query: Option<String>,
}

/// A message asking for news
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsIntent {
    pub is_financial: bool,
    /// Lowercased topic following the keyword
    pub query: Option<String>,
}

/// Detect a weather question and the city it mentions
#[must_use]
pub fn detect_weather(message: &str) -> Option<WeatherIntent> {
    let lower = message.to_lowercase();
    if !WEATHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return None;
    }

    let words: Vec<&str> = message.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        if !LOCATION_PREPOSITIONS.contains(&word.to_lowercase().as_str()) {
            continue;
        }

        let city: Vec<&str> = words
            .iter()
            .skip(i + 1)
            .take(MAX_CITY_WORDS)
            .map(|w| w.trim_end_matches(['?', ',', '!', '.']))
            .take_while(|w| !CITY_STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .collect();

        if !city.is_empty() {
            return Some(WeatherIntent {
                city: Some(city.join(" ")),
            });
        }
    }

    Some(WeatherIntent { city: None })
}

/// Detect a factual question and its subject
#[must_use]
pub fn detect_wikipedia(message: &str) -> Option<WikipediaIntent> {
    let lower = message.to_lowercase();
    if !WIKIPEDIA_TRIGGERS.iter().any(|t| lower.contains(t)) {
        return None;
    }

    let query = WIKIPEDIA_TRIGGERS.iter().find_map(|trigger| {
        let (_, rest) = lower.split_once(trigger)?;
        let subject = rest.trim().trim_end_matches(['?', '.', ',', '!']);
        (!subject.is_empty()).then(|| subject.to_string())
    });

    Some(WikipediaIntent { query })
}

/// Detect a news request, whether it is financial, and its topic
#[must_use]
pub fn detect_news(message: &str) -> Option<NewsIntent> {
    let lower = message.to_lowercase();
    let is_news = NEWS_KEYWORDS.iter().any(|k| lower.contains(k));
    let is_financial = FINANCIAL_NEWS_KEYWORDS.iter().any(|k| lower.contains(k));

    if !is_news && !is_financial {
        return None;
    }

    let query = NEWS_KEYWORDS
        .iter()
        .chain(FINANCIAL_NEWS_KEYWORDS)
        .find_map(|keyword| {
            let (_, rest) = lower.split_once(keyword)?;
            let topic = news_topic(rest);
            (!topic.is_empty()).then_some(topic)
        });

    Some(NewsIntent {
        is_financial,
        query,
    })
}

/// Strip punctuation and filler ("about", "on", "regarding", "related to") from a topic
fn news_topic(rest: &str) -> String {
    let cleaned: String = rest.chars().filter(|c| !matches!(c, '?' | '.' | '!')).collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut topic = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if words[i] == "related" && words.get(i + 1) == Some(&"to") {
            i += 2;
            continue;
        }
        if !NEWS_FILLER_WORDS.contains(&words[i]) {
            topic.push(words[i]);
        }
        i += 1;
    }

    topic.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_city_after_preposition() {
        assert_eq!(
            detect_weather("What's the weather in New York today?"),
            Some(WeatherIntent {
                city: Some("New York".to_string())
            })
        );
    }

    #[test]
    fn weather_city_strips_punctuation_and_caps_length() {
        let intent = detect_weather("Is it raining in Rio de Janeiro Brazil?").unwrap();
        assert_eq!(intent.city.as_deref(), Some("Rio de Janeiro"));

        let intent = detect_weather("Do I need an umbrella in Paris?").unwrap();
        assert_eq!(intent.city.as_deref(), Some("Paris"));
    }

    #[test]
    fn weather_without_city() {
        assert_eq!(
            detect_weather("how hot is it"),
            Some(WeatherIntent { city: None })
        );
        // preposition followed only by stop words keeps looking
        assert_eq!(
            detect_weather("forecast for the weekend").unwrap().city,
            None
        );
    }

    #[test]
    fn not_weather() {
        assert!(detect_weather("book a meeting with Sam").is_none());
    }

    #[test]
    fn wikipedia_subject_after_trigger() {
        assert_eq!(
            detect_wikipedia("Who is Ada Lovelace?"),
            Some(WikipediaIntent {
                query: Some("ada lovelace".to_string())
            })
        );
        assert_eq!(
            detect_wikipedia("tell me about the Roman Empire.")
                .unwrap()
                .query
                .as_deref(),
            Some("the roman empire")
        );
    }

    #[test]
    fn wikipedia_trigger_without_subject() {
        assert_eq!(
            detect_wikipedia("Can you look up?"),
            Some(WikipediaIntent { query: None })
        );
        assert!(detect_wikipedia("play some music").is_none());
    }

    #[test]
    fn news_topic_drops_filler() {
        let intent = detect_news("Any news about electric cars?").unwrap();
        assert!(!intent.is_financial);
        assert_eq!(intent.query.as_deref(), Some("electric cars"));

        let intent = detect_news("latest news related to London").unwrap();
        assert_eq!(intent.query.as_deref(), Some("london"));
    }

    #[test]
    fn financial_news_is_flagged() {
        let intent = detect_news("What's going on in wall street").unwrap();
        assert!(intent.is_financial);
        assert_eq!(intent.query, None);

        let intent = detect_news("business news on tesla").unwrap();
        assert!(intent.is_financial);
        assert_eq!(intent.query.as_deref(), Some("tesla"));
    }

    #[test]
    fn not_news() {
        assert!(detect_news("what time is it").is_none());
    }
}
