//! Clients for the third-party services the gateway fronts

pub mod keycloak;
pub mod news;
pub mod revinci;
pub mod weather;
pub mod wikipedia;

pub use keycloak::TokenCache;
pub use news::{Article, FinancialNewsPage, NewsClient, NewsPage, NewsQuery};
pub use revinci::{ChatReply, RevinciClient};
pub use weather::{CurrentWeather, Forecast, ForecastDay, WeatherClient};
pub use wikipedia::{WikiSummary, WikipediaClient};
