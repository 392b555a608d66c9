use crate::{Config, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Every way a lookup can fail. The widget collapses all of them into one
/// user-facing message; the detail here is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to weather service failed: {0}")]
    Transport(reqwest::Error),

    #[error("weather service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode weather response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        FetchError::Transport(err.without_url())
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current weather for a city name, exactly as typed.
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(api_key, config.base_url.clone(), config.timeout())?;
    Ok(Arc::new(provider))
}
