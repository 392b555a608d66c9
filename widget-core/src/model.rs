use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current-weather payload as returned by OpenWeather.
///
/// Stored as a whole; a newer snapshot replaces an older one, fields are never merged.
/// Temperatures are Kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    pub main: MainReadings,
    pub wind: Wind,
    #[serde(default)]
    pub weather: Vec<Condition>,
    /// Observation time, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<SysInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysInfo {
    #[serde(default)]
    pub country: Option<String>,
}

impl WeatherSnapshot {
    /// The primary condition, if the upstream sent any.
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    }

    pub fn country(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|s| s.country.as_deref())
    }
}

/// Build the icon image URL for an OpenWeather icon code.
pub fn icon_url(icon_base_url: &str, icon: &str) -> String {
    format!("{}/{}.png", icon_base_url.trim_end_matches('/'), icon)
}
