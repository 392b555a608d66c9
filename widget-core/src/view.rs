//! Render surface.
//!
//! A [`View`] is rebuilt from the widget state on every render. Its parts are
//! additive: the loading line, the error line and the weather panel can all
//! show at once (e.g. a stale panel under an error while a retry is loading).

use chrono::{DateTime, Utc};
use std::fmt;

use crate::{
    model::icon_url,
    units::{TemperatureUnit, format_temperature},
    widget::WidgetState,
};

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub loading: bool,
    pub error: Option<String>,
    pub panel: Option<Panel>,
}

/// Weather summary, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub name: String,
    pub country: Option<String>,
    pub unit: TemperatureUnit,
    pub current: String,
    pub min: String,
    pub max: String,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl View {
    pub fn from_state(state: &WidgetState, icon_base_url: &str) -> Self {
        let panel = state.snapshot.as_ref().map(|snap| {
            let unit = state.unit;
            let condition = snap.condition();

            Panel {
                name: snap.name.clone(),
                country: snap.country().map(str::to_owned),
                unit,
                current: format_temperature(snap.main.temp, unit),
                min: format_temperature(snap.main.temp_min, unit),
                max: format_temperature(snap.main.temp_max, unit),
                humidity: format!("{}%", snap.main.humidity),
                wind_speed: format!("{} m/s", snap.wind.speed),
                wind_direction: format!("{}°", snap.wind.deg),
                description: condition.map(|c| c.description.clone()),
                icon_url: condition.map(|c| icon_url(icon_base_url, &c.icon)),
                observed_at: snap.observed_at(),
            }
        });

        Self {
            loading: state.loading,
            error: state.error.clone().filter(|e| !e.is_empty()),
            panel,
        }
    }

    /// Nothing to show beyond the input and the unit toggle.
    pub fn is_idle(&self) -> bool {
        !self.loading && self.error.is_none() && self.panel.is_none()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loading {
            writeln!(f, "Loading...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "{error}")?;
        }
        if let Some(panel) = &self.panel {
            write!(f, "{panel}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => writeln!(f, "{}, {}", self.name, country)?,
            None => writeln!(f, "{}", self.name)?,
        }
        writeln!(f, "Current Temperature: {}", self.current)?;
        writeln!(f, "Min Temperature: {}", self.min)?;
        writeln!(f, "Max Temperature: {}", self.max)?;
        writeln!(f, "Humidity: {}", self.humidity)?;
        writeln!(f, "Wind Speed: {}", self.wind_speed)?;
        writeln!(f, "Wind Direction: {}", self.wind_direction)?;
        if let Some(description) = &self.description {
            writeln!(f, "Description: {description}")?;
        }
        if let Some(url) = &self.icon_url {
            writeln!(f, "Icon: {url}")?;
        }
        if let Some(at) = self.observed_at {
            writeln!(f, "Observed: {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, MainReadings, WeatherSnapshot, Wind};

    const ICONS: &str = "https://openweathermap.org/img/w";

    fn london() -> WeatherSnapshot {
        WeatherSnapshot {
            name: "London".into(),
            main: MainReadings { temp: 283.15, temp_min: 281.0, temp_max: 285.0, humidity: 60.0 },
            wind: Wind { speed: 3.0, deg: 180.0 },
            weather: vec![Condition { description: "clear sky".into(), icon: "01d".into() }],
            dt: None,
            sys: None,
        }
    }

    #[test]
    fn empty_state_is_idle() {
        let view = View::from_state(&WidgetState::default(), ICONS);

        assert!(view.is_idle());
        assert_eq!(view.to_string(), "");
    }

    #[test]
    fn populated_panel_in_celsius_and_fahrenheit() {
        let mut state = WidgetState { snapshot: Some(london()), ..Default::default() };

        let view = View::from_state(&state, ICONS);
        let panel = view.panel.as_ref().expect("panel");
        assert_eq!(panel.current, "10.00 °C");
        assert_eq!(panel.humidity, "60%");
        assert_eq!(panel.wind_speed, "3 m/s");
        assert_eq!(panel.wind_direction, "180°");
        assert_eq!(panel.icon_url.as_deref(), Some("https://openweathermap.org/img/w/01d.png"));

        state.unit = state.unit.toggled();
        let view = View::from_state(&state, ICONS);
        assert_eq!(view.panel.expect("panel").current, "50.00 °F");
    }

    #[test]
    fn states_paint_additively() {
        let state = WidgetState {
            snapshot: Some(london()),
            loading: true,
            error: Some("Could not fetch weather data. Please try again.".into()),
            ..Default::default()
        };

        let text = View::from_state(&state, ICONS).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Loading...");
        assert_eq!(lines[1], "Could not fetch weather data. Please try again.");
        assert_eq!(lines[2], "London");
        assert!(text.contains("Current Temperature: 10.00 °C"));
        assert!(text.contains("Min Temperature: 7.85 °C"));
        assert!(text.contains("Max Temperature: 11.85 °C"));
        assert!(text.contains("Description: clear sky"));
    }

    #[test]
    fn empty_condition_list_omits_description_and_icon() {
        let mut snap = london();
        snap.weather.clear();
        let state = WidgetState { snapshot: Some(snap), ..Default::default() };

        let text = View::from_state(&state, ICONS).to_string();
        assert!(!text.contains("Description:"));
        assert!(!text.contains("Icon:"));
    }
}
