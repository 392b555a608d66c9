//! Core library for the `weather-widget` tool.
//!
//! This crate defines:
//! - Configuration & API-key handling
//! - The OpenWeather provider and the provider abstraction
//! - The debounced lookup widget and its state
//! - Unit conversion and the rendered view
//!
//! It is used by `weather-widget-cli`, but any front end that can feed it
//! input changes and redraw on state changes can embed it.

pub mod config;
pub mod model;
pub mod provider;
pub mod units;
pub mod view;
pub mod widget;

pub use config::{Config, StaleResponsePolicy};
pub use model::WeatherSnapshot;
pub use provider::{FetchError, WeatherProvider, provider_from_config};
pub use units::TemperatureUnit;
pub use view::{Panel, View};
pub use widget::{FETCH_ERROR_MESSAGE, WeatherWidget, WidgetOptions, WidgetState};
