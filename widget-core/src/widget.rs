//! The weather widget: input debounce, fetch and state.
//!
//! Every edit to the city restarts a single debounce window. When the window
//! expires with a non-empty city, one lookup is spawned. Lookups already in
//! flight are never cancelled.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, DEFAULT_DEBOUNCE_MS, DEFAULT_ICON_BASE_URL, StaleResponsePolicy},
    model::WeatherSnapshot,
    provider::WeatherProvider,
    units::TemperatureUnit,
    view::View,
};

/// The only failure text a user ever sees.
pub const FETCH_ERROR_MESSAGE: &str = "Could not fetch weather data. Please try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetState {
    /// Exactly as typed; empty means no query yet.
    pub city: String,
    pub snapshot: Option<WeatherSnapshot>,
    pub unit: TemperatureUnit,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub debounce: Duration,
    pub icon_base_url: String,
    pub unit: TemperatureUnit,
    pub stale_responses: StaleResponsePolicy,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            icon_base_url: DEFAULT_ICON_BASE_URL.to_string(),
            unit: TemperatureUnit::default(),
            stale_responses: StaleResponsePolicy::default(),
        }
    }
}

impl From<&Config> for WidgetOptions {
    fn from(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            icon_base_url: config.icon_base_url.clone(),
            unit: config.unit,
            stale_responses: config.stale_responses,
        }
    }
}

/// One widget instance. Must be used from within a tokio runtime.
///
/// Dropping the widget cancels a pending debounce window, so nothing is
/// fetched after teardown.
#[derive(Debug)]
pub struct WeatherWidget {
    state: Arc<watch::Sender<WidgetState>>,
    provider: Arc<dyn WeatherProvider>,
    options: WidgetOptions,
    issued: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl WeatherWidget {
    pub fn new(provider: Arc<dyn WeatherProvider>, options: WidgetOptions) -> Self {
        let initial = WidgetState { unit: options.unit, ..Default::default() };
        let (state, _) = watch::channel(initial);

        Self {
            state: Arc::new(state),
            provider,
            options,
            issued: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Record a new city value and restart the debounce window.
    pub fn set_city(&mut self, city: impl Into<String>) {
        let city = city.into();
        self.state.send_modify(|s| s.city = city);

        self.cancel_pending();

        let fetch = FetchTask {
            state: Arc::clone(&self.state),
            provider: Arc::clone(&self.provider),
            issued: Arc::clone(&self.issued),
            policy: self.options.stale_responses,
        };
        let delay = self.options.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let city = fetch.state.borrow().city.clone();
            if city.is_empty() {
                debug!("debounce expired with empty city, nothing to fetch");
                return;
            }

            // Detached so that a later edit aborting this timer leaves the lookup alone.
            tokio::spawn(fetch.run(city));
        }));

        debug!(delay_ms = delay.as_millis() as u64, "debounce window scheduled");
    }

    /// Flip between Celsius and Fahrenheit. No network effect.
    pub fn toggle_unit(&self) {
        self.state.send_modify(|s| s.unit = s.unit.toggled());
    }

    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> View {
        View::from_state(&self.state.borrow(), &self.options.icon_base_url)
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state.subscribe()
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    /// Cancel a pending debounce window. In-flight lookups still complete.
    pub fn shutdown(&mut self) {
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for WeatherWidget {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

struct FetchTask {
    state: Arc<watch::Sender<WidgetState>>,
    provider: Arc<dyn WeatherProvider>,
    issued: Arc<AtomicU64>,
    policy: StaleResponsePolicy,
}

impl FetchTask {
    async fn run(self, city: String) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        debug!(%city, seq, "fetching current weather");

        let result = self.provider.current_weather(&city).await;

        let superseded = self.issued.load(Ordering::SeqCst) != seq;
        if superseded && self.policy == StaleResponsePolicy::Discard {
            debug!(%city, seq, "discarding response to superseded request");
            return;
        }

        match &result {
            Ok(snapshot) => info!(%city, name = %snapshot.name, "weather lookup succeeded"),
            Err(err) => warn!(%city, error = ?err, "weather lookup failed"),
        }

        self.state.send_modify(move |s| {
            match result {
                Ok(snapshot) => s.snapshot = Some(snapshot),
                Err(_) => s.error = Some(FETCH_ERROR_MESSAGE.to_string()),
            }
            s.loading = false;
        });
    }
}
