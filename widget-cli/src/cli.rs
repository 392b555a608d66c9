use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use tokio::io::{AsyncBufReadExt, BufReader};
use weather_widget_core::{
    Config, FETCH_ERROR_MESSAGE, TemperatureUnit, WeatherWidget, WidgetOptions,
    provider_from_config,
};

/// Input line that toggles the temperature unit in `watch`.
const TOGGLE_COMMAND: &str = ":t";
const QUIT_COMMAND: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Debounced city weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default unit.
    Configure,

    /// Look up one city and print the panel.
    Show {
        /// City name, passed to the service as typed.
        city: String,

        /// Temperature unit; defaults to the configured one.
        #[arg(long)]
        unit: Option<TemperatureUnit>,

        /// Print the raw snapshot as JSON instead of the panel.
        #[arg(long)]
        json: bool,
    },

    /// Interactive widget: each line typed is the new city value.
    Watch {
        /// Starting temperature unit; defaults to the configured one.
        #[arg(long)]
        unit: Option<TemperatureUnit>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        tracing::debug!(command = ?self.command, "starting");

        match self.command {
            Command::Configure => configure(&mut config),
            Command::Show { city, unit, json } => {
                if let Some(unit) = unit {
                    config.unit = unit;
                }
                show(&config, city, json).await
            }
            Command::Watch { unit } => {
                if let Some(unit) = unit {
                    config.unit = unit;
                }
                watch(&config).await
            }
        }
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let unit = Select::new(
        "Default temperature unit:",
        vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit],
    )
    .prompt()
    .context("Failed to read temperature unit")?;

    config.set_api_key(api_key.trim().to_string());
    config.unit = unit;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// One lookup through the widget, without waiting for a debounce window.
async fn show(config: &Config, city: String, json: bool) -> anyhow::Result<()> {
    if city.is_empty() {
        bail!("City must not be empty");
    }

    let provider = provider_from_config(config)?;
    let options = WidgetOptions { debounce: Duration::ZERO, ..WidgetOptions::from(config) };
    let mut widget = WeatherWidget::new(provider, options);
    let mut updates = widget.subscribe();

    widget.set_city(city);
    let state = updates
        .wait_for(|s| !s.loading && (s.snapshot.is_some() || s.error.is_some()))
        .await
        .context("Widget stopped before the lookup finished")?
        .clone();

    match (state.snapshot, json) {
        (Some(snapshot), true) => {
            let text = serde_json::to_string_pretty(&snapshot)
                .context("Failed to serialize weather snapshot")?;
            println!("{text}");
        }
        (Some(_), false) => print!("{}", widget.view()),
        (None, _) => bail!(FETCH_ERROR_MESSAGE),
    }

    Ok(())
}

async fn watch(config: &Config) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let mut widget = WeatherWidget::new(provider, WidgetOptions::from(config));
    let mut updates = widget.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Type a city name and pause. `{TOGGLE_COMMAND}` toggles the unit, `{QUIT_COMMAND}` quits."
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read from stdin")?.as_deref() {
                    None | Some(QUIT_COMMAND) => break,
                    Some(TOGGLE_COMMAND) => widget.toggle_unit(),
                    Some(city) => widget.set_city(city),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                redraw(&widget);
            }
        }
    }

    widget.shutdown();
    Ok(())
}

fn redraw(widget: &WeatherWidget) {
    let state = widget.state();
    println!("----------------------------------------");
    println!("City: {}    [Unit: {}]", state.city, state.unit);
    print!("{}", widget.view());
}
