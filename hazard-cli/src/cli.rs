use anyhow::Context;
use clap::{Parser, Subcommand};
use hazard_core::{Config, RawSeismicParams, WeatherSource, fetch_earthquakes, fetch_weather};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "hazard", version, about = "Hazard data CLI (live weather & seismic feeds)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a weather provider.
    Configure {
        /// Provider short name, e.g. "openweathermap" or "weatherapi".
        provider: String,
    },

    /// Show the current weather for a city.
    Weather {
        /// City name.
        city: String,

        /// Weather source; falls back to the configured default.
        #[arg(long)]
        source: Option<String>,
    },

    /// List recent seismic events.
    Earthquakes {
        /// Seismic source.
        #[arg(long, default_value = "usgs")]
        source: String,

        /// Minimum magnitude (provider default: 4).
        #[arg(long)]
        min_magnitude: Option<String>,

        /// Maximum number of events (provider default: 10).
        #[arg(long)]
        limit: Option<String>,

        /// Window start, e.g. 2024-03-01.
        #[arg(long)]
        start_time: Option<String>,

        /// Window end, e.g. 2024-03-15.
        #[arg(long)]
        end_time: Option<String>,

        /// Keep only events whose place text contains this, case-insensitive.
        #[arg(long)]
        location: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Weather { city, source } => weather(&city, source.as_deref()).await,
            Command::Earthquakes {
                source,
                min_magnitude,
                limit,
                start_time,
                end_time,
                location,
            } => {
                let params = RawSeismicParams {
                    min_magnitude,
                    limit,
                    start_time,
                    end_time,
                    location_contains: location,
                };
                earthquakes(&source, &params).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let source = WeatherSource::try_from(provider).map_err(|err| anyhow::anyhow!("{err}"))?;

    let api_key = inquire::Password::new(&format!("API key for {source}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(source.as_str(), api_key);
    config.save()?;

    println!("Saved credentials for {source}.");
    Ok(())
}

async fn weather(city: &str, source: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;

    let source = match source {
        Some(s) => s.to_string(),
        None => config.default_weather_source()?.to_string(),
    };

    let observation = fetch_weather(&config, &source, city)
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

async fn earthquakes(source: &str, params: &RawSeismicParams) -> anyhow::Result<()> {
    let events = fetch_earthquakes(source, params)
        .await
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
