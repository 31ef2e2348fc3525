use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use cityweather::aggregator::{CombinedForecast, FavoritesOverview};
use cityweather::city_lookup::should_search;
use cityweather::config::LoggingConfig;
use cityweather::{
    ApiClient, CityLookup, CityService, CityWeatherConfig, FavoriteCities, FjallCityStore,
    ForecastAggregator, Location, OpenWeatherService, WeatherError,
};

/// Current, daily and weekly forecasts for your favorite cities
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Configuration file; defaults to <config dir>/cityweather/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search cities by name
    Search { query: String },
    /// Add the best match for a search to the favorites
    Add { query: String },
    /// Remove the favorite at an index
    Remove { index: usize },
    /// Move a favorite so it ends up at index `to`
    Move { from: usize, to: usize },
    /// List the favorites
    List,
    /// Current conditions and weekly outlook of one favorite
    Forecast { index: usize },
    /// Current temperature of every favorite
    Overview,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<WeatherError>() {
                Some(weather) => {
                    error!("{:#}", err);
                    eprintln!("{}", weather.user_message());
                }
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = CityWeatherConfig::load_from_path(cli.config.clone())?;
    init_logging(&config.logging, cli.verbose);
    debug!("Loaded configuration: {:?}", config.storage);

    let client = ApiClient::new(&config.http).context("Failed to build HTTP client")?;
    let lookup = CityLookup::new(client.clone(), &config.lookup);
    let service = Arc::new(OpenWeatherService::new(client, &config.forecast));
    let aggregator = ForecastAggregator::from_config(service, &config);
    let favorites = FavoriteCities::new(FjallCityStore::open(&config.storage.path)?);

    match cli.command {
        Command::Search { query } => {
            if !should_search(&query) {
                println!("Type at least 3 characters to search");
                return Ok(());
            }
            let cities = lookup.find_city(&query).await?;
            print_cities(&cities, cli.json)?;
        }
        Command::Add { query } => {
            let candidate = lookup
                .find_city(&query)
                .await?
                .into_iter()
                .next()
                .ok_or(WeatherError::CityNotFound { query })?;
            let added = favorites.add_from_search(&lookup, &candidate).await?;
            println!("Added {}", added.display_label());
        }
        Command::Remove { index } => {
            let removed = favorites.remove_city(index).await?;
            println!("Removed {}", removed.display_label());
        }
        Command::Move { from, to } => {
            favorites.move_city(from, to).await?;
            print_cities(&favorites.get_cities().await?, cli.json)?;
        }
        Command::List => {
            print_cities(&favorites.get_cities().await?, cli.json)?;
        }
        Command::Forecast { index } => {
            let cities = favorites.get_cities().await?;
            let city = cities.get(index).ok_or(WeatherError::IndexOutOfRange {
                index,
                len: cities.len(),
            })?;
            let forecast = aggregator.get_combined_forecast(city).await?;
            if cli.json {
                print_json(&forecast)?;
            } else {
                print_forecast(city, &forecast);
            }
        }
        Command::Overview => {
            let cities = favorites.get_cities().await?;
            let overview = aggregator.get_forecast_for_favorites(&cities).await?;
            if cli.json {
                print_json(&overview)?;
            } else {
                print_overview(&overview);
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cityweather={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_cities(cities: &[Location], json: bool) -> Result<()> {
    if json {
        return print_json(&cities);
    }
    if cities.is_empty() {
        println!("No cities");
    }
    for (index, city) in cities.iter().enumerate() {
        match city.format_coordinates() {
            Some(coordinates) => println!("{index:>3}  {}  ({coordinates})", city.display_label()),
            None => println!("{index:>3}  {}", city.display_label()),
        }
    }
    Ok(())
}

fn print_forecast(city: &Location, forecast: &CombinedForecast) {
    let current = &forecast.current;
    println!("{}", city.display_label());
    println!("{}", current.date);
    println!("{}  {}", current.temperature, current.description);
    println!(
        "Wind {}  Humidity {}  Pressure {}  Visibility {}",
        current.wind, current.humidity, current.pressure, current.visibility
    );
    println!();

    for (label, sample) in current.times.iter().zip(current.forecast.samples()) {
        println!("{label:>6}  {}", cityweather::display::temperature(sample.temperature));
    }
    println!();

    for day in &forecast.weekly.days {
        println!("{:<10} {:>6} {:>6}", day.day, day.min, day.max);
    }
}

fn print_overview(overview: &FavoritesOverview) {
    if overview.entries.is_empty() {
        println!("No favorites yet, add one with `cityweather add <city>`");
    }
    for entry in &overview.entries {
        println!("{:<20} {:>6}  {}", entry.name, entry.degree, entry.date);
    }
}
