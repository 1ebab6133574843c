use anyhow::{Context, anyhow};
use bom_core::{Collector, Config, Coordinate, Endpoint, geohash};
use clap::{Args, Parser, Subcommand};
use inquire::CustomType;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "bom", version, about = "Bureau of Meteorology weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Location override shared by several commands.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude in degrees, -90..=90.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude in degrees, -180..=180.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the default location.
    Configure {
        #[command(flatten)]
        location: LocationArgs,
    },

    /// Print the geohash for a coordinate.
    Geohash {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,

        #[arg(allow_hyphen_values = true)]
        longitude: f64,

        /// Number of characters to emit.
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(1..=12))]
        precision: u8,
    },

    /// Fetch and show the weather for a location.
    Show {
        #[command(flatten)]
        location: LocationArgs,

        /// Show the hourly forecast instead of the daily one.
        #[arg(long)]
        hourly: bool,

        /// Dump every normalized document as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { location } => configure(location),
            Command::Geohash { latitude, longitude, precision } => {
                let coordinate = Coordinate::new(latitude, longitude)?;
                println!("{}", coordinate.geohash(usize::from(precision)));
                Ok(())
            }
            Command::Show { location, hourly, json } => show(location, hourly, json).await,
        }
    }
}

fn configure(location: LocationArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let latitude = match location.lat {
        Some(lat) => lat,
        None => prompt_degrees("Latitude:", config.latitude, 90.0)?,
    };
    let longitude = match location.lon {
        Some(lon) => lon,
        None => prompt_degrees("Longitude:", config.longitude, 180.0)?,
    };

    let coordinate = Coordinate::new(latitude, longitude)?;
    config.set_coordinate(coordinate);
    config.save()?;

    println!(
        "Saved location {}, {} (geohash {}) to {}",
        coordinate.latitude,
        coordinate.longitude,
        coordinate.geohash(geohash::PRECISE_PRECISION),
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn prompt_degrees(message: &str, current: Option<f64>, limit: f64) -> anyhow::Result<f64> {
    let mut prompt = CustomType::<f64>::new(message)
        .with_error_message("Please enter a number of degrees")
        .with_validator(move |value: &f64| {
            if (-limit..=limit).contains(value) {
                Ok(inquire::validator::Validation::Valid)
            } else {
                Ok(inquire::validator::Validation::Invalid(
                    format!("Must be between -{limit} and {limit}").into(),
                ))
            }
        });
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }

    prompt.prompt().context("Failed to read location")
}

async fn show(location: LocationArgs, hourly: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let coordinate = match (location.lat, location.lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon)?,
        _ => config.coordinate()?,
    };

    let mut collector = Collector::from_config(&config, coordinate)
        .context("Failed to build HTTP client")?;
    tracing::debug!(?coordinate, base_url = %config.base_url, "refreshing");

    if let Err(err) = collector.refresh().await {
        for failure in &err.failures {
            eprintln!("warning: {failure}");
        }
        if err.failures.len() == Endpoint::all().len() {
            return Err(anyhow!("No data could be retrieved from the BOM API"));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output::all_documents(&collector))?);
        return Ok(());
    }

    print!("{}", output::summary(&collector, hourly));
    Ok(())
}
