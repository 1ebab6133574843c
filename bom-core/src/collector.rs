//! Refresh cycle against the BOM location endpoints.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    config::Config,
    error::{EndpointError, EndpointFailure, FetchError, RefreshError},
    fetch::{Fetcher, HttpFetcher},
    geohash::{Coordinate, LocationKeys},
    normalize::Normalizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Location,
    Observations,
    DailyForecasts,
    HourlyForecasts,
    Warnings,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Location => "location",
            Endpoint::Observations => "observations",
            Endpoint::DailyForecasts => "daily forecasts",
            Endpoint::HourlyForecasts => "hourly forecasts",
            Endpoint::Warnings => "warnings",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Location,
            Endpoint::Observations,
            Endpoint::DailyForecasts,
            Endpoint::HourlyForecasts,
            Endpoint::Warnings,
        ]
    }

    /// The location lookup uses the precise key, everything else the
    /// regional one.
    pub fn url(&self, base_url: &str, keys: &LocationKeys) -> String {
        match self {
            Endpoint::Location => format!("{base_url}{}", keys.precise),
            Endpoint::Observations => format!("{base_url}{}/observations", keys.regional),
            Endpoint::DailyForecasts => format!("{base_url}{}/forecasts/daily", keys.regional),
            Endpoint::HourlyForecasts => format!("{base_url}{}/forecasts/hourly", keys.regional),
            Endpoint::Warnings => format!("{base_url}{}/warnings", keys.regional),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the latest documents for one coordinate.
///
/// Each document is `None` until a refresh fetched and normalized it; a
/// failed endpoint resets its document to `None` rather than keeping stale
/// data from an earlier cycle.
#[derive(Debug)]
pub struct Collector {
    fetcher: Box<dyn Fetcher>,
    normalizer: Normalizer,
    base_url: String,
    coordinate: Coordinate,
    keys: LocationKeys,
    locations: Option<Value>,
    observations: Option<Value>,
    daily_forecasts: Option<Value>,
    hourly_forecasts: Option<Value>,
    warnings: Option<Value>,
    last_refreshed: Option<DateTime<Utc>>,
}

impl Collector {
    pub fn new(coordinate: Coordinate, base_url: &str, fetcher: Box<dyn Fetcher>) -> Self {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            fetcher,
            normalizer: Normalizer::default(),
            base_url,
            coordinate,
            keys: LocationKeys::for_coordinate(coordinate),
            locations: None,
            observations: None,
            daily_forecasts: None,
            hourly_forecasts: None,
            warnings: None,
            last_refreshed: None,
        }
    }

    /// Build a collector that talks HTTP using the settings in `config`.
    pub fn from_config(config: &Config, coordinate: Coordinate) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
        Ok(Self::new(coordinate, &config.base_url, Box::new(fetcher)))
    }

    /// Fetch and normalize every endpoint.
    ///
    /// Endpoints are independent: a failure in one is recorded and the
    /// rest are still fetched. Any failure, including a payload the
    /// normalizer rejects, is returned once all endpoints have been tried.
    pub async fn refresh(&mut self) -> Result<(), RefreshError> {
        let mut failures = Vec::new();

        for &endpoint in Endpoint::all() {
            let document = match self.collect(endpoint).await {
                Ok(document) => Some(document),
                Err(error) => {
                    tracing::warn!(%endpoint, %error, "unable to get data from BOM API");
                    failures.push(EndpointFailure { endpoint, error });
                    None
                }
            };
            *self.slot_mut(endpoint) = document;
        }

        self.last_refreshed = Some(Utc::now());
        tracing::info!(
            geohash = %self.keys.precise,
            failed = failures.len(),
            "refresh complete"
        );

        if failures.is_empty() { Ok(()) } else { Err(RefreshError { failures }) }
    }

    async fn collect(&self, endpoint: Endpoint) -> Result<Value, EndpointError> {
        let url = endpoint.url(&self.base_url, &self.keys);
        let document = self.fetcher.fetch(&url).await?.json()?;

        let document = match endpoint {
            Endpoint::Location | Endpoint::Warnings => document,
            Endpoint::Observations => self.normalizer.observations(&document)?,
            Endpoint::DailyForecasts => self.normalizer.daily(&document)?,
            Endpoint::HourlyForecasts => self.normalizer.hourly(&document)?,
        };

        Ok(document)
    }

    fn slot_mut(&mut self, endpoint: Endpoint) -> &mut Option<Value> {
        match endpoint {
            Endpoint::Location => &mut self.locations,
            Endpoint::Observations => &mut self.observations,
            Endpoint::DailyForecasts => &mut self.daily_forecasts,
            Endpoint::HourlyForecasts => &mut self.hourly_forecasts,
            Endpoint::Warnings => &mut self.warnings,
        }
    }

    pub fn document(&self, endpoint: Endpoint) -> Option<&Value> {
        match endpoint {
            Endpoint::Location => self.locations.as_ref(),
            Endpoint::Observations => self.observations.as_ref(),
            Endpoint::DailyForecasts => self.daily_forecasts.as_ref(),
            Endpoint::HourlyForecasts => self.hourly_forecasts.as_ref(),
            Endpoint::Warnings => self.warnings.as_ref(),
        }
    }

    pub fn locations(&self) -> Option<&Value> {
        self.locations.as_ref()
    }

    pub fn observations(&self) -> Option<&Value> {
        self.observations.as_ref()
    }

    pub fn daily_forecasts(&self) -> Option<&Value> {
        self.daily_forecasts.as_ref()
    }

    pub fn hourly_forecasts(&self) -> Option<&Value> {
        self.hourly_forecasts.as_ref()
    }

    pub fn warnings(&self) -> Option<&Value> {
        self.warnings.as_ref()
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn keys(&self) -> &LocationKeys {
        &self.keys
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}
