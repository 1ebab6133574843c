//! Core library for the `bom` CLI.
//!
//! This crate defines:
//! - Geohash location keys for the BOM API
//! - Normalization of daily, hourly and observation records into flat,
//!   display-friendly fields
//! - A collector that fetches every endpoint for one location
//! - Configuration handling
//!
//! It is used by `bom-cli`, but can also be reused by other binaries or services.

pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geohash;
pub mod icon;
pub mod normalize;

pub use collector::{Collector, Endpoint};
pub use config::Config;
pub use error::{CoordinateError, EndpointError, FetchError, NormalizeError, RefreshError};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use geohash::{Coordinate, LocationKeys, encode};
pub use icon::IconTable;
pub use normalize::{Normalizer, Record, UNAVAILABLE, flatten};
