//! Lookup tables for BOM condition descriptors and UV categories.

use std::{collections::HashMap, sync::LazyLock};

use crate::error::NormalizeError;

const CONDITION_ICONS: &[(&str, &str)] = &[
    ("clear", "mdi:weather-night"),
    ("cloudy", "mdi:weather-cloudy"),
    ("cyclone", "mdi:weather-hurricane"),
    ("dust", "mdi:weather-hazy"),
    ("dusty", "mdi:weather-hazy"),
    ("fog", "mdi:weather-fog"),
    ("frost", "mdi:snowflake-melt"),
    ("haze", "mdi:weather-hazy"),
    ("hazy", "mdi:weather-hazy"),
    ("heavy_shower", "mdi:weather-pouring"),
    ("heavy_showers", "mdi:weather-pouring"),
    ("light_rain", "mdi:weather-partly-rainy"),
    ("light_shower", "mdi:weather-light-showers"),
    ("light_showers", "mdi:weather-light-showers"),
    ("mostly_sunny", "mdi:weather-sunny"),
    ("partly_cloudy", "mdi:weather-partly-cloudy"),
    ("rain", "mdi:weather-pouring"),
    ("shower", "mdi:weather-rainy"),
    ("showers", "mdi:weather-rainy"),
    ("snow", "mdi:weather-snowy"),
    ("storm", "mdi:weather-lightning-rainy"),
    ("storms", "mdi:weather-lightning-rainy"),
    ("sunny", "mdi:weather-sunny"),
    ("tropical_cyclone", "mdi:weather-hurricane"),
    ("wind", "mdi:weather-windy"),
    ("windy", "mdi:weather-windy"),
];

const UV_LABELS: &[(&str, &str)] = &[
    ("extreme", "Extreme"),
    ("veryhigh", "Very High"),
    ("high", "High"),
    ("moderate", "Moderate"),
    ("low", "Low"),
];

static BOM_TABLE: LazyLock<IconTable> = LazyLock::new(|| IconTable {
    icons: CONDITION_ICONS.iter().copied().collect(),
    uv_labels: UV_LABELS.iter().copied().collect(),
});

/// Read-only mapping from condition descriptors to icon identifiers.
///
/// The table is exhaustive for descriptors the API is known to send; a
/// descriptor it does not contain is reported as an error. A missing (null)
/// descriptor maps to no icon.
#[derive(Debug)]
pub struct IconTable {
    icons: HashMap<&'static str, &'static str>,
    uv_labels: HashMap<&'static str, &'static str>,
}

impl IconTable {
    /// The table for the BOM API, built once per process.
    pub fn bom() -> &'static IconTable {
        &BOM_TABLE
    }

    pub fn icon(&self, descriptor: Option<&str>) -> Result<Option<&'static str>, NormalizeError> {
        let Some(descriptor) = descriptor else {
            return Ok(None);
        };

        self.icons
            .get(descriptor)
            .copied()
            .map(Some)
            .ok_or_else(|| NormalizeError::UnknownCondition { descriptor: descriptor.to_string() })
    }

    /// Display label for a UV category. Categories outside the table have
    /// no label.
    pub fn uv_label(&self, category: &str) -> Option<&'static str> {
        self.uv_labels.get(category).copied()
    }
}
