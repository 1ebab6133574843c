use std::fmt::{Display, Write};

use bom_core::{Collector, Endpoint, normalize::ICON_FIELD};
use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};

/// Every document keyed by endpoint name; failed endpoints are `null`.
pub fn all_documents(collector: &Collector) -> Value {
    let mut out = Map::new();
    for &endpoint in Endpoint::all() {
        let document = collector.document(endpoint).cloned().unwrap_or(Value::Null);
        out.insert(endpoint.as_str().replace(' ', "_"), document);
    }
    Value::Object(out)
}

pub fn summary(collector: &Collector, hourly: bool) -> String {
    let mut out = String::new();

    let name = collector
        .locations()
        .and_then(|doc| doc["data"]["name"].as_str())
        .unwrap_or("Unknown location");
    let _ = writeln!(out, "{name} ({})", collector.keys().precise);

    if let Some(observations) = collector.observations() {
        out.push_str(&observation_line(&observations["data"]));
    }

    let forecast = if hourly { collector.hourly_forecasts() } else { collector.daily_forecasts() };
    if let Some(forecast) = forecast {
        out.push_str(&forecast_rows(forecast, hourly, &Local));
    }

    out
}

fn observation_line(data: &Value) -> String {
    format!(
        "Now: {}°C, wind {} {} km/h, gusts {} km/h\n",
        text(&data["temp"]),
        text(&data["wind_direction"]),
        text(&data["wind_speed_kilometre"]),
        text(&data["gust_speed_kilometre"]),
    )
}

/// One tab-separated row per forecast entry.
fn forecast_rows<Tz>(document: &Value, hourly: bool, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(entries) = document["data"].as_array() else {
        return String::new();
    };

    let mut out = String::new();
    for entry in entries {
        let icon = text(&entry[ICON_FIELD]);
        if hourly {
            let when = format_timestamp(&entry["time"], tz, "%a %H:%M");
            let _ = writeln!(
                out,
                "{when}\t{}°C\t{}\t{icon}",
                text(&entry["temp"]),
                text(&entry["rain_amount_range"])
            );
        } else {
            let when = format_timestamp(&entry["date"], tz, "%a %d %b");
            let _ = writeln!(
                out,
                "{when}\t{}°C\t{}\t{icon}",
                text(&entry["temp_max"]),
                text(&entry["extended_text"])
            );
        }
    }
    out
}

fn format_timestamp<Tz>(value: &Value, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(tz).format(format).to_string())
        .unwrap_or_else(|| text(value))
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn daily_rows() {
        let doc = json!({
            "data": [
                {
                    "date": "2024-01-01T13:30:00Z",
                    "temp_max": 31,
                    "extended_text": "Sunny.",
                    "icon_identifier": "mdi:weather-sunny"
                },
                {
                    "date": "2024-01-02T13:30:00Z",
                    "temp_max": null,
                    "extended_text": "Showers.",
                    "icon_identifier": null
                }
            ]
        });

        let rows = forecast_rows(&doc, false, &Utc);

        assert_eq!(
            rows,
            "Mon 01 Jan\t31°C\tSunny.\tmdi:weather-sunny\nTue 02 Jan\t-°C\tShowers.\t-\n"
        );
    }

    #[test]
    fn hourly_rows() {
        let doc = json!({
            "data": [{
                "time": "2024-01-01T14:00:00Z",
                "temp": 24,
                "rain_amount_range": "1 to 5",
                "icon_identifier": "mdi:weather-rainy"
            }]
        });

        assert_eq!(forecast_rows(&doc, true, &Utc), "Mon 14:00\t24°C\t1 to 5\tmdi:weather-rainy\n");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        assert_eq!(format_timestamp(&json!("soon"), &Utc, "%H:%M"), "soon");
        assert_eq!(format_timestamp(&Value::Null, &Utc, "%H:%M"), "-");
    }

    #[test]
    fn observation_line_shows_unavailable_wind() {
        let data = json!({
            "temp": 18.5,
            "wind_direction": "unavailable",
            "wind_speed_kilometre": "unavailable",
            "gust_speed_kilometre": 30
        });

        assert_eq!(
            observation_line(&data),
            "Now: 18.5°C, wind unavailable unavailable km/h, gusts 30 km/h\n"
        );
    }
}
