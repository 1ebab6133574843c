//! Reshaping of BOM forecast and observation records.
//!
//! Every operation here takes a borrowed record and returns a new one; the
//! raw payload is never modified. A record must be normalized exactly once:
//! running a normalized record through again fails because the groups it
//! expects have already been flattened away.

use serde_json::{Map, Value};

use crate::{error::NormalizeError, icon::IconTable};

/// A JSON object as decoded from the API.
pub type Record = Map<String, Value>;

/// Marker for fields the station does not report, as opposed to `null`.
pub const UNAVAILABLE: &str = "unavailable";

pub const ICON_FIELD: &str = "icon_identifier";
pub const UV_LABEL_FIELD: &str = "uv_category_label";

const DAILY_RANGE_SEPARATOR: &str = "–";
const HOURLY_RANGE_SEPARATOR: &str = " to ";

const WIND_FIELDS: &[&str] = &["wind_direction", "wind_speed_kilometre", "wind_speed_knot"];
const GUST_FIELDS: &[&str] = &["gust_speed_kilometre", "gust_speed_knot"];

/// Promote the fields of each named group to the top level as
/// `<group>_<field>`.
///
/// A group that is `null` is left in place. A group that is not present at
/// all is an error.
pub fn flatten(groups: &[&str], record: &Record) -> Result<Record, NormalizeError> {
    let mut out = record.clone();
    flatten_in(groups, &mut out)?;
    Ok(out)
}

fn flatten_in(groups: &[&str], record: &mut Record) -> Result<(), NormalizeError> {
    for &name in groups {
        match record.get(name) {
            None => return Err(NormalizeError::missing(name)),
            Some(Value::Null) => continue,
            Some(Value::Object(_)) => {}
            Some(_) => return Err(NormalizeError::NotAGroup { key: name.to_string() }),
        }

        if let Some(Value::Object(inner)) = record.remove(name) {
            for (key, value) in inner {
                record.insert(format!("{name}_{key}"), value);
            }
        }
    }

    Ok(())
}

/// Normalizes records against a condition icon table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    table: &'static IconTable,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(IconTable::bom())
    }
}

impl Normalizer {
    pub fn new(table: &'static IconTable) -> Self {
        Self { table }
    }

    /// Normalize one entry of the daily forecast list. The entry at index 0
    /// is today's and additionally carries a `now` group.
    pub fn daily_entry(&self, record: &Record, index: usize) -> Result<Record, NormalizeError> {
        let mut out = record.clone();

        self.substitute_icon(&mut out)?;
        flatten_rain_amount(&mut out)?;
        flatten_in(&["rain", "uv", "astronomical"], &mut out)?;
        if index == 0 {
            flatten_in(&["now"], &mut out)?;
        }
        reconcile_rain_range(&mut out, DAILY_RANGE_SEPARATOR)?;
        self.label_uv(&mut out);

        Ok(out)
    }

    pub fn hourly_entry(&self, record: &Record) -> Result<Record, NormalizeError> {
        let mut out = record.clone();

        self.substitute_icon(&mut out)?;
        flatten_rain_amount(&mut out)?;
        flatten_in(&["rain", "wind"], &mut out)?;
        reconcile_rain_range(&mut out, HOURLY_RANGE_SEPARATOR)?;

        Ok(out)
    }

    /// Normalize the single observation record. Missing wind or gust
    /// readings are marked [`UNAVAILABLE`].
    pub fn observation(&self, record: &Record) -> Result<Record, NormalizeError> {
        let mut out = record.clone();

        flatten_or_mark_unavailable(&mut out, "wind", WIND_FIELDS)?;
        flatten_or_mark_unavailable(&mut out, "gust", GUST_FIELDS)?;

        Ok(out)
    }

    /// Normalize a full `/forecasts/daily` response.
    pub fn daily(&self, document: &Value) -> Result<Value, NormalizeError> {
        map_data_list(document, |entry, index| self.daily_entry(entry, index))
    }

    /// Normalize a full `/forecasts/hourly` response.
    pub fn hourly(&self, document: &Value) -> Result<Value, NormalizeError> {
        map_data_list(document, |entry, _| self.hourly_entry(entry))
    }

    /// Normalize a full `/observations` response.
    pub fn observations(&self, document: &Value) -> Result<Value, NormalizeError> {
        let mut out = document_object(document)?.clone();
        let data = match out.get("data") {
            None => return Err(NormalizeError::missing("data")),
            Some(Value::Object(data)) => self.observation(data)?,
            Some(_) => return Err(NormalizeError::NotAGroup { key: "data".to_string() }),
        };
        out.insert("data".to_string(), Value::Object(data));
        Ok(Value::Object(out))
    }

    fn substitute_icon(&self, record: &mut Record) -> Result<(), NormalizeError> {
        let descriptor = match record.get("icon_descriptor") {
            None => return Err(NormalizeError::missing("icon_descriptor")),
            Some(Value::Null) => None,
            Some(Value::String(descriptor)) => Some(descriptor.as_str()),
            Some(other) => {
                return Err(NormalizeError::UnknownCondition { descriptor: other.to_string() });
            }
        };

        let icon = self.table.icon(descriptor)?;
        record.insert(ICON_FIELD.to_string(), icon.map_or(Value::Null, Value::from));
        Ok(())
    }

    /// UV categories are informational: one outside the table gets a null
    /// label instead of failing the entry.
    fn label_uv(&self, record: &mut Record) {
        let Some(category) = record.get("uv_category") else {
            return;
        };

        let label = category.as_str().and_then(|category| self.table.uv_label(category));
        record.insert(UV_LABEL_FIELD.to_string(), label.map_or(Value::Null, Value::from));
    }
}

/// `rain.amount` becomes `rain.amount_*`, ready for the top-level `rain` pass.
fn flatten_rain_amount(record: &mut Record) -> Result<(), NormalizeError> {
    match record.get_mut("rain") {
        None => Err(NormalizeError::missing("rain")),
        Some(Value::Null) => Ok(()),
        Some(Value::Object(rain)) => flatten_in(&["amount"], rain),
        Some(_) => Err(NormalizeError::NotAGroup { key: "rain".to_string() }),
    }
}

/// Without an upper bound the range collapses to the lower bound; otherwise
/// both bounds are joined with `separator`.
fn reconcile_rain_range(record: &mut Record, separator: &str) -> Result<(), NormalizeError> {
    let min = record
        .get("rain_amount_min")
        .cloned()
        .ok_or_else(|| NormalizeError::missing("rain_amount_min"))?;

    let joined = match record.get("rain_amount_max") {
        None => return Err(NormalizeError::missing("rain_amount_max")),
        Some(Value::Null) => None,
        Some(max) => Some(format!("{}{separator}{}", plain(&min), plain(max))),
    };

    let range = match joined {
        Some(text) => Value::String(text),
        None => {
            record.insert("rain_amount_max".to_string(), min.clone());
            min
        }
    };
    record.insert("rain_amount_range".to_string(), range);

    Ok(())
}

fn flatten_or_mark_unavailable(
    record: &mut Record,
    group: &str,
    fields: &[&str],
) -> Result<(), NormalizeError> {
    if record.get(group).is_some_and(|value| !value.is_null()) {
        return flatten_in(&[group], record);
    }

    for field in fields {
        record.insert((*field).to_string(), Value::from(UNAVAILABLE));
    }
    Ok(())
}

fn document_object(document: &Value) -> Result<&Record, NormalizeError> {
    document
        .as_object()
        .ok_or_else(|| NormalizeError::NotAGroup { key: "document".to_string() })
}

fn map_data_list<F>(document: &Value, normalize: F) -> Result<Value, NormalizeError>
where
    F: Fn(&Record, usize) -> Result<Record, NormalizeError>,
{
    let document = document_object(document)?;
    let entries = document
        .get("data")
        .ok_or_else(|| NormalizeError::missing("data"))?
        .as_array()
        .ok_or_else(|| NormalizeError::NotAList { key: "data".to_string() })?;

    let data = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let entry = entry
                .as_object()
                .ok_or_else(|| NormalizeError::NotAGroup { key: format!("data[{index}]") })?;
            normalize(entry, index).map(Value::Object)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Record::new();
    for (key, value) in document {
        if key != "data" {
            out.insert(key.clone(), value.clone());
        }
    }
    out.insert("data".to_string(), Value::Array(data));

    Ok(Value::Object(out))
}

/// Render a value for display: strings without their quotes.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn daily_entry(min: Value, max: Value) -> Record {
        record(json!({
            "date": "2024-01-02T13:30:00Z",
            "temp_max": 31,
            "icon_descriptor": "sunny",
            "rain": {
                "amount": { "min": min, "max": max, "units": "mm" },
                "chance": 10
            },
            "uv": { "category": "veryhigh", "max_index": 11 },
            "astronomical": { "sunrise_time": "2024-01-01T19:00:00Z" }
        }))
    }

    fn hourly_entry(min: Value, max: Value) -> Record {
        record(json!({
            "time": "2024-01-01T14:00:00Z",
            "temp": 24,
            "icon_descriptor": "mostly_sunny",
            "rain": { "amount": { "min": min, "max": max }, "chance": 5 },
            "wind": { "speed_kilometre": 13, "direction": "SW" }
        }))
    }

    #[test]
    fn flatten_promotes_inner_fields() {
        let raw = record(json!({ "rain": { "amount_min": 1, "amount_max": 2 } }));

        let out = flatten(&["rain"], &raw).unwrap();

        assert_eq!(out["rain_amount_min"], json!(1));
        assert_eq!(out["rain_amount_max"], json!(2));
        assert!(!out.contains_key("rain"));
        assert!(raw.contains_key("rain"), "input must not be modified");
    }

    #[test]
    fn flatten_leaves_null_group_alone() {
        let raw = record(json!({ "rain": null, "temp": 3 }));

        let out = flatten(&["rain"], &raw).unwrap();

        assert_eq!(out, raw);
    }

    #[test]
    fn flatten_requires_group_key() {
        let raw = record(json!({ "temp": 3 }));

        let err = flatten(&["rain"], &raw).unwrap_err();

        assert_eq!(err, NormalizeError::MissingKey { key: "rain".into() });
    }

    #[test]
    fn flatten_rejects_scalar_group() {
        let raw = record(json!({ "rain": 4 }));

        assert!(matches!(flatten(&["rain"], &raw), Err(NormalizeError::NotAGroup { .. })));
    }

    #[test]
    fn daily_falls_back_to_min_without_max() {
        let out = Normalizer::default().daily_entry(&daily_entry(json!(0), Value::Null), 1).unwrap();

        assert_eq!(out["rain_amount_max"], json!(0));
        assert_eq!(out["rain_amount_range"], json!(0));
        assert_eq!(out[ICON_FIELD], json!("mdi:weather-sunny"));
        assert_eq!(out["rain_chance"], json!(10));
        assert_eq!(out["rain_amount_units"], json!("mm"));
        assert_eq!(out["uv_max_index"], json!(11));
        assert_eq!(out[UV_LABEL_FIELD], json!("Very High"));
        assert_eq!(out["astronomical_sunrise_time"], json!("2024-01-01T19:00:00Z"));
        for group in ["rain", "uv", "astronomical"] {
            assert!(!out.contains_key(group), "{group} should be flattened");
        }
    }

    #[test]
    fn daily_range_uses_en_dash() {
        let out = Normalizer::default().daily_entry(&daily_entry(json!(1), json!(5)), 3).unwrap();

        assert_eq!(out["rain_amount_range"], json!("1–5"));
        assert_eq!(out["rain_amount_max"], json!(5));
    }

    #[test]
    fn daily_first_entry_flattens_now() {
        let mut raw = daily_entry(json!(0.2), json!(1.5));
        raw.insert(
            "now".into(),
            json!({ "is_night": false, "temp_now": 22, "now_label": "Max" }),
        );

        let out = Normalizer::default().daily_entry(&raw, 0).unwrap();

        assert_eq!(out["now_temp_now"], json!(22));
        assert_eq!(out["now_is_night"], json!(false));
        assert!(!out.contains_key("now"));
        assert_eq!(out["rain_amount_range"], json!("0.2–1.5"));
    }

    #[test]
    fn daily_first_entry_requires_now() {
        let err = Normalizer::default()
            .daily_entry(&daily_entry(json!(0), json!(1)), 0)
            .unwrap_err();

        assert_eq!(err, NormalizeError::MissingKey { key: "now".into() });
    }

    #[test]
    fn daily_later_entries_keep_now_untouched() {
        let mut raw = daily_entry(json!(0), json!(1));
        raw.insert("now".into(), json!({ "temp_now": 1 }));

        let out = Normalizer::default().daily_entry(&raw, 2).unwrap();

        assert_eq!(out["now"], json!({ "temp_now": 1 }));
    }

    #[test]
    fn hourly_range_uses_to() {
        let out = Normalizer::default().hourly_entry(&hourly_entry(json!(1), json!(5))).unwrap();

        assert_eq!(out["rain_amount_range"], json!("1 to 5"));
        assert_eq!(out["wind_speed_kilometre"], json!(13));
        assert_eq!(out["wind_direction"], json!("SW"));
        assert_eq!(out[ICON_FIELD], json!("mdi:weather-sunny"));
        assert!(!out.contains_key("wind"));
    }

    #[test]
    fn hourly_falls_back_to_min_without_max() {
        let out = Normalizer::default().hourly_entry(&hourly_entry(json!(0), Value::Null)).unwrap();

        assert_eq!(out["rain_amount_max"], json!(0));
        assert_eq!(out["rain_amount_range"], json!(0));
    }

    #[test]
    fn null_rain_has_no_bounds_to_reconcile() {
        let normalizer = Normalizer::default();
        let missing_min = NormalizeError::MissingKey { key: "rain_amount_min".into() };

        let mut daily = daily_entry(json!(0), json!(1));
        daily.insert("rain".into(), Value::Null);
        assert_eq!(normalizer.daily_entry(&daily, 1).unwrap_err(), missing_min);

        let mut hourly = hourly_entry(json!(0), json!(1));
        hourly.insert("rain".into(), Value::Null);
        assert_eq!(normalizer.hourly_entry(&hourly).unwrap_err(), missing_min);
    }

    #[test]
    fn unknown_uv_category_gets_null_label() {
        let mut raw = daily_entry(json!(0), Value::Null);
        raw.insert("uv".into(), json!({ "category": "very_high", "max_index": 9 }));

        let out = Normalizer::default().daily_entry(&raw, 1).unwrap();

        assert_eq!(out["uv_category"], json!("very_high"));
        assert_eq!(out[UV_LABEL_FIELD], Value::Null);
        assert_eq!(out["rain_amount_range"], json!(0));
        assert_eq!(out[ICON_FIELD], json!("mdi:weather-sunny"));
    }

    #[test]
    fn entry_without_uv_category_gets_no_label() {
        let mut raw = daily_entry(json!(0), json!(2));
        raw.insert("uv".into(), Value::Null);

        let out = Normalizer::default().daily_entry(&raw, 1).unwrap();

        assert!(!out.contains_key(UV_LABEL_FIELD));
    }

    #[test]
    fn null_descriptor_gives_null_icon() {
        let mut raw = hourly_entry(json!(0), json!(1));
        raw.insert("icon_descriptor".into(), Value::Null);

        let out = Normalizer::default().hourly_entry(&raw).unwrap();

        assert_eq!(out[ICON_FIELD], Value::Null);
    }

    #[test]
    fn unknown_descriptor_is_an_error() {
        let mut raw = daily_entry(json!(0), json!(1));
        raw.insert("icon_descriptor".into(), json!("volcanic_ash"));

        let err = Normalizer::default().daily_entry(&raw, 1).unwrap_err();

        assert_eq!(err, NormalizeError::UnknownCondition { descriptor: "volcanic_ash".into() });
    }

    #[test]
    fn normalizing_twice_fails() {
        let normalizer = Normalizer::default();
        let once = normalizer.hourly_entry(&hourly_entry(json!(1), json!(2))).unwrap();

        assert!(matches!(normalizer.hourly_entry(&once), Err(NormalizeError::MissingKey { .. })));
    }

    #[test]
    fn observation_marks_missing_wind_and_gust() {
        let raw = record(json!({ "temp": 18.2, "wind": null, "gust": null }));

        let out = Normalizer::default().observation(&raw).unwrap();

        for field in WIND_FIELDS.iter().chain(GUST_FIELDS) {
            assert_eq!(out[*field], json!(UNAVAILABLE), "{field}");
        }
        assert_eq!(out["temp"], json!(18.2));
    }

    #[test]
    fn observation_marks_absent_wind() {
        let raw = record(json!({ "temp": 18.2, "gust": { "speed_kilometre": 20, "speed_knot": 11 } }));

        let out = Normalizer::default().observation(&raw).unwrap();

        assert_eq!(out["wind_direction"], json!(UNAVAILABLE));
        assert_eq!(out["gust_speed_kilometre"], json!(20));
        assert_eq!(out["gust_speed_knot"], json!(11));
        assert!(!out.contains_key("gust"));
    }

    #[test]
    fn observation_flattens_wind() {
        let raw = record(json!({
            "wind": { "direction": "NNE", "speed_kilometre": 9, "speed_knot": 5 },
            "gust": null
        }));

        let out = Normalizer::default().observation(&raw).unwrap();

        assert_eq!(out["wind_direction"], json!("NNE"));
        assert_eq!(out["wind_speed_knot"], json!(5));
        assert_eq!(out["gust_speed_knot"], json!(UNAVAILABLE));
        assert!(!out.contains_key(ICON_FIELD));
    }

    #[test]
    fn daily_document_keeps_metadata() {
        let mut today = daily_entry(json!(0), Value::Null);
        today.insert("now".into(), json!({ "temp_now": 20 }));
        let doc = json!({
            "metadata": { "issue_time": "2024-01-01T10:00:00Z" },
            "data": [today, daily_entry(json!(2), json!(8))]
        });

        let out = Normalizer::default().daily(&doc).unwrap();

        assert_eq!(out["metadata"], doc["metadata"]);
        assert_eq!(out["data"][0]["now_temp_now"], json!(20));
        assert_eq!(out["data"][1]["rain_amount_range"], json!("2–8"));
    }

    #[test]
    fn hourly_document_requires_data_list() {
        let normalizer = Normalizer::default();

        assert_eq!(
            normalizer.hourly(&json!({ "metadata": {} })).unwrap_err(),
            NormalizeError::MissingKey { key: "data".into() }
        );
        assert_eq!(
            normalizer.hourly(&json!({ "data": {} })).unwrap_err(),
            NormalizeError::NotAList { key: "data".into() }
        );
    }

    #[test]
    fn empty_forecast_list_is_kept() {
        let out = Normalizer::default().hourly(&json!({ "data": [] })).unwrap();

        assert_eq!(out, json!({ "data": [] }));
    }

    #[test]
    fn observations_document() {
        let doc = json!({ "metadata": {}, "data": { "temp": 12, "wind": null, "gust": null } });

        let out = Normalizer::default().observations(&doc).unwrap();

        assert_eq!(out["data"]["wind_speed_kilometre"], json!(UNAVAILABLE));
        assert_eq!(out["data"]["temp"], json!(12));
    }
}
