use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Fields contributed by the current-conditions (observation) dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationFields {
    pub observation_time: NaiveDateTime,
    pub location_name: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub humidity: f64,
}

/// Fields contributed by the short-term forecast dataset (first time slot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFields {
    pub description: String,
    pub weather_code: String,
    pub rain_possibility: f64,
    pub comfortability: String,
}

/// Sunrise and sunset for one calendar day, region-local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronomy {
    pub reference_date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

/// One immutable bundle of observation, forecast and astronomy fields.
///
/// The default value is what a controller holds before its first successful
/// refresh cycle: zeroed numbers, empty strings and no astronomy. Whether
/// the numbers are real is decided by the refresh phase, not by the values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Instant the observation is for, in the region's wall clock.
    pub observation_time: NaiveDateTime,
    pub location_name: String,
    /// Degrees Celsius, unrounded.
    pub temperature: f64,
    /// As reported by the source.
    pub wind_speed: f64,
    pub humidity: f64,
    pub description: String,
    /// Opaque icon class code, e.g. `"04"`.
    pub weather_code: String,
    /// Percentage, 0-100, unrounded.
    pub rain_possibility: f64,
    pub comfortability: String,
    /// `None` until an astronomy record has been merged in.
    pub astronomy: Option<Astronomy>,
}
