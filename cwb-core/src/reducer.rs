use crate::model::{Astronomy, ForecastFields, ObservationFields, WeatherSnapshot};

/// Combine the three per-source results of one refresh cycle into a snapshot.
///
/// The sources contribute disjoint fields, so there is nothing to reconcile.
/// Callers only invoke this once all three fetches have succeeded.
pub fn merge(
    observation: ObservationFields,
    forecast: ForecastFields,
    astronomy: Astronomy,
) -> WeatherSnapshot {
    let ObservationFields { observation_time, location_name, temperature, wind_speed, humidity } =
        observation;
    let ForecastFields { description, weather_code, rain_possibility, comfortability } = forecast;

    WeatherSnapshot {
        observation_time,
        location_name,
        temperature,
        wind_speed,
        humidity,
        description,
        weather_code,
        rain_possibility,
        comfortability,
        astronomy: Some(astronomy),
    }
}
