use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::{FetchError, SourceKind},
    model::Astronomy,
    region::Region,
};

use super::{CwbHttp, SourceClient};

/// Daily sunrise/sunset almanac per county/city.
const DATASET: &str = "A-B0062-001";

const KIND: SourceKind = SourceKind::Astronomy;

const SUNRISE: &str = "日出時刻";
const SUNSET: &str = "日沒時刻";

#[derive(Debug, Clone)]
pub struct AstronomyClient {
    http: CwbHttp,
    offset: FixedOffset,
    fixed_date: Option<NaiveDate>,
}

impl AstronomyClient {
    /// `offset` is the region's UTC offset; it decides which calendar day is requested.
    pub fn new(http: CwbHttp, offset: FixedOffset) -> Self {
        Self { http, offset, fixed_date: None }
    }

    /// Always request `date` instead of the current day.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    /// The calendar day requested by the next fetch.
    pub fn request_date(&self) -> NaiveDate {
        self.fixed_date
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset).date_naive())
    }
}

#[async_trait]
impl SourceClient for AstronomyClient {
    type Fields = Astronomy;

    fn kind(&self) -> SourceKind {
        KIND
    }

    #[instrument(skip(self, region), fields(city = region.city))]
    async fn fetch(&self, region: &Region) -> Result<Astronomy, FetchError> {
        let date = self.request_date();
        let data_time = date.format("%Y-%m-%d").to_string();

        let envelope: AstroEnvelope = self
            .http
            .get_json(KIND, DATASET, &[("locationName", region.city), ("dataTime", data_time.as_str())])
            .await?;
        parse(envelope, date)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AstroEnvelope {
    records: AstroRecords,
}

#[derive(Debug, Deserialize)]
struct AstroRecords {
    locations: AstroLocations,
}

#[derive(Debug, Deserialize)]
struct AstroLocations {
    location: Vec<AstroLocation>,
}

#[derive(Debug, Deserialize)]
struct AstroLocation {
    time: Vec<AstroDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AstroDay {
    data_time: String,
    parameter: Vec<AstroParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AstroParameter {
    parameter_name: String,
    parameter_value: String,
}

pub(crate) fn parse(envelope: AstroEnvelope, date: NaiveDate) -> Result<Astronomy, FetchError> {
    let location = envelope
        .records
        .locations
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::malformed(KIND, "response contained no region record"))?;

    // The almanac is published ahead of time but may not cover today yet.
    let day = location
        .time
        .iter()
        .find(|d| NaiveDate::parse_from_str(d.data_time.trim(), "%Y-%m-%d") == Ok(date))
        .ok_or_else(|| FetchError::malformed(KIND, format!("no record for {date}")))?;

    let time_of = |name: &str| -> Result<NaiveTime, FetchError> {
        let raw = day
            .parameter
            .iter()
            .find(|p| p.parameter_name == name)
            .map(|p| p.parameter_value.trim())
            .ok_or_else(|| FetchError::malformed(KIND, format!("missing parameter `{name}`")))?;

        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| FetchError::malformed(KIND, format!("`{name}` is not a time: {raw:?}")))
    };

    Ok(Astronomy { reference_date: date, sunrise: time_of(SUNRISE)?, sunset: time_of(SUNSET)? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn envelope(value: serde_json::Value) -> AstroEnvelope {
        serde_json::from_value(value).expect("fixture should match envelope shape")
    }

    fn fixture(data_time: &str) -> serde_json::Value {
        json!({
            "success": "true",
            "records": {
                "dataid": "A-B0062-001",
                "locations": {
                    "location": [{
                        "locationName": "臺北市",
                        "time": [{
                            "dataTime": data_time,
                            "parameter": [
                                { "parameterName": "民用曙光始", "parameterValue": "06:13" },
                                { "parameterName": "日出時刻", "parameterValue": "06:39" },
                                { "parameterName": "過中天", "parameterValue": "11:59" },
                                { "parameterName": "日沒時刻", "parameterValue": "17:19" },
                                { "parameterName": "民用暮光終", "parameterValue": "17:45" }
                            ]
                        }]
                    }]
                }
            }
        })
    }

    #[test]
    fn extracts_sunrise_and_sunset() {
        let astro = parse(envelope(fixture("2024-01-01")), date("2024-01-01")).unwrap();

        assert_eq!(astro.reference_date, date("2024-01-01"));
        assert_eq!(astro.sunrise, NaiveTime::from_hms_opt(6, 39, 0).unwrap());
        assert_eq!(astro.sunset, NaiveTime::from_hms_opt(17, 19, 0).unwrap());
    }

    #[test]
    fn date_not_yet_published_is_malformed() {
        let err = parse(envelope(fixture("2023-12-31")), date("2024-01-01")).unwrap_err();
        assert_eq!(err, FetchError::malformed(KIND, "no record for 2024-01-01"));
    }

    #[test]
    fn empty_time_list_is_malformed() {
        let mut value = fixture("2024-01-01");
        value["records"]["locations"]["location"][0]["time"] = json!([]);
        assert!(parse(envelope(value), date("2024-01-01")).is_err());
    }

    #[test]
    fn missing_sunset_is_malformed() {
        let mut value = fixture("2024-01-01");
        value["records"]["locations"]["location"][0]["time"][0]["parameter"]
            .as_array_mut()
            .unwrap()
            .retain(|p| p["parameterName"] != SUNSET);

        let err = parse(envelope(value), date("2024-01-01")).unwrap_err();
        assert!(err.to_string().contains("missing parameter `日沒時刻`"));
    }

    #[test]
    fn fixed_date_overrides_clock() {
        let http = CwbHttp::with_client(reqwest::Client::new(), "http://localhost", "KEY");
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let client = AstronomyClient::new(http, offset).with_fixed_date(date("2024-06-21"));
        assert_eq!(client.request_date(), date("2024-06-21"));
    }
}
