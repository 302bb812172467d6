use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::{FetchError, SourceKind},
    model::ObservationFields,
    region::Region,
};

use super::{CwbHttp, RawValue, SourceClient};

/// Current conditions reported by automatic weather stations.
const DATASET: &str = "O-A0003-001";

const KIND: SourceKind = SourceKind::Observation;

#[derive(Debug, Clone)]
pub struct ObservationClient {
    http: CwbHttp,
}

impl ObservationClient {
    pub fn new(http: CwbHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SourceClient for ObservationClient {
    type Fields = ObservationFields;

    fn kind(&self) -> SourceKind {
        KIND
    }

    #[instrument(skip(self, region), fields(station = region.station))]
    async fn fetch(&self, region: &Region) -> Result<ObservationFields, FetchError> {
        let envelope: ObsEnvelope =
            self.http.get_json(KIND, DATASET, &[("locationName", region.station)]).await?;
        parse(envelope)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObsEnvelope {
    records: ObsRecords,
}

#[derive(Debug, Deserialize)]
struct ObsRecords {
    location: Vec<ObsLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsLocation {
    location_name: String,
    time: ObsTime,
    weather_element: Vec<ObsElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsTime {
    obs_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObsElement {
    element_name: String,
    element_value: RawValue,
}

pub(crate) fn parse(envelope: ObsEnvelope) -> Result<ObservationFields, FetchError> {
    let location = envelope
        .records
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::malformed(KIND, "response contained no station record"))?;

    if location.location_name.trim().is_empty() {
        return Err(FetchError::malformed(KIND, "station record has an empty locationName"));
    }

    let element = |name: &str| -> Result<f64, FetchError> {
        location
            .weather_element
            .iter()
            .find(|e| e.element_name == name)
            .ok_or_else(|| FetchError::malformed(KIND, format!("missing element `{name}`")))?
            .element_value
            .as_f64(KIND, name)
    };

    Ok(ObservationFields {
        observation_time: parse_observation_time(&location.time.obs_time)?,
        temperature: element("TEMP")?,
        wind_speed: element("WDSD")?,
        humidity: element("HUMD")?,
        location_name: location.location_name,
    })
}

/// Parse the station's wall-clock observation time.
fn parse_observation_time(s: &str) -> Result<NaiveDateTime, FetchError> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    // Newer payloads carry an offset; keep the local wall clock it describes.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    Err(FetchError::malformed(KIND, format!("unrecognized obsTime {s:?}")))
}
