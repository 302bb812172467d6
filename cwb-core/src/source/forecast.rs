use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::{FetchError, SourceKind},
    model::ForecastFields,
    region::Region,
};

use super::{CwbHttp, RawValue, SourceClient};

/// 36-hour forecast per county/city.
const DATASET: &str = "F-C0032-001";

const KIND: SourceKind = SourceKind::Forecast;

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: CwbHttp,
}

impl ForecastClient {
    pub fn new(http: CwbHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SourceClient for ForecastClient {
    type Fields = ForecastFields;

    fn kind(&self) -> SourceKind {
        KIND
    }

    #[instrument(skip(self, region), fields(city = region.city))]
    async fn fetch(&self, region: &Region) -> Result<ForecastFields, FetchError> {
        let envelope: FcEnvelope =
            self.http.get_json(KIND, DATASET, &[("locationName", region.city)]).await?;
        parse(envelope)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FcEnvelope {
    records: FcRecords,
}

#[derive(Debug, Deserialize)]
struct FcRecords {
    location: Vec<FcLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcLocation {
    weather_element: Vec<FcElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcElement {
    element_name: String,
    time: Vec<FcSlot>,
}

#[derive(Debug, Deserialize)]
struct FcSlot {
    parameter: FcParameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcParameter {
    parameter_name: RawValue,
    #[serde(default)]
    parameter_value: Option<RawValue>,
}

pub(crate) fn parse(envelope: FcEnvelope) -> Result<ForecastFields, FetchError> {
    let location = envelope
        .records
        .location
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::malformed(KIND, "response contained no region record"))?;

    let wx = first_slot(&location, "Wx")?;
    let pop = first_slot(&location, "PoP")?;
    let ci = first_slot(&location, "CI")?;

    let description = wx.parameter_name.as_text();
    if description.trim().is_empty() {
        return Err(FetchError::malformed(KIND, "element `Wx` has an empty description"));
    }

    let weather_code = wx
        .parameter_value
        .as_ref()
        .map(RawValue::as_text)
        .ok_or_else(|| FetchError::malformed(KIND, "element `Wx` has no weather code"))?;

    Ok(ForecastFields {
        description,
        weather_code,
        rain_possibility: pop.parameter_name.as_f64(KIND, "PoP")?,
        comfortability: ci.parameter_name.as_text(),
    })
}

/// Only the first (nearest) time slot of each element is used.
fn first_slot<'a>(location: &'a FcLocation, name: &str) -> Result<&'a FcParameter, FetchError> {
    let element = location
        .weather_element
        .iter()
        .find(|e| e.element_name == name)
        .ok_or_else(|| FetchError::malformed(KIND, format!("missing element `{name}`")))?;

    element
        .time
        .first()
        .map(|slot| &slot.parameter)
        .ok_or_else(|| FetchError::malformed(KIND, format!("element `{name}` has no time slots")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> FcEnvelope {
        serde_json::from_value(value).expect("fixture should match envelope shape")
    }

    fn slot(parameter: serde_json::Value) -> serde_json::Value {
        json!({
            "startTime": "2024-01-01 12:00:00",
            "endTime": "2024-01-01 18:00:00",
            "parameter": parameter
        })
    }

    fn fixture() -> serde_json::Value {
        json!({
            "success": "true",
            "records": {
                "datasetDescription": "三十六小時天氣預報",
                "location": [{
                    "locationName": "臺北市",
                    "weatherElement": [
                        { "elementName": "Wx", "time": [
                            slot(json!({ "parameterName": "多雲時晴", "parameterValue": "3" })),
                            slot(json!({ "parameterName": "晴時多雲", "parameterValue": "2" }))
                        ]},
                        { "elementName": "PoP", "time": [
                            slot(json!({ "parameterName": "20", "parameterUnit": "百分比" }))
                        ]},
                        { "elementName": "MinT", "time": [
                            slot(json!({ "parameterName": "16", "parameterUnit": "C" }))
                        ]},
                        { "elementName": "CI", "time": [
                            slot(json!({ "parameterName": "稍有寒意至舒適" }))
                        ]}
                    ]
                }]
            }
        })
    }

    #[test]
    fn extracts_first_time_slot() {
        let fields = parse(envelope(fixture())).unwrap();

        assert_eq!(fields.description, "多雲時晴");
        assert_eq!(fields.weather_code, "3");
        assert_eq!(fields.rain_possibility, 20.0);
        assert_eq!(fields.comfortability, "稍有寒意至舒適");
    }

    #[test]
    fn missing_wx_is_malformed() {
        let mut value = fixture();
        value["records"]["location"][0]["weatherElement"]
            .as_array_mut()
            .unwrap()
            .retain(|e| e["elementName"] != "Wx");

        let err = parse(envelope(value)).unwrap_err();
        assert_eq!(err, FetchError::malformed(KIND, "missing element `Wx`"));
    }

    #[test]
    fn element_without_slots_is_malformed() {
        let mut value = fixture();
        value["records"]["location"][0]["weatherElement"][3]["time"] = json!([]);

        let err = parse(envelope(value)).unwrap_err();
        assert!(err.to_string().contains("`CI` has no time slots"));
    }

    #[test]
    fn wx_without_code_is_malformed() {
        let mut value = fixture();
        value["records"]["location"][0]["weatherElement"][0]["time"][0]["parameter"] =
            json!({ "parameterName": "多雲時晴" });

        assert!(parse(envelope(value)).is_err());
    }

    #[test]
    fn numeric_pop_is_accepted() {
        let mut value = fixture();
        value["records"]["location"][0]["weatherElement"][1]["time"][0]["parameter"] =
            json!({ "parameterName": 33.3 });

        assert_eq!(parse(envelope(value)).unwrap().rain_possibility, 33.3);
    }
}
