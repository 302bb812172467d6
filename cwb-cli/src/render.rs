use cwb_core::{RefreshPhase, RefreshState, Region};

/// Plain-text weather card for the terminal.
pub fn card(region: Region, state: &RefreshState) -> String {
    let s = &state.snapshot;
    let mut out = String::new();

    if state.phase == RefreshPhase::Idle {
        out.push_str(&format!("{region}: no weather data yet\n"));
    } else {
        out.push_str(&format!("{} ({})\n", region.city, s.location_name));
        out.push_str(&format!("{} {}\n", s.description, s.comfortability));
        out.push_str(&format!(
            "{} °C    [{} · {}]\n",
            round(s.temperature),
            state.moment(),
            state.theme()
        ));
        out.push_str(&format!("Wind: {} m/h\n", s.wind_speed));
        out.push_str(&format!("Rain: {} %\n", round(s.rain_possibility)));
        out.push_str(&format!("Last observed: {}", s.observation_time.format("%H:%M")));
        if let Some(astro) = s.astronomy {
            out.push_str(&format!(
                "    Sunrise {} / Sunset {}",
                astro.sunrise.format("%H:%M"),
                astro.sunset.format("%H:%M")
            ));
        }
        out.push('\n');
    }

    if state.is_loading() {
        out.push_str("Refreshing...\n");
    }
    if let Some(err) = &state.last_error {
        out.push_str(&format!("Last refresh failed: {err}\n"));
    }

    out
}

/// Machine-readable view of the state, including the theme palette.
///
/// Keys are snake_case throughout, matching the serialized core types.
pub fn json(region: Region, state: &RefreshState) -> serde_json::Value {
    let theme = state.theme();
    serde_json::json!({
        "region": region,
        "phase": state.phase,
        "cycle": state.cycle,
        "is_loading": state.is_loading(),
        "snapshot": state.snapshot,
        "moment": state.moment(),
        "theme": theme,
        "palette": theme.palette(),
        "last_error": state.last_error.as_ref().map(ToString::to_string),
    })
}

/// Half away from zero, as the card has always displayed it.
fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use cwb_core::{Astronomy, FetchError, RefreshError, SourceKind, WeatherSnapshot};

    fn ready_state() -> RefreshState {
        RefreshState {
            snapshot: WeatherSnapshot {
                observation_time: NaiveDateTime::parse_from_str(
                    "2024-01-01 20:05:00",
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                location_name: "臺北".into(),
                temperature: 18.5,
                wind_speed: 2.4,
                humidity: 0.7,
                description: "多雲".into(),
                weather_code: "04".into(),
                rain_possibility: 33.3,
                comfortability: "舒適".into(),
                astronomy: Some(Astronomy {
                    reference_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    sunrise: NaiveTime::from_hms_opt(6, 39, 0).unwrap(),
                    sunset: NaiveTime::from_hms_opt(17, 19, 0).unwrap(),
                }),
            },
            phase: RefreshPhase::Ready,
            cycle: 1,
            last_error: None,
        }
    }

    #[test]
    fn card_rounds_for_display_only() {
        let text = card(Region::default(), &ready_state());

        assert!(text.contains("19 °C"));
        assert!(text.contains("[night · dark]"));
        assert!(text.contains("Wind: 2.4 m/h"));
        assert!(text.contains("Rain: 33 %"));
        assert!(text.contains("Last observed: 20:05"));
    }

    #[test]
    fn idle_card_has_no_numbers() {
        let text = card(Region::default(), &RefreshState::default());
        assert_eq!(text, "臺北市: no weather data yet\n");
    }

    #[test]
    fn json_carries_theme_palette() {
        let value = json(Region::default(), &ready_state());

        assert_eq!(value["theme"], "dark");
        assert_eq!(value["moment"], "night");
        assert_eq!(value["phase"], "ready");
        assert_eq!(value["palette"]["background_color"], "#1F2022");
        assert_eq!(value["snapshot"]["temperature"], 18.5);
        assert!(value["last_error"].is_null());
    }

    #[test]
    fn json_keys_are_snake_case() {
        fn check(value: &serde_json::Value) {
            if let Some(map) = value.as_object() {
                for (key, child) in map {
                    assert!(!key.chars().any(char::is_uppercase), "camelCase key `{key}`");
                    check(child);
                }
            }
        }

        let mut state = ready_state();
        state.last_error = Some(RefreshError::PartialRefreshFailure {
            failures: vec![FetchError::network(SourceKind::Forecast, "HTTP 503")],
        });
        let value = json(Region::default(), &state);

        check(&value);
        assert_eq!(value["is_loading"], false);
        assert_eq!(value["snapshot"]["observation_time"], "2024-01-01T20:05:00");
        assert!(value["last_error"].as_str().unwrap().contains("forecast request failed"));
    }
}
