use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

/// Day/night classification of a snapshot's observation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moment {
    Day,
    Night,
    /// No astronomy record is available to classify against.
    Unknown,
}

impl Moment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::Day => "day",
            Moment::Night => "night",
            Moment::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the snapshot's observation time against its sunrise/sunset window.
///
/// The window is `[sunrise, sunset]` on the reference date, inclusive at both
/// ends. A sunrise later than the sunset leaves the window empty, so such a
/// record always yields [`Moment::Night`].
pub fn resolve(snapshot: &WeatherSnapshot) -> Moment {
    let Some(astro) = snapshot.astronomy else {
        return Moment::Unknown;
    };

    let sunrise = astro.reference_date.and_time(astro.sunrise);
    let sunset = astro.reference_date.and_time(astro.sunset);
    let observed = snapshot.observation_time;

    if sunrise <= observed && observed <= sunset { Moment::Day } else { Moment::Night }
}
