use std::fmt;

use anyhow::anyhow;
use serde::Serialize;

/// An administrative region the service publishes data for.
///
/// Forecast and astronomy datasets are keyed by the city name; the
/// observation dataset is keyed by the name of the weather station that
/// represents the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    pub city: &'static str,
    pub station: &'static str,
}

const fn region(city: &'static str, station: &'static str) -> Region {
    Region { city, station }
}

static REGIONS: &[Region] = &[
    region("嘉義縣", "阿里山"),
    region("新北市", "板橋"),
    region("嘉義市", "嘉義"),
    region("新竹縣", "新竹"),
    region("新竹市", "新竹"),
    region("臺北市", "臺北"),
    region("臺南市", "臺南"),
    region("宜蘭縣", "宜蘭"),
    region("苗栗縣", "後龍"),
    region("雲林縣", "古坑"),
    region("花蓮縣", "花蓮"),
    region("臺中市", "臺中"),
    region("臺東縣", "臺東"),
    region("桃園市", "新屋"),
    region("南投縣", "日月潭"),
    region("高雄市", "高雄"),
    region("金門縣", "金門"),
    region("屏東縣", "恆春"),
    region("基隆市", "基隆"),
    region("澎湖縣", "澎湖"),
    region("彰化縣", "彰師大"),
    region("連江縣", "馬祖"),
];

impl Region {
    pub const DEFAULT_CITY: &'static str = "臺北市";

    pub fn all() -> &'static [Region] {
        REGIONS
    }

    /// Look up a region by city name. `台` is accepted in place of `臺`.
    pub fn find(name: &str) -> Option<Region> {
        let normalized = name.trim().replace('台', "臺");
        REGIONS.iter().copied().find(|r| r.city == normalized)
    }

    pub fn parse(name: &str) -> anyhow::Result<Region> {
        Self::find(name).ok_or_else(|| {
            anyhow!(
                "'{name}' is not a valid region.\n\
                 Hint: run `cwb-weather regions` to list supported regions."
            )
        })
    }
}

impl Default for Region {
    fn default() -> Self {
        region(Self::DEFAULT_CITY, "臺北")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.city)
    }
}
