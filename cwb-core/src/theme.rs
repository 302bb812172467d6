use std::fmt;

use serde::{Deserialize, Serialize};

use crate::moment::Moment;

/// Display theme token handed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// Colour tokens of a theme, as CSS values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background_color: &'static str,
    pub foreground_color: &'static str,
    pub box_shadow: &'static str,
    pub title_color: &'static str,
    pub temperature_color: &'static str,
    pub text_color: &'static str,
}

const LIGHT: Palette = Palette {
    background_color: "#ededed",
    foreground_color: "#f9f9f9",
    box_shadow: "0 1px 3px 0 #999999",
    title_color: "#212121",
    temperature_color: "#757575",
    text_color: "#828282",
};

const DARK: Palette = Palette {
    background_color: "#1F2022",
    foreground_color: "#121416",
    box_shadow: "0 1px 4px 0 rgba(12, 12, 13, 0.2), 0 0 0 1px rgba(0, 0, 0, 0.15)",
    title_color: "#f9f9fa",
    temperature_color: "#dddddd",
    text_color: "#cccccc",
};

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(&self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Night is dark; day and unknown are both light.
pub fn select(moment: Moment) -> Theme {
    match moment {
        Moment::Night => Theme::Dark,
        Moment::Day | Moment::Unknown => Theme::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moment_to_theme() {
        assert_eq!(select(Moment::Night), Theme::Dark);
        assert_eq!(select(Moment::Day), Theme::Light);
        assert_eq!(select(Moment::Unknown), Theme::Light);
    }

    #[test]
    fn palettes_differ() {
        assert_eq!(Theme::Light.palette().background_color, "#ededed");
        assert_eq!(Theme::Dark.palette().text_color, "#cccccc");
        assert_ne!(Theme::Light.palette(), Theme::Dark.palette());
    }
}
