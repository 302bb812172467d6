//! Core library for the `cwb-weather` card.
//!
//! This crate defines:
//! - Typed clients for the observation, forecast and astronomy datasets
//! - The reducer that merges their results into one [`WeatherSnapshot`]
//! - Day/night resolution and theme selection over a snapshot
//! - The [`RefreshController`] state machine that owns the current snapshot
//! - Configuration & credentials handling
//!
//! It is used by `cwb-cli`, but can also drive any other view layer.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod moment;
pub mod reducer;
pub mod region;
pub mod source;
pub mod theme;

pub use config::Config;
pub use controller::{CwbRefreshController, RefreshController, RefreshOutcome, RefreshPhase, RefreshState};
pub use error::{FetchError, RefreshError, SourceKind};
pub use model::{Astronomy, ForecastFields, ObservationFields, WeatherSnapshot};
pub use moment::Moment;
pub use region::Region;
pub use source::{AstronomyClient, CwbHttp, ForecastClient, ObservationClient, SourceClient};
pub use theme::{Palette, Theme};
