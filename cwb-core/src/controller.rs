//! Refresh state machine.
//!
//! A [`RefreshController`] is the single writer of one [`RefreshState`]. Each
//! call to [`RefreshController::refresh`] runs at most one refresh cycle:
//! the three sources are fetched concurrently, joined, and either merged and
//! published as a whole or discarded as a whole. Calls that arrive while a
//! cycle is in flight are skipped.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{FetchError, RefreshError},
    model::{Astronomy, ForecastFields, ObservationFields, WeatherSnapshot},
    moment::{self, Moment},
    reducer,
    region::Region,
    source::{AstronomyClient, CwbHttp, ForecastClient, ObservationClient, SourceClient},
    theme::{self, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    /// No cycle has completed yet; the snapshot is the default value.
    Idle,
    /// A cycle is in flight.
    Refreshing,
    /// The last cycle published a new snapshot.
    Ready,
    /// The last cycle was aborted; the snapshot is from an earlier cycle (or default).
    Failed,
}

/// Everything an observer may read, published atomically as one value.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState {
    pub snapshot: WeatherSnapshot,
    pub phase: RefreshPhase,
    /// Number of completed cycles, successful or not.
    pub cycle: u64,
    /// Why the most recent cycle failed, if it did.
    pub last_error: Option<RefreshError>,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            snapshot: WeatherSnapshot::default(),
            phase: RefreshPhase::Idle,
            cycle: 0,
            last_error: None,
        }
    }
}

impl RefreshState {
    pub fn is_loading(&self) -> bool {
        self.phase == RefreshPhase::Refreshing
    }

    pub fn moment(&self) -> Moment {
        moment::resolve(&self.snapshot)
    }

    pub fn theme(&self) -> Theme {
        theme::select(self.moment())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle completed and its snapshot is now current.
    Published { cycle: u64 },
    /// Another cycle was already in flight; nothing was done.
    Skipped,
}

#[derive(Debug)]
pub struct RefreshController<O, F, A> {
    region: Region,
    observation: O,
    forecast: F,
    astronomy: A,
    state: watch::Sender<RefreshState>,
}

/// Controller wired to the live datastore clients.
pub type CwbRefreshController = RefreshController<ObservationClient, ForecastClient, AstronomyClient>;

impl CwbRefreshController {
    /// Build all three clients from `config`, sharing one HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = CwbHttp::from_config(config)?;
        let region = config.region()?;

        Ok(Self::new(
            region,
            ObservationClient::new(http.clone()),
            ForecastClient::new(http.clone()),
            AstronomyClient::new(http, config.utc_offset()?),
        ))
    }
}

impl<O, F, A> RefreshController<O, F, A>
where
    O: SourceClient<Fields = ObservationFields>,
    F: SourceClient<Fields = ForecastFields>,
    A: SourceClient<Fields = Astronomy>,
{
    pub fn new(region: Region, observation: O, forecast: F, astronomy: A) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self { region, observation, forecast, astronomy, state }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// A copy of the current state.
    pub fn state(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn moment(&self) -> Moment {
        self.state.borrow().moment()
    }

    pub fn theme(&self) -> Theme {
        self.state.borrow().theme()
    }

    /// Receive every state transition as it is published.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.subscribe()
    }

    /// Run one refresh cycle unless one is already in flight.
    ///
    /// On failure the previous snapshot stays current and the error is both
    /// returned and recorded in [`RefreshState::last_error`].
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let Some(in_flight) = InFlight::start(&self.state) else {
            debug!(region = %self.region, "Refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        debug!(
            region = %self.region,
            sources = ?[self.observation.kind(), self.forecast.kind(), self.astronomy.kind()],
            "Refresh cycle started"
        );

        match self.fetch_all().await {
            Ok(snapshot) => {
                let cycle = in_flight.finish(|s| {
                    s.snapshot = snapshot;
                    s.phase = RefreshPhase::Ready;
                    s.last_error = None;
                });
                info!(region = %self.region, cycle, "Published weather snapshot");
                Ok(RefreshOutcome::Published { cycle })
            }
            Err(err) => {
                for failure in err.failures() {
                    warn!(region = %self.region, source = %failure.source_kind(), error = %failure, "Source fetch failed");
                }
                let recorded = err.clone();
                let cycle = in_flight.finish(|s| {
                    s.phase = RefreshPhase::Failed;
                    s.last_error = Some(recorded);
                });
                warn!(region = %self.region, cycle, "Refresh cycle aborted, keeping previous snapshot");
                Err(err)
            }
        }
    }

    /// Fetch all three sources concurrently and wait for every one to settle.
    async fn fetch_all(&self) -> Result<WeatherSnapshot, RefreshError> {
        let (observation, forecast, astronomy) = tokio::join!(
            self.observation.fetch(&self.region),
            self.forecast.fetch(&self.region),
            self.astronomy.fetch(&self.region),
        );

        all_or_nothing(observation, forecast, astronomy)
    }
}

/// Merge only when every source succeeded; otherwise report every failure.
pub fn all_or_nothing(
    observation: Result<ObservationFields, FetchError>,
    forecast: Result<ForecastFields, FetchError>,
    astronomy: Result<Astronomy, FetchError>,
) -> Result<WeatherSnapshot, RefreshError> {
    match (observation, forecast, astronomy) {
        (Ok(o), Ok(f), Ok(a)) => Ok(reducer::merge(o, f, a)),
        (o, f, a) => {
            let failures = [o.err(), f.err(), a.err()].into_iter().flatten().collect();
            Err(RefreshError::PartialRefreshFailure { failures })
        }
    }
}

/// Marks a cycle as in flight; restores the prior phase if dropped unfinished.
struct InFlight<'a> {
    state: &'a watch::Sender<RefreshState>,
    prior: RefreshPhase,
    finished: bool,
}

impl<'a> InFlight<'a> {
    /// Atomically move to `Refreshing`, or return `None` if already there.
    fn start(state: &'a watch::Sender<RefreshState>) -> Option<Self> {
        let mut prior = RefreshPhase::Idle;
        let started = state.send_if_modified(|s| {
            if s.is_loading() {
                return false;
            }
            prior = s.phase;
            s.phase = RefreshPhase::Refreshing;
            true
        });

        if started { Some(Self { state, prior, finished: false }) } else { None }
    }

    /// Apply the cycle's result and bump the cycle counter in one publish.
    fn finish(mut self, apply: impl FnOnce(&mut RefreshState)) -> u64 {
        self.finished = true;
        let mut cycle = 0;
        self.state.send_modify(|s| {
            apply(s);
            s.cycle += 1;
            cycle = s.cycle;
        });
        cycle
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let prior = self.prior;
            self.state.send_modify(|s| s.phase = prior);
        }
    }
}
