use std::fmt;

use thiserror::Error;

/// Which of the three remote datasets an error or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Observation,
    Forecast,
    Astronomy,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Observation => "observation",
            SourceKind::Forecast => "forecast",
            SourceKind::Astronomy => "astronomy",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single source fetch.
///
/// Messages are captured as strings so the error can be cloned into the
/// published refresh state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or non-success HTTP status.
    #[error("{source_kind} request failed: {message}")]
    Network { source_kind: SourceKind, message: String },

    /// The response arrived but lacked the fields this client consumes.
    #[error("{source_kind} response is malformed: {reason}")]
    MalformedResponse { source_kind: SourceKind, reason: String },
}

impl FetchError {
    pub fn network(source_kind: SourceKind, message: impl Into<String>) -> Self {
        FetchError::Network { source_kind, message: message.into() }
    }

    pub fn malformed(source_kind: SourceKind, reason: impl Into<String>) -> Self {
        FetchError::MalformedResponse { source_kind, reason: reason.into() }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            FetchError::Network { source_kind, .. }
            | FetchError::MalformedResponse { source_kind, .. } => *source_kind,
        }
    }
}

/// Failure of a whole refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// One or more sources failed; the cycle was aborted and nothing was published.
    #[error("refresh aborted, {} of 3 sources failed: {}", .failures.len(), summarize(.failures))]
    PartialRefreshFailure { failures: Vec<FetchError> },
}

impl RefreshError {
    pub fn failures(&self) -> &[FetchError] {
        match self {
            RefreshError::PartialRefreshFailure { failures } => failures,
        }
    }

    pub fn failed_sources(&self) -> Vec<SourceKind> {
        self.failures().iter().map(FetchError::source_kind).collect()
    }
}

fn summarize(failures: &[FetchError]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display_names_the_source() {
        let err = FetchError::malformed(SourceKind::Forecast, "missing element `Wx`");
        assert_eq!(err.to_string(), "forecast response is malformed: missing element `Wx`");
        assert_eq!(err.source_kind(), SourceKind::Forecast);
    }

    #[test]
    fn partial_failure_lists_every_failed_source() {
        let err = RefreshError::PartialRefreshFailure {
            failures: vec![
                FetchError::network(SourceKind::Observation, "HTTP 503"),
                FetchError::malformed(SourceKind::Astronomy, "no record for 2024-01-01"),
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 of 3 sources failed"));
        assert!(msg.contains("observation request failed: HTTP 503"));
        assert!(msg.contains("astronomy response is malformed"));
        assert_eq!(err.failed_sources(), vec![SourceKind::Observation, SourceKind::Astronomy]);
    }
}
