//! Error types for every fallible boundary of the crate.

use thiserror::Error;

/// Reasons a `LandmarkSet` is rejected for the current frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {got}")]
    WrongPointCount { expected: usize, got: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("confidence {0} is not a finite value")]
    InvalidConfidence(f32),
    #[error("hand scale is degenerate ({0})")]
    DegenerateScale(f32),
}

/// Internal failure of a single classifier for a single frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("metric `{0}` is not finite")]
    NonFiniteMetric(&'static str),
}

/// Invalid or unreadable configuration. The only fatal error of the core.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config")]
    Parse(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures while delivering events to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write event line")]
    Io(#[from] std::io::Error),
    #[error("failed to encode event as JSON")]
    Json(#[from] serde_json::Error),
    #[error("event receiver disconnected")]
    Disconnected,
}

/// Failures while reading recorded landmark frames.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read landmark stream")]
    Io(#[from] std::io::Error),
    #[error("malformed frame record on line {line}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of an end-to-end pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError<E: std::error::Error + 'static> {
    #[error("landmark source failed")]
    Source(#[source] E),
    #[error("event sink failed")]
    Sink(#[from] SinkError),
}
