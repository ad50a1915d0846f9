use thiserror::Error;

/// Errors produced by the labeling / conditioning / resolution core.
///
/// Labeling and pattern errors are fatal for the session; filter and vitals
/// errors are per-operation and callers may continue with other channels.
#[derive(Debug, Error)]
pub enum BciError {
    #[error("invalid board descriptor: {0}")]
    InvalidBoardDescriptor(String),
    #[error("invalid filter parameters: {0}")]
    InvalidFilterParameters(String),
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },
    #[error("vitals unavailable: {0}")]
    VitalsUnavailable(String),
    #[error("duplicate chart group name {0:?}")]
    DuplicateGroup(String),
    #[error("invalid pattern {pattern:?} in group {group:?}: {source}")]
    InvalidPattern {
        group: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("device session failed: {0}")]
    Session(String),
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
    #[error("failed to render chart: {0}")]
    Plot(String),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for BciError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        BciError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for BciError {
    fn from(value: image::ImageError) -> Self {
        BciError::Plot(value.to_string())
    }
}
