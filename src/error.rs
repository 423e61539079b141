use thiserror::Error;

/// Errors surfaced by a single chart-generation call.
///
/// Coercion failures, sort fallbacks and empty split segments are not errors:
/// they are logged and reported through
/// [`NormalizeReport`](crate::data::normalize::NormalizeReport).
#[derive(Debug, Error)]
pub enum ChartError {
    /// Wrong column count, a missing required role or an unusable column.
    #[error("input shape error: {0}")]
    InputShape(String),

    /// Cleaning left no data columns next to the identifier column.
    #[error("no usable data columns remain after cleaning")]
    NoDataColumns,

    /// A configuration value outside its accepted range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The render backend could not produce an image.
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChartError {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        ChartError::InputShape(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
