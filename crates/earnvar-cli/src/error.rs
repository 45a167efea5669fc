use earnvar_core::{FetchError, PipelineError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] earnvar_core::ValidationError),

    #[error(transparent)]
    Watchlist(#[from] earnvar_core::WatchlistError),

    #[error("no data available: {0}")]
    NoData(String),

    #[error("upstream request failed: {0}")]
    Upstream(FetchError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<PipelineError> for CliError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::CalendarUnavailable { .. } => Self::NoData(error.to_string()),
            PipelineError::Calendar(source) => Self::Upstream(source),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Watchlist(_) => 2,
            Self::NoData(_) => 3,
            Self::Serialization(_) => 4,
            Self::Upstream(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
