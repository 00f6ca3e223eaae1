use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid TLE: {0}")]
    Tle(String),
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Requested time is {days:.1} days from the TLE epoch, beyond the {max_days} day propagation window")]
    OutsidePropagationWindow { days: f64, max_days: f64 },
    #[error("No pass above {min_elevation} deg within {window_hours} hours")]
    NoPass { min_elevation: f64, window_hours: i64 },
    #[cfg(feature = "web")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
