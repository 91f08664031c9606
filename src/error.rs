use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Insufficient data for {0}: no usable observations in window")]
    InsufficientData(String),

    #[error("Insufficient time span for {0}: start and end both resolve to {1}")]
    InvalidTimeSpan(String, i64),

    #[error("Invalid series value for {0}: {1} is not positive at year {2}")]
    InvalidSeriesValue(String, String, i64),

    #[error("Validation: {0}")]
    Validation(String),
}

impl GrowthError {
    /// Errors that abort one country's computation but never the run.
    pub fn is_country_local(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData(_) | Self::InvalidTimeSpan(..) | Self::InvalidSeriesValue(..)
        )
    }
}
