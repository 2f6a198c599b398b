use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastBuilderError {
    #[error("The CSV file is empty")]
    EmptyFile,

    #[error("The CSV file must contain a header row and at least one data row")]
    TooFewLines,

    #[error("Missing required column(s): {}. Expected a 'billPeriod' (or 'monthly') column and an 'amount' column", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("No processable data found. Check that billPeriod values are formatted as YYYYMM (e.g. 202309) and amounts are numeric")]
    NoProcessableData,

    #[error("Billed amounts for {month} sum beyond the representable range")]
    AmountOverflow { month: String },

    #[error("Unknown segment: {0}")]
    UnknownSegment(String),

    #[error("Not enough history for '{segment}': {available} monthly points available, at least {required} required")]
    InsufficientHistory {
        segment: String,
        available: usize,
        required: usize,
    },

    #[error("Forecasting service rate limit reached, wait a minute and try again: {0}")]
    RateLimited(String),

    #[error("Forecasting service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Forecasting request failed, check the API key and model configuration: {0}")]
    ForecastFailed(String),

    #[error("Invalid forecast settings: {0}")]
    InvalidSettings(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl ForecastBuilderError {
    /// True for errors where waiting and retrying the same request is the
    /// right advice, as opposed to fixing the input or configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ForecastBuilderError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, ForecastBuilderError>;
