use thiserror::Error;

/// Errors raised while validating, persisting, or reading feedback.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The submission is missing data or carries a value we refuse to store
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    /// The employee table could not be loaded
    #[error("employee directory: {0}")]
    Directory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A stored record could not be read back; aborts the whole listing
    #[error("stored record {filename} is unreadable: {source}")]
    CorruptRecord {
        filename: String,
        #[source]
        source: Box<FeedbackError>,
    },
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
