use thiserror::Error;

/// Errors that can occur when reading or writing the orientation file.
#[derive(Error, Debug)]
pub enum OrientationError {
    #[error("no config directory available for the orientation file")]
    NoConfigDir,
    #[error("failed to access orientation file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse orientation file: {0}")]
    Parse(#[from] ron::de::SpannedError),
    #[error("failed to serialize orientations: {0}")]
    Serialize(#[from] ron::Error),
}

/// Errors returned by the dashboard backend client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },
}
