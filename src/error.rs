/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// The request to the local service could not be completed
    Transport { endpoint: String, message: String },
    /// The local service answered with a non-success status
    Status { endpoint: String, status: u16 },
    /// The response body was not the expected JSON
    Decode { endpoint: String, message: String },
    Config(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::Transport { endpoint, message } => {
                write!(f, "request to {} failed: {}", endpoint, message)
            }
            Error::Status { endpoint, status } => match status {
                401 | 403 => write!(f, "{} rejected the credentials (HTTP {})", endpoint, status),
                _ => write!(f, "{} returned HTTP {}", endpoint, status),
            },
            Error::Decode { endpoint, message } => {
                write!(f, "could not decode response from {}: {}", endpoint, message)
            }
            Error::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON error: {}", err))
    }
}
