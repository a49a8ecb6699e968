//! Error types for ChidraNav

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ChidraNav error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read, parsed or validated
    #[error("Configuration error: {0}")]
    Config(String),

    /// A hardware call did not complete within its timeout
    #[error("Hardware call timed out after {0} ms")]
    Timeout(u64),

    /// Device answered with something that is not a distance
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// Actuator or sensor reported a fault
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Device is no longer reachable
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// Device type in config is not known
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),
}

impl Error {
    /// Whether retrying the same call may succeed.
    ///
    /// Timeouts and garbled replies are transient. Faults and disconnects are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::InvalidReading(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
