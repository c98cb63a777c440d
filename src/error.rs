//! Error taxonomy of the engine.
//!
//! The core recovers from nothing: every failure is surfaced to the driver,
//! which prints and exits. The only defensive behavior in hot paths is the
//! empty-frontier check that terminates the main loops normally.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure kinds the engine can surface.
#[derive(Debug)]
pub enum Error {
    /// Malformed input: bad file contents, header mismatch, out-of-range
    /// source vertex. Non-retriable.
    InvalidInput(String),
    /// An operation was invoked on a driver whose `init` has not run.
    NotInitialized(&'static str),
    /// Device allocation failed.
    ResourceExhaustion {
        /// Number of bytes the failed allocation asked for.
        bytes: usize,
    },
    /// Kernel submission or completion error.
    DeviceFailure(String),
    /// A load-balancer/frontier-view combination with no implementation.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NotInitialized(what) => write!(f, "{what} has not been initialized"),
            Self::ResourceExhaustion { bytes } => {
                write!(f, "device allocation of {bytes} bytes failed")
            }
            Self::DeviceFailure(msg) => write!(f, "device failure: {msg}"),
            Self::Unsupported(what) => write!(f, "unsupported operation: {what}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::InvalidInput(format!("i/o error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = Error::InvalidInput("row offsets are not monotone".into());
        assert!(err.to_string().contains("not monotone"));

        let err = Error::ResourceExhaustion { bytes: 1024 };
        assert!(err.to_string().contains("1024"));
    }
}
