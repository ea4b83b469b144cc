use std::fmt;

/// Why an image fetch did not produce a displayable image.
///
/// The lazy-load state machine treats every variant the same way; the
/// distinction only exists for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Network(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(reason) => write!(f, "network error: {reason}"),
            FetchError::Status(code) => write!(f, "unexpected status {code}"),
            FetchError::Decode(reason) => write!(f, "image decode failed: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}
