use std::fmt;

/// Classified failures from a window fetch. The refresh loop treats all of
/// them the same way (log, wait, retry the same window), but the class is
/// what lands in the log stream.
#[derive(Debug)]
pub enum FetchError {
    /// Request never completed (DNS, connect, timeout, TLS, body read).
    Transport(reqwest::Error),
    /// Server answered with a non-success status.
    BadStatus(reqwest::StatusCode),
    /// Body arrived but was not the JSON shape we expect.
    Parse(serde_json::Error),
    /// Server answered 2xx but has no coins for this window.
    UnknownWindow { offset: usize },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "transport error: {}", e),
            FetchError::BadStatus(status) => write!(f, "bad status: {}", status),
            FetchError::Parse(e) => write!(f, "parse error: {}", e),
            FetchError::UnknownWindow { offset } => {
                write!(f, "no listings at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err)
    }
}
