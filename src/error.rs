use thiserror::Error;

/// Why an outbound contact submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("server rejected submission with status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("submission timed out after {0} ms")]
    Timeout(u32),
    #[error("could not encode form payload: {0}")]
    Encode(String),
}
