use thiserror::Error;

/// Errors encountered while resolving an address.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The service answered with zero candidates. Terminal for this input:
    /// the operator has to correct the address, retrying changes nothing.
    #[error("address not found by the lookup service")]
    NotFound,
    /// The request could not complete: timeout, transport failure or a
    /// non-success status. Retryable.
    #[error("geocoding request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered, but the body was unusable (undecodable JSON,
    /// non-decimal coordinate text, out-of-range coordinates).
    #[error("geocoding response unusable: {0}")]
    Payload(String),
}

impl GeocodeError {
    /// Whether retrying the same address can succeed without correcting it.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GeocodeError::NotFound)
    }
}
