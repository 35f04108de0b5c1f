use crate::http::retryable::Retryable;
use thiserror::Error;

// reqwest::Error's fmt::Display appends the error descriptions of all sources.
// For this reason, it is not marked as #[source] here, so that we don't
// display the error descriptions of all sources repeatedly.
#[derive(Error, Debug)]
#[error("{}", .0)]
pub struct WrappedReqwestError(pub reqwest::Error);

impl Retryable for WrappedReqwestError {
    fn is_retryable(&self) -> bool {
        let err = &self.0;
        // Only failures where no HTTP response arrived are transient.
        err.status().is_none() && (err.is_connect() || err.is_timeout() || err.is_request())
    }
}
