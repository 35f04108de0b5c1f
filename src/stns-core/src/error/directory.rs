use crate::error::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to request {0}")]
    RequestFailed(&'static str, #[source] TransportError),

    #[error("Failed to decode {0} response")]
    DecodeFailed(&'static str, #[source] serde_json::Error),

    #[error("No {resource} found for query '{query}'")]
    NotFound {
        resource: &'static str,
        query: String,
    },
}
