use crate::error::reqwest::WrappedReqwestError;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildTransportError {
    #[error("Invalid endpoint url '{0}'")]
    InvalidEndpoint(String, #[source] url::ParseError),

    #[error("Failed to read CA certificate {0}")]
    ReadCaCertificateFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse CA certificate {0}")]
    ParseCaCertificateFailed(PathBuf, #[source] WrappedReqwestError),

    #[error("Failed to read client certificate or key ({cert}, {key})")]
    ReadClientIdentityFailed {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse client certificate and key ({cert}, {key})")]
    ParseClientIdentityFailed {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: WrappedReqwestError,
    },

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Failed to create http client")]
    CreateHttpClientFailed(#[source] WrappedReqwestError),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error(transparent)]
    Build(#[from] BuildTransportError),

    #[error("Request to {url} failed after {attempts} attempt(s)")]
    RequestFailed {
        url: String,
        attempts: u32,
        #[source]
        source: WrappedReqwestError,
    },

    #[error("Failed to read response body from {url}")]
    ReadBodyFailed {
        url: String,
        #[source]
        source: WrappedReqwestError,
    },

    #[error("status code={status}, body={body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

impl TransportError {
    /// The HTTP status, when the server answered with something other than 200.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
