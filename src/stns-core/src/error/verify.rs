use crate::error::directory::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Failed to look up public keys for '{0}'")]
    LookupKeysFailed(String, #[source] DirectoryError),

    #[error("Malformed signature")]
    MalformedSignature(#[source] serde_json::Error),

    #[error("Unsupported signature format '{0}'")]
    UnsupportedSignature(String, #[source] ssh_key::Error),

    #[error("can't read public key '{0}'")]
    MalformedPublicKey(String, #[source] ssh_key::Error),

    #[error("verify failed")]
    NoMatchingKey,
}
