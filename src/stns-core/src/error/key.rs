use crate::error::foundation::GetUserHomeError;
use crate::error::fs::FsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadPrivateKeyError {
    #[error("Failed to expand home directory in private key path {0}")]
    ExpandHomeFailed(PathBuf, #[source] GetUserHomeError),

    #[error("Failed to read private key path:{0}")]
    ReadKeyFileFailed(PathBuf, #[source] FsError),

    #[error("Failed to parse private key {0}")]
    ParseKeyFailed(PathBuf, #[source] ssh_key::Error),

    #[error("Private key {0} is encrypted but no passphrase is configured")]
    PassphraseRequired(PathBuf),

    #[error("Private key {0} is not encrypted but a passphrase is configured")]
    NotEncrypted(PathBuf),

    #[error("Failed to decrypt private key {0} (passphrase mismatch?)")]
    DecryptKeyFailed(PathBuf, #[source] ssh_key::Error),
}

#[derive(Error, Debug)]
pub enum RsaKeyError {
    #[error("RSA key component '{0}' is not a positive integer")]
    InvalidComponent(&'static str),

    #[error("Invalid RSA key")]
    BuildKeyFailed(#[source] rsa::Error),
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error(transparent)]
    LoadPrivateKey(#[from] LoadPrivateKeyError),

    #[error("Failed to prepare RSA key for signing")]
    InvalidRsaKey(#[from] RsaKeyError),

    #[error("Failed to sign payload")]
    SignFailed(#[source] signature::Error),

    #[error("Failed to serialize signature")]
    SerializeSignatureFailed(#[source] serde_json::Error),
}
