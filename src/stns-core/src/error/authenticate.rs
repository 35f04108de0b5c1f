use crate::error::challenge::ChallengeStoreError;
use crate::error::verify::VerifyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthenticateError {
    #[error("Signature verification failed for '{0}'")]
    VerifyFailed(String, #[source] VerifyError),

    #[error("Failed to retrieve challenge code for '{0}'")]
    ChallengeUnavailable(String, #[source] ChallengeStoreError),

    #[error("Presented challenge code does not match the one issued to '{0}'")]
    ChallengeMismatch(String),
}
