use crate::error::fs::FsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChallengeStoreError {
    #[error("Failed to generate challenge code")]
    GenerateFailed(#[source] ring::error::Unspecified),

    #[error("Identity name '{0}' cannot be used as a challenge key")]
    InvalidIdentityName(String),

    #[error("No challenge code stored for '{0}'")]
    NotFound(String),

    #[error("Failed to store challenge code for '{0}'")]
    StoreFailed(String, #[source] FsError),

    #[error("Failed to read challenge code for '{0}'")]
    PopFailed(String, #[source] FsError),

    #[error("Challenge store lock is poisoned")]
    Poisoned,
}
