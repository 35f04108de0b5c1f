use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsErrorKind {
    #[error("Failed to read {0}")]
    ReadFileFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to remove file {0}")]
    RemoveFileFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to write to {0}")]
    WriteFileFailed(PathBuf, #[source] std::io::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FsError(pub Box<FsErrorKind>);

impl FsError {
    pub fn new(kind: FsErrorKind) -> Self {
        FsError(Box::new(kind))
    }

    /// The underlying I/O error, whichever operation failed.
    pub fn io_error(&self) -> &std::io::Error {
        match self.0.as_ref() {
            FsErrorKind::ReadFileFailed(_, err)
            | FsErrorKind::RemoveFileFailed(_, err)
            | FsErrorKind::WriteFileFailed(_, err) => err,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.io_error().kind() == std::io::ErrorKind::NotFound
    }
}

impl<E> From<E> for FsError
where
    FsErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        FsError(Box::new(FsErrorKind::from(err)))
    }
}
