use crate::error::fs::FsError;
use crate::error::fs::FsErrorKind::{ReadFileFailed, RemoveFileFailed, WriteFileFailed};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub fn read(path: &Path) -> Result<Vec<u8>, FsError> {
    std::fs::read(path).map_err(|err| FsError::new(ReadFileFailed(path.to_path_buf(), err)))
}

pub fn remove_file(path: &Path) -> Result<(), FsError> {
    std::fs::remove_file(path)
        .map_err(|err| FsError::new(RemoveFileFailed(path.to_path_buf(), err)))
}

/// Creates `path` readable and writable by the owner only.
///
/// Fails if anything, a symlink included, already exists at `path`.
pub fn write_new_owner_only(path: &Path, contents: &[u8]) -> Result<(), FsError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .map_err(|err| FsError::new(WriteFileFailed(path.to_path_buf(), err)))
}
