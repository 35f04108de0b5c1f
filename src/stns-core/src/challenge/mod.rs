//! Challenge codes: one live, unconsumed code per identity name.
use crate::error::challenge::ChallengeStoreError;
use crate::error::challenge::ChallengeStoreError::{
    GenerateFailed, InvalidIdentityName, NotFound, Poisoned, PopFailed, StoreFailed,
};
use crate::error::fs::FsError;
use ring::rand::{SecureRandom, SystemRandom};
use slog::{trace, Logger};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const CHALLENGE_CODE_LEN: usize = 16;
const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
// Largest multiple of 62 that fits in a byte; bytes at or above it are redrawn.
const REJECTION_BOUND: u8 = 248;
const FILE_PREFIX: &str = "stns-challenge.";

#[derive(Clone, PartialEq, Eq)]
pub struct ChallengeCode(Vec<u8>);

impl ChallengeCode {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ChallengeCode {
    fn from(bytes: Vec<u8>) -> Self {
        ChallengeCode(bytes)
    }
}

impl AsRef<[u8]> for ChallengeCode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Codes are secrets until consumed; keep them out of logs.
impl fmt::Debug for ChallengeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChallengeCode(<{} bytes>)", self.0.len())
    }
}

/// Draws a uniformly distributed alphanumeric challenge code.
pub fn generate_challenge_code() -> Result<ChallengeCode, ChallengeStoreError> {
    let rng = SystemRandom::new();
    let mut code = Vec::with_capacity(CHALLENGE_CODE_LEN);
    let mut buf = [0u8; CHALLENGE_CODE_LEN];
    while code.len() < CHALLENGE_CODE_LEN {
        rng.fill(&mut buf).map_err(GenerateFailed)?;
        code.extend(
            buf.iter()
                .filter(|b| **b < REJECTION_BOUND)
                .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()])
                .take(CHALLENGE_CODE_LEN - code.len()),
        );
    }
    Ok(ChallengeCode(code))
}

/// Storage policy for challenge codes.
///
/// `store` overwrites any earlier code for the same name; `pop` returns the
/// stored code and removes it, so each code can be consumed once.
pub trait ChallengeStore: Send + Sync {
    fn create(&self) -> Result<ChallengeCode, ChallengeStoreError> {
        generate_challenge_code()
    }

    fn store(&self, identity_name: &str, code: &ChallengeCode) -> Result<(), ChallengeStoreError>;

    fn pop(&self, identity_name: &str) -> Result<ChallengeCode, ChallengeStoreError>;
}

/// Keeps one file per identity in a shared directory (the OS temp dir by default).
///
/// `store` unlinks any existing entry and creates a fresh 0600 file, never
/// following a planted symlink. Two concurrent `store`s for the same name may
/// leave one failing with `StoreFailed`.
pub struct FileChallengeStore {
    logger: Logger,
    dir: PathBuf,
}

impl FileChallengeStore {
    pub fn new(logger: &Logger) -> Self {
        Self::in_dir(logger, std::env::temp_dir())
    }

    pub fn in_dir(logger: &Logger, dir: impl Into<PathBuf>) -> Self {
        FileChallengeStore {
            logger: logger.clone(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn code_path(&self, identity_name: &str) -> Result<PathBuf, ChallengeStoreError> {
        validate_identity_name(identity_name)?;
        Ok(self.dir.join(format!("{FILE_PREFIX}{identity_name}")))
    }
}

impl ChallengeStore for FileChallengeStore {
    fn store(&self, identity_name: &str, code: &ChallengeCode) -> Result<(), ChallengeStoreError> {
        let path = self.code_path(identity_name)?;
        trace!(self.logger, "Storing challenge code at {}", path.display());
        match crate::fs::remove_file(&path) {
            Err(err) if !err.is_not_found() => {
                return Err(StoreFailed(identity_name.to_string(), err))
            }
            _ => {}
        }
        crate::fs::write_new_owner_only(&path, code.as_bytes())
            .map_err(|err| StoreFailed(identity_name.to_string(), err))
    }

    fn pop(&self, identity_name: &str) -> Result<ChallengeCode, ChallengeStoreError> {
        let path = self.code_path(identity_name)?;
        let read = crate::fs::read(&path);
        // Removed whether or not the read succeeded.
        let removed = crate::fs::remove_file(&path);
        take_code(identity_name, read, removed)
    }
}

/// A code only counts as consumed once its file is gone; if another `pop`
/// removed it first, this one gets `NotFound`.
fn take_code(
    identity_name: &str,
    read: Result<Vec<u8>, FsError>,
    removed: Result<(), FsError>,
) -> Result<ChallengeCode, ChallengeStoreError> {
    let bytes = match read {
        Ok(bytes) => bytes,
        Err(err) if err.is_not_found() => return Err(NotFound(identity_name.to_string())),
        Err(err) => return Err(PopFailed(identity_name.to_string(), err)),
    };
    match removed {
        Ok(()) => Ok(ChallengeCode(bytes)),
        Err(err) if err.is_not_found() => Err(NotFound(identity_name.to_string())),
        Err(err) => Err(PopFailed(identity_name.to_string(), err)),
    }
}

fn validate_identity_name(identity_name: &str) -> Result<(), ChallengeStoreError> {
    let valid = !identity_name.is_empty()
        && !identity_name.starts_with('.')
        && identity_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(InvalidIdentityName(identity_name.to_string()))
    }
}

/// In-process store; `pop` is an atomic remove.
#[derive(Default)]
pub struct MemoryChallengeStore {
    codes: Mutex<HashMap<String, ChallengeCode>>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeStore for MemoryChallengeStore {
    fn store(&self, identity_name: &str, code: &ChallengeCode) -> Result<(), ChallengeStoreError> {
        self.codes
            .lock()
            .map_err(|_| Poisoned)?
            .insert(identity_name.to_string(), code.clone());
        Ok(())
    }

    fn pop(&self, identity_name: &str) -> Result<ChallengeCode, ChallengeStoreError> {
        self.codes
            .lock()
            .map_err(|_| Poisoned)?
            .remove(identity_name)
            .ok_or_else(|| NotFound(identity_name.to_string()))
    }
}
