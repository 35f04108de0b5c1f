use crate::auth::pkcs1::{self, RsaHash};
use crate::auth::signature::WireSignature;
use crate::config::Options;
use crate::error::key::LoadPrivateKeyError::{
    DecryptKeyFailed, ExpandHomeFailed, NotEncrypted, ParseKeyFailed, PassphraseRequired,
    ReadKeyFileFailed,
};
use crate::error::key::{LoadPrivateKeyError, SignError};
use crate::foundation::expand_home;
use slog::{debug, Logger};
use ssh_key::PrivateKey;
use std::path::{Path, PathBuf};

/// Signs payloads with a private key loaded from disk on each call.
pub struct Signer {
    logger: Logger,
    key_path: PathBuf,
    passphrase: Option<String>,
}

impl Signer {
    pub fn new(logger: &Logger, key_path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        Signer {
            logger: logger.clone(),
            key_path: key_path.into(),
            passphrase: passphrase.filter(|p| !p.is_empty()),
        }
    }

    pub fn from_options(logger: &Logger, options: &Options) -> Self {
        Self::new(
            logger,
            options.private_key_path.clone(),
            options.private_key_password().map(str::to_string),
        )
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Reads and parses the key. With a passphrase configured the key must be
    /// encrypted and is decrypted; without one it must be plaintext.
    pub fn load_private_key(&self) -> Result<PrivateKey, LoadPrivateKeyError> {
        let path = expand_home(&self.key_path)
            .map_err(|err| ExpandHomeFailed(self.key_path.clone(), err))?;
        debug!(self.logger, "Loading private key from {}", path.display());

        let content =
            crate::fs::read(&path).map_err(|err| ReadKeyFileFailed(path.clone(), err))?;
        let key =
            PrivateKey::from_openssh(&content).map_err(|err| ParseKeyFailed(path.clone(), err))?;

        match &self.passphrase {
            Some(passphrase) => {
                if !key.is_encrypted() {
                    return Err(NotEncrypted(path));
                }
                key.decrypt(passphrase.as_bytes())
                    .map_err(|err| DecryptKeyFailed(path, err))
            }
            None if key.is_encrypted() => Err(PassphraseRequired(path)),
            None => Ok(key),
        }
    }

    /// RSA keys sign as `rsa-sha2-512`; other key types use their only format.
    pub fn sign(&self, payload: &[u8]) -> Result<WireSignature, SignError> {
        let key = self.load_private_key()?;
        if let Some(keypair) = key.key_data().rsa() {
            let hash = RsaHash::Sha512;
            return Ok(WireSignature {
                format: hash.format().to_string(),
                blob: pkcs1::sign(keypair, hash, payload)?,
                rest: None,
            });
        }
        let signature: ssh_key::Signature =
            signature::Signer::try_sign(&key, payload).map_err(SignError::SignFailed)?;
        Ok(WireSignature::from(&signature))
    }

    /// `sign`, serialized to the JSON wire form.
    pub fn sign_to_json(&self, payload: &[u8]) -> Result<Vec<u8>, SignError> {
        self.sign(payload)?
            .to_json()
            .map_err(SignError::SerializeSignatureFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testdata(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join(name)
    }

    fn signer(key: &str, passphrase: Option<&str>) -> Signer {
        let logger = Logger::root(slog::Discard, slog::o!());
        Signer::new(&logger, testdata(key), passphrase.map(str::to_string))
    }

    #[test]
    fn loads_an_encrypted_key_with_its_passphrase() {
        let key = signer("id_ed25519_encrypted", Some("test"))
            .load_private_key()
            .unwrap();
        assert!(!key.is_encrypted());
    }

    #[test]
    fn passphrase_mismatch_fails() {
        let err = signer("id_ed25519_encrypted", Some("error"))
            .load_private_key()
            .unwrap_err();
        assert!(matches!(err, DecryptKeyFailed(..)));
    }

    #[test]
    fn encrypted_key_without_passphrase_fails() {
        let err = signer("id_ed25519_encrypted", None)
            .load_private_key()
            .unwrap_err();
        assert!(matches!(err, PassphraseRequired(..)));
    }

    #[test]
    fn plaintext_key_with_passphrase_fails() {
        let err = signer("id_ed25519", Some("test"))
            .load_private_key()
            .unwrap_err();
        assert!(matches!(err, NotEncrypted(..)));
    }

    #[test]
    fn empty_passphrase_means_none() {
        signer("id_ed25519", Some("")).load_private_key().unwrap();
    }

    #[test]
    fn missing_key_names_the_path() {
        let err = signer("no_such_key", None).load_private_key().unwrap_err();
        assert!(matches!(err, ReadKeyFileFailed(..)));
        assert!(err.to_string().contains("no_such_key"));
    }

    #[test]
    fn garbage_key_is_a_parse_error() {
        let err = signer("ca.pem", None).load_private_key().unwrap_err();
        assert!(matches!(err, ParseKeyFailed(..)));
    }

    #[test]
    fn signs_with_the_key_algorithm() {
        let sig = signer("id_ed25519_encrypted", Some("test"))
            .sign(b"test")
            .unwrap();
        assert_eq!(sig.format, "ssh-ed25519");
        assert_eq!(sig.blob.len(), 64);

        let sig = signer("id_rsa", None).sign(b"test").unwrap();
        assert_eq!(sig.format, "rsa-sha2-512");
        assert_eq!(sig.blob.len(), 256);
    }

    #[test]
    fn sign_to_json_produces_the_wire_form() {
        let json = signer("id_ed25519", None).sign_to_json(b"test").unwrap();
        let decoded = WireSignature::from_json(&json).unwrap();
        assert_eq!(decoded.format, "ssh-ed25519");
    }
}
