use crate::auth::pkcs1::{self, RsaHash};
use crate::auth::signature::WireSignature;
use crate::directory::DirectoryClient;
use crate::error::verify::VerifyError;
use crate::error::verify::VerifyError::{
    LookupKeysFailed, MalformedPublicKey, MalformedSignature, NoMatchingKey, UnsupportedSignature,
};
use slog::{trace, warn, Logger};
use ssh_key::authorized_keys::Entry;
use ssh_key::PublicKey;

/// What to do with a candidate key line that does not parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedKeyPolicy {
    /// Fail the whole verification.
    #[default]
    Abort,
    /// Log it and try the remaining candidates.
    Skip,
}

/// Checks signatures against every public key registered for an identity.
pub struct Verifier {
    logger: Logger,
    malformed_key_policy: MalformedKeyPolicy,
}

impl Verifier {
    pub fn new(logger: &Logger) -> Self {
        Verifier {
            logger: logger.clone(),
            malformed_key_policy: MalformedKeyPolicy::default(),
        }
    }

    pub fn with_malformed_key_policy(mut self, policy: MalformedKeyPolicy) -> Self {
        self.malformed_key_policy = policy;
        self
    }

    pub fn malformed_key_policy(&self) -> MalformedKeyPolicy {
        self.malformed_key_policy
    }

    /// Resolves `identity_name`'s keys through the directory, then `verify_raw`.
    pub fn verify(
        &self,
        directory: &DirectoryClient,
        identity_name: &str,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), VerifyError> {
        let user = directory
            .get_user_by_name(identity_name)
            .map_err(|err| LookupKeysFailed(identity_name.to_string(), err))?;
        self.verify_raw(payload, &user.keys.join("\n"), signature)
    }

    /// Succeeds as soon as any candidate key in `candidate_keys` (authorized-keys
    /// lines, in order) validates `signature` over `payload`.
    pub fn verify_raw(
        &self,
        payload: &[u8],
        candidate_keys: &str,
        signature: &[u8],
    ) -> Result<(), VerifyError> {
        let wire = WireSignature::from_json(signature).map_err(MalformedSignature)?;
        let signature = CandidateSignature::from_wire(&wire)?;

        for line in candidate_keys.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let public_key = match parse_authorized_key(line) {
                Ok(key) => key,
                Err(err) => match self.malformed_key_policy {
                    MalformedKeyPolicy::Abort => {
                        return Err(MalformedPublicKey(key_fragment(line), err))
                    }
                    MalformedKeyPolicy::Skip => {
                        warn!(
                            self.logger,
                            "Skipping unparsable public key '{}': {}",
                            key_fragment(line),
                            err
                        );
                        continue;
                    }
                },
            };
            match signature.verify(&public_key, payload) {
                Ok(()) => return Ok(()),
                Err(err) => trace!(
                    self.logger,
                    "Key '{}' rejected signature: {}",
                    key_fragment(line),
                    err
                ),
            }
        }
        Err(NoMatchingKey)
    }
}

enum CandidateSignature {
    Rsa(RsaHash, Vec<u8>),
    Ssh(ssh_key::Signature),
}

impl CandidateSignature {
    fn from_wire(wire: &WireSignature) -> Result<Self, VerifyError> {
        if let Some(hash) = RsaHash::from_format(&wire.format) {
            return Ok(CandidateSignature::Rsa(hash, wire.blob.clone()));
        }
        wire.to_ssh_signature()
            .map(CandidateSignature::Ssh)
            .map_err(|err| UnsupportedSignature(wire.format.clone(), err))
    }

    fn verify(&self, key: &PublicKey, payload: &[u8]) -> Result<(), signature::Error> {
        match self {
            CandidateSignature::Rsa(hash, blob) => match key.key_data().rsa() {
                Some(rsa_key) => pkcs1::verify(rsa_key, *hash, payload, blob),
                None => Err(signature::Error::new()),
            },
            CandidateSignature::Ssh(sig) => {
                signature::Verifier::verify(key.key_data(), payload, sig)
            }
        }
    }
}

/// Parses one authorized-keys line, with or without leading options.
fn parse_authorized_key(line: &str) -> Result<PublicKey, ssh_key::Error> {
    Ok(line.parse::<Entry>()?.public_key().clone())
}

fn key_fragment(line: &str) -> String {
    const MAX: usize = 40;
    match line.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signer::Signer;
    use std::path::PathBuf;

    fn testdata(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join(name)
    }

    fn logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    fn public_key(name: &str) -> String {
        std::fs::read_to_string(testdata(&format!("{name}.pub")))
            .unwrap()
            .trim()
            .to_string()
    }

    fn sign(key: &str, passphrase: Option<&str>, payload: &[u8]) -> Vec<u8> {
        Signer::new(&logger(), testdata(key), passphrase.map(str::to_string))
            .sign_to_json(payload)
            .unwrap()
    }

    #[test]
    fn single_key_accepts_its_signature() {
        let sig = sign("id_ed25519", None, b"test");
        Verifier::new(&logger())
            .verify_raw(b"test", &public_key("id_ed25519"), &sig)
            .unwrap();
    }

    #[test]
    fn any_of_several_keys_may_match() {
        let keys = [
            public_key("id_ed25519"),
            public_key("id_rsa"),
            public_key("id_ed25519_encrypted"),
        ]
        .join("\n");
        let verifier = Verifier::new(&logger());

        for (key, passphrase) in [
            ("id_ed25519", None),
            ("id_rsa", None),
            ("id_ed25519_encrypted", Some("test")),
        ] {
            let sig = sign(key, passphrase, b"secret test");
            verifier.verify_raw(b"secret test", &keys, &sig).unwrap();
        }
    }

    #[test]
    fn unrelated_key_fails() {
        let keys = [public_key("id_ed25519"), public_key("id_rsa")].join("\n");
        let sig = sign("id_ed25519_unrelated", None, b"test");
        let err = Verifier::new(&logger())
            .verify_raw(b"test", &keys, &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn payload_mismatch_fails() {
        let sig = sign("id_ed25519", None, b"secret test");
        let err = Verifier::new(&logger())
            .verify_raw(b"make error", &public_key("id_ed25519"), &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn no_candidates_fails() {
        let sig = sign("id_ed25519", None, b"test");
        let err = Verifier::new(&logger())
            .verify_raw(b"test", "\n# no keys\n", &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn malformed_signature_is_distinct_from_no_match() {
        let err = Verifier::new(&logger())
            .verify_raw(b"test", &public_key("id_ed25519"), b"not json")
            .unwrap_err();
        assert!(matches!(err, MalformedSignature(_)));
    }

    #[test]
    fn malformed_key_aborts_by_default() {
        let keys = [
            "ssh-rsa BBBB3NzaC1yc2EAAAADAQABAAABgQCr".to_string(),
            public_key("id_ed25519"),
        ]
        .join("\n");
        let sig = sign("id_ed25519", None, b"test");
        let err = Verifier::new(&logger())
            .verify_raw(b"test", &keys, &sig)
            .unwrap_err();
        assert!(matches!(err, MalformedPublicKey(..)));
    }

    #[test]
    fn malformed_key_can_be_skipped() {
        let keys = [
            "ssh-rsa BBBB3NzaC1yc2EAAAADAQABAAABgQCr".to_string(),
            public_key("id_ed25519"),
        ]
        .join("\n");
        let sig = sign("id_ed25519", None, b"test");
        let verifier =
            Verifier::new(&logger()).with_malformed_key_policy(MalformedKeyPolicy::Skip);
        assert_eq!(verifier.malformed_key_policy(), MalformedKeyPolicy::Skip);
        verifier.verify_raw(b"test", &keys, &sig).unwrap();

        let err = verifier
            .verify_raw(b"test", "ssh-rsa BBBB3NzaC1yc2EAAAADAQABAAABgQCr", &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn legacy_ssh_rsa_signature_verifies() {
        // `ssh-rsa` (SHA-1) as emitted by Go's ssh.Signer.
        let sig = std::fs::read(testdata("id_rsa.ssh-rsa.sig.json")).unwrap();
        let keys = [public_key("id_ed25519"), public_key("id_rsa")].join("\n");
        let verifier = Verifier::new(&logger());
        verifier.verify_raw(b"secret test", &keys, &sig).unwrap();

        let err = verifier
            .verify_raw(b"make error", &keys, &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn rsa_signature_against_ed25519_key_fails() {
        let sig = sign("id_rsa", None, b"test");
        let err = Verifier::new(&logger())
            .verify_raw(b"test", &public_key("id_ed25519"), &sig)
            .unwrap_err();
        assert!(matches!(err, NoMatchingKey));
    }

    #[test]
    fn key_with_options_verifies() {
        let keys = format!(
            "command=\"echo hi\",no-pty {}\nno-agent-forwarding {}",
            public_key("id_ed25519_unrelated"),
            public_key("id_ed25519")
        );
        let sig = sign("id_ed25519", None, b"test");
        Verifier::new(&logger())
            .verify_raw(b"test", &keys, &sig)
            .unwrap();
    }

    #[test]
    fn key_fragment_truncates_long_lines() {
        let line = "a".repeat(100);
        assert_eq!(key_fragment(&line), format!("{}...", "a".repeat(40)));
        assert_eq!(key_fragment("short"), "short");
    }
}
