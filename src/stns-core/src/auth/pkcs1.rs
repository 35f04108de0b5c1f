//! RSA PKCS#1 v1.5 signatures in the SSH `ssh-rsa` / `rsa-sha2-*` formats.
use crate::error::key::RsaKeyError;
use crate::error::key::RsaKeyError::{BuildKeyFailed, InvalidComponent};
use crate::error::key::SignError;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use signature::{SignatureEncoding, Signer, Verifier};
use ssh_key::private::RsaKeypair;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsaHash {
    /// Legacy `ssh-rsa`, still what Go's `ssh.Signer` emits for RSA keys.
    Sha1,
    Sha256,
    Sha512,
}

impl RsaHash {
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "ssh-rsa" => Some(RsaHash::Sha1),
            "rsa-sha2-256" => Some(RsaHash::Sha256),
            "rsa-sha2-512" => Some(RsaHash::Sha512),
            _ => None,
        }
    }

    pub fn format(self) -> &'static str {
        match self {
            RsaHash::Sha1 => "ssh-rsa",
            RsaHash::Sha256 => "rsa-sha2-256",
            RsaHash::Sha512 => "rsa-sha2-512",
        }
    }
}

/// Signs `payload`, returning the raw signature blob.
pub fn sign(keypair: &RsaKeypair, hash: RsaHash, payload: &[u8]) -> Result<Vec<u8>, SignError> {
    let key = private_key(keypair)?;
    let signature = match hash {
        RsaHash::Sha1 => SigningKey::<Sha1>::new(key).try_sign(payload),
        RsaHash::Sha256 => SigningKey::<Sha256>::new(key).try_sign(payload),
        RsaHash::Sha512 => SigningKey::<Sha512>::new(key).try_sign(payload),
    }
    .map_err(SignError::SignFailed)?;
    Ok(signature.to_vec())
}

pub fn verify(
    public: &ssh_key::public::RsaPublicKey,
    hash: RsaHash,
    payload: &[u8],
    blob: &[u8],
) -> Result<(), signature::Error> {
    let key = public_key(public).map_err(signature::Error::from_source)?;
    let signature = Signature::try_from(blob)?;
    match hash {
        RsaHash::Sha1 => VerifyingKey::<Sha1>::new(key).verify(payload, &signature),
        RsaHash::Sha256 => VerifyingKey::<Sha256>::new(key).verify(payload, &signature),
        RsaHash::Sha512 => VerifyingKey::<Sha512>::new(key).verify(payload, &signature),
    }
}

fn component(bytes: Option<&[u8]>, name: &'static str) -> Result<BigUint, RsaKeyError> {
    bytes
        .map(BigUint::from_bytes_be)
        .ok_or(InvalidComponent(name))
}

fn public_key(public: &ssh_key::public::RsaPublicKey) -> Result<RsaPublicKey, RsaKeyError> {
    let n = component(public.n.as_positive_bytes(), "n")?;
    let e = component(public.e.as_positive_bytes(), "e")?;
    RsaPublicKey::new(n, e).map_err(BuildKeyFailed)
}

fn private_key(keypair: &RsaKeypair) -> Result<RsaPrivateKey, RsaKeyError> {
    let n = component(keypair.public.n.as_positive_bytes(), "n")?;
    let e = component(keypair.public.e.as_positive_bytes(), "e")?;
    let d = component(keypair.private.d.as_positive_bytes(), "d")?;
    let p = component(keypair.private.p.as_positive_bytes(), "p")?;
    let q = component(keypair.private.q.as_positive_bytes(), "q")?;
    RsaPrivateKey::from_components(n, e, d, vec![p, q]).map_err(BuildKeyFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::WireSignature;
    use ssh_key::{PrivateKey, PublicKey};
    use std::path::PathBuf;

    fn testdata(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join(name)
    }

    fn keypair() -> RsaKeypair {
        let key = PrivateKey::read_openssh_file(&testdata("id_rsa")).unwrap();
        key.key_data().rsa().unwrap().clone()
    }

    fn public() -> ssh_key::public::RsaPublicKey {
        let key = PublicKey::read_openssh_file(&testdata("id_rsa.pub")).unwrap();
        key.key_data().rsa().unwrap().clone()
    }

    // Produced by `openssl dgst -sha1 -sign` over "secret test", the same
    // bytes Go's ssh.Signer emits for this key.
    fn openssl_sha1_signature() -> WireSignature {
        let json = std::fs::read(testdata("id_rsa.ssh-rsa.sig.json")).unwrap();
        WireSignature::from_json(&json).unwrap()
    }

    #[test]
    fn formats_map_to_hashes() {
        for hash in [RsaHash::Sha1, RsaHash::Sha256, RsaHash::Sha512] {
            assert_eq!(RsaHash::from_format(hash.format()), Some(hash));
        }
        assert_eq!(RsaHash::from_format("ssh-ed25519"), None);
    }

    #[test]
    fn verifies_a_legacy_sha1_signature() {
        let sig = openssl_sha1_signature();
        assert_eq!(sig.format, "ssh-rsa");
        verify(&public(), RsaHash::Sha1, b"secret test", &sig.blob).unwrap();
        assert!(verify(&public(), RsaHash::Sha1, b"make error", &sig.blob).is_err());
        assert!(verify(&public(), RsaHash::Sha512, b"secret test", &sig.blob).is_err());
    }

    #[test]
    fn rebuilt_private_key_matches_openssl() {
        // PKCS#1 v1.5 is deterministic, so both signers agree byte for byte.
        let blob = sign(&keypair(), RsaHash::Sha1, b"secret test").unwrap();
        assert_eq!(blob, openssl_sha1_signature().blob);
    }

    #[test]
    fn sha2_signatures_verify() {
        for hash in [RsaHash::Sha256, RsaHash::Sha512] {
            let blob = sign(&keypair(), hash, b"test").unwrap();
            verify(&public(), hash, b"test", &blob).unwrap();
        }
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let blob = sign(&keypair(), RsaHash::Sha512, b"test").unwrap();
        assert!(verify(&public(), RsaHash::Sha512, b"test", &blob[..10]).is_err());
    }
}
