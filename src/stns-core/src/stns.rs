use crate::auth::signer::Signer;
use crate::auth::verifier::{MalformedKeyPolicy, Verifier};
use crate::challenge::{ChallengeCode, ChallengeStore, FileChallengeStore};
use crate::config::Options;
use crate::directory::{DirectoryClient, Group, User};
use crate::error::authenticate::AuthenticateError;
use crate::error::authenticate::AuthenticateError::{
    ChallengeMismatch, ChallengeUnavailable, VerifyFailed,
};
use crate::error::challenge::ChallengeStoreError;
use crate::error::directory::DirectoryError;
use crate::error::key::SignError;
use crate::error::transport::BuildTransportError;
use crate::error::verify::VerifyError;
use crate::http::transport::Transport;
use ring::hmac;
use slog::{debug, info, Logger};
use std::sync::Arc;

/// Directory lookups plus the challenge-response flow, bound to one endpoint.
pub struct Stns {
    logger: Logger,
    directory: DirectoryClient,
    signer: Signer,
    verifier: Verifier,
    challenge_store: Arc<dyn ChallengeStore>,
}

impl Stns {
    pub fn new(endpoint: &str, options: Options) -> Result<Self, BuildTransportError> {
        Self::with_logger(&Logger::root(slog::Discard, slog::o!()), endpoint, options)
    }

    pub fn with_logger(
        logger: &Logger,
        endpoint: &str,
        options: Options,
    ) -> Result<Self, BuildTransportError> {
        let signer = Signer::from_options(logger, &options);
        let transport = Transport::new(logger, endpoint, options)?;
        Ok(Stns {
            logger: logger.clone(),
            directory: DirectoryClient::new(transport),
            signer,
            verifier: Verifier::new(logger),
            challenge_store: Arc::new(FileChallengeStore::new(logger)),
        })
    }

    /// Replaces the default file-backed store.
    pub fn with_challenge_store(self, challenge_store: Arc<dyn ChallengeStore>) -> Self {
        Self {
            challenge_store,
            ..self
        }
    }

    pub fn with_malformed_key_policy(self, policy: MalformedKeyPolicy) -> Self {
        Self {
            verifier: self.verifier.with_malformed_key_policy(policy),
            ..self
        }
    }

    pub fn directory(&self) -> &DirectoryClient {
        &self.directory
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        self.directory.list_users()
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<User, DirectoryError> {
        self.directory.get_user_by_name(name)
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User, DirectoryError> {
        self.directory.get_user_by_id(id)
    }

    pub fn list_groups(&self) -> Result<Vec<Group>, DirectoryError> {
        self.directory.list_groups()
    }

    pub fn get_group_by_name(&self, name: &str) -> Result<Group, DirectoryError> {
        self.directory.get_group_by_name(name)
    }

    pub fn get_group_by_id(&self, id: i64) -> Result<Group, DirectoryError> {
        self.directory.get_group_by_id(id)
    }

    /// Mints a fresh code for `name`, replacing any outstanding one.
    pub fn create_user_challenge_code(
        &self,
        name: &str,
    ) -> Result<ChallengeCode, ChallengeStoreError> {
        let code = self.challenge_store.create()?;
        self.challenge_store.store(name, &code)?;
        debug!(self.logger, "Issued challenge code for '{}'", name);
        Ok(code)
    }

    pub fn pop_user_challenge_code(
        &self,
        name: &str,
    ) -> Result<ChallengeCode, ChallengeStoreError> {
        self.challenge_store.pop(name)
    }

    /// Signs `payload` with the configured private key; returns the JSON wire form.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignError> {
        self.signer.sign_to_json(payload)
    }

    pub fn verify_with_user(
        &self,
        name: &str,
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), VerifyError> {
        self.verifier.verify(&self.directory, name, payload, signature)
    }

    pub fn verify(
        &self,
        payload: &[u8],
        candidate_keys: &str,
        signature: &[u8],
    ) -> Result<(), VerifyError> {
        self.verifier.verify_raw(payload, candidate_keys, signature)
    }

    /// Checks that `signature` covers `presented_code` under one of `name`'s
    /// keys, then consumes the stored code and requires it to match.
    ///
    /// The stored code is only consumed once the signature has verified.
    pub fn authenticate(
        &self,
        name: &str,
        presented_code: &[u8],
        signature: &[u8],
    ) -> Result<(), AuthenticateError> {
        self.verify_with_user(name, presented_code, signature)
            .map_err(|err| VerifyFailed(name.to_string(), err))?;

        let issued = self
            .pop_user_challenge_code(name)
            .map_err(|err| ChallengeUnavailable(name.to_string(), err))?;
        if !codes_match(&issued, presented_code) {
            return Err(ChallengeMismatch(name.to_string()));
        }
        info!(self.logger, "Authenticated '{}'", name);
        Ok(())
    }
}

/// Compares in constant time: both codes are MACed and the tags compared by `ring`.
fn codes_match(issued: &ChallengeCode, presented: &[u8]) -> bool {
    let key = hmac::Key::new(hmac::HMAC_SHA256, b"stns-challenge");
    let tag = hmac::sign(&key, issued.as_bytes());
    hmac::verify(&key, presented, tag.as_ref()).is_ok()
}
