pub mod auth;
pub mod challenge;
pub mod config;
pub mod directory;
pub mod error;
pub mod foundation;
pub mod fs;
pub mod http;
pub mod stns;

pub use auth::signature::WireSignature;
pub use auth::verifier::MalformedKeyPolicy;
pub use challenge::{ChallengeCode, ChallengeStore, FileChallengeStore, MemoryChallengeStore};
pub use config::Options;
pub use directory::{Group, User};
pub use stns::Stns;
