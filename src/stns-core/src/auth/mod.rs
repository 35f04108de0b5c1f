pub mod pkcs1;
pub mod signature;
pub mod signer;
pub mod verifier;
