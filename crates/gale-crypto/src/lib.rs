//! # gale-crypto
//!
//! Cryptographic primitives for attestation: Ed25519 signatures over a
//! domain-separated BLAKE3 digest of each price commit.
//!
//! ## Modules
//!
//! - [`blake3`]: Domain-separated BLAKE3 hashing
//! - [`ed25519`]: Ed25519 signing and verification (RFC 8032)
//! - [`commit`]: Canonical byte encoding and digest of a price commit

pub mod blake3;
pub mod commit;
pub mod ed25519;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// The bytes do not encode a valid Ed25519 public key.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
