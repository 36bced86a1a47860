//! # gale-types
//!
//! Shared domain types used across the Gale workspace: identifiers, the
//! canonical token pair, oracle tasks and price commits, and the event
//! records emitted by the fee controller and the oracle hub.

pub mod events;
pub mod oracle;
pub mod pair;

pub use pair::TokenPair;

/// Common type aliases.
pub type AssetId = [u8; 32];
pub type PoolId = [u8; 32];
/// An attestor is identified by its Ed25519 public key.
pub type AttestorId = [u8; 32];
pub type TaskId = u64;
/// Opaque, caller-supplied logical clock (block height or equivalent).
pub type Height = u64;
/// Fixed-point price as reported by the host pool or an attestor.
pub type Price = u128;

/// Fees are expressed in hundredths of a basis point (1_000_000 = 100%).
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Default base fee: 0.30%.
pub const DEFAULT_BASE_FEE: u32 = 3_000;

/// Default maximum fee: 1.00%.
pub const DEFAULT_MAX_FEE: u32 = 10_000;

/// Upper bound of the volatility score scale.
pub const MAX_VOLATILITY_SCORE: u32 = 10_000;

/// Basis-point denominator used by scorer weights and ratio terms.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Error types for constructing shared domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// Both sides of a pair name the same asset.
    #[error("token pair must reference two distinct assets")]
    IdenticalTokens,

    /// The all-zero identifier is reserved and never names an asset.
    #[error("zero asset identifier")]
    ZeroToken,
}

/// Convenience result type for domain value construction.
pub type Result<T> = std::result::Result<T, TypesError>;
