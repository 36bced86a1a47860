//! Canonically ordered token pairs.
//!
//! A [`TokenPair`] always stores the lower asset identifier first. The
//! ordering is enforced by every constructor, including deserialization,
//! because the pair is the lookup key for committed price data.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{AssetId, Result, TypesError};

/// A pair of distinct, non-zero assets in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PairRepr", into = "PairRepr")]
pub struct TokenPair {
    token0: AssetId,
    token1: AssetId,
}

#[serde_as]
#[derive(Clone, Copy, Serialize, Deserialize)]
struct PairRepr {
    #[serde_as(as = "serde_with::hex::Hex")]
    token0: AssetId,
    #[serde_as(as = "serde_with::hex::Hex")]
    token1: AssetId,
}

impl TokenPair {
    /// Build a pair from two assets given in any order.
    ///
    /// # Errors
    ///
    /// - [`TypesError::IdenticalTokens`] if `a == b`
    /// - [`TypesError::ZeroToken`] if either identifier is all zeroes
    pub fn new(a: AssetId, b: AssetId) -> Result<Self> {
        if a == [0u8; 32] || b == [0u8; 32] {
            return Err(TypesError::ZeroToken);
        }
        if a == b {
            return Err(TypesError::IdenticalTokens);
        }
        let (token0, token1) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { token0, token1 })
    }

    /// The lower asset identifier.
    pub fn token0(&self) -> &AssetId {
        &self.token0
    }

    /// The higher asset identifier.
    pub fn token1(&self) -> &AssetId {
        &self.token1
    }
}

impl TryFrom<PairRepr> for TokenPair {
    type Error = TypesError;

    fn try_from(repr: PairRepr) -> Result<Self> {
        Self::new(repr.token0, repr.token1)
    }
}

impl From<TokenPair> for PairRepr {
    fn from(pair: TokenPair) -> Self {
        Self {
            token0: pair.token0,
            token1: pair.token1,
        }
    }
}

impl std::fmt::Display for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            short_hex(&self.token0),
            short_hex(&self.token1)
        )
    }
}

fn short_hex(id: &AssetId) -> String {
    id.iter().take(4).map(|b| format!("{b:02x}")).collect()
}
