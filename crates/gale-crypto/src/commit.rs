//! Canonical encoding of a price commit.
//!
//! Attestors sign the digest of a commit bound to the task it answers:
//!
//! ```text
//! fields = [BE64(task_id), token0, token1, BE64(observed_at), BE128(p_0) || .. || BE128(p_n)]
//! digest = BLAKE3::derive_key("Gale v1 price-commit", encode_multi_field(fields))
//! ```
//!
//! The pair is always canonical, so both token orders a client might start
//! from produce the same bytes.

use gale_types::oracle::PriceCommit;
use gale_types::TaskId;

use crate::blake3::{contexts, derive_key, encode_multi_field};
use crate::ed25519::{SigningKey, Signature};

/// Canonical byte encoding of `commit` answering task `task_id`.
pub fn encode(task_id: TaskId, commit: &PriceCommit) -> Vec<u8> {
    let mut prices = Vec::with_capacity(commit.prices.len() * 16);
    for price in &commit.prices {
        prices.extend_from_slice(&price.to_be_bytes());
    }
    encode_multi_field(&[
        &task_id.to_be_bytes(),
        commit.pair.token0(),
        commit.pair.token1(),
        &commit.observed_at.to_be_bytes(),
        &prices,
    ])
}

/// The 32-byte message an attestor signs for `commit`.
pub fn digest(task_id: TaskId, commit: &PriceCommit) -> [u8; 32] {
    derive_key(contexts::PRICE_COMMIT, &encode(task_id, commit))
}

/// Sign `commit` for `task_id` as the holder of `key`.
pub fn sign(key: &SigningKey, task_id: TaskId, commit: &PriceCommit) -> Signature {
    key.sign(&digest(task_id, commit))
}
