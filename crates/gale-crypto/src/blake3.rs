//! Domain-separated BLAKE3 hashing for the Gale protocol.
//!
//! Every digest that is signed or used as a key is produced in BLAKE3's
//! derive-key mode under a registered context string, so a signature over one
//! kind of message can never be replayed as another.

/// Registered BLAKE3 context strings.
pub mod contexts {
    /// Digest of a price commit that attestors sign.
    pub const PRICE_COMMIT: &str = "Gale v1 price-commit";
    /// Identifier derivation for pools registered by a host.
    pub const POOL_ID: &str = "Gale v1 pool-id";
}

/// Derive a key using BLAKE3's built-in key derivation mode.
///
/// # Arguments
///
/// * `context` - A registered context string (must start with "Gale v1 ")
/// * `key_material` - The input key material
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut hasher = ::blake3::Hasher::new_derive_key(context);
    hasher.update(key_material);
    let hash = hasher.finalize();
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Encode multiple dynamic fields using length-prefixed encoding.
///
/// `LE32(len(field1)) || field1 || LE32(len(field2)) || field2 || ...`
pub fn encode_multi_field(fields: &[&[u8]]) -> Vec<u8> {
    let total_len: usize = fields.iter().map(|f| 4 + f.len()).sum();
    let mut output = Vec::with_capacity(total_len);
    for field in fields {
        output.extend_from_slice(&(field.len() as u32).to_le_bytes());
        output.extend_from_slice(field);
    }
    output
}

/// Derive a pool identifier from the host's own pool key bytes.
pub fn derive_pool_id(host_pool_key: &[u8]) -> [u8; 32] {
    derive_key(contexts::POOL_ID, host_pool_key)
}
