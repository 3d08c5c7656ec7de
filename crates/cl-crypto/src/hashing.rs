//! # BLAKE3 Hashing
//!
//! Key derivation and keyed integrity tags for envelopes.

/// BLAKE3 hash output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with BLAKE3 (one-shot).
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple inputs.
pub fn blake3_hash_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    *hasher.finalize().as_bytes()
}

/// Keyed hash (MAC).
pub fn blake3_keyed_hash(key: &[u8; 32], data: &[u8]) -> Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Derive key from context and input key material.
pub fn blake3_derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    blake3_derive_key_many(context, &[key_material])
}

/// Derive key from context and several pieces of key material, fed in order.
pub fn blake3_derive_key_many(context: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}
