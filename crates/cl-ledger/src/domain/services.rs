//! # Domain Services
//!
//! Pure functions: unit address derivation, selector and topic hashing.
//! Deterministic, no I/O, no locking.

use crate::domain::value_objects::{Address, Hash, Selector};
use sha3::{Digest, Keccak256};

// =============================================================================
// HASHING
// =============================================================================

/// Keccak-256 of arbitrary data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    Hash::new(Keccak256::digest(data).into())
}

/// Call selector: first four bytes of `keccak256(signature)`.
///
/// `signature` uses the Solidity canonical form, e.g. `mint(address,uint256)`.
#[must_use]
pub fn selector_of(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&hash.0[..4]);
    Selector::new(bytes)
}

/// Event topic: `keccak256(signature)`.
#[must_use]
pub fn event_topic(signature: &str) -> Hash {
    keccak256(signature.as_bytes())
}

// =============================================================================
// UNIT ADDRESS COMPUTATION
// =============================================================================

/// Computes the address of a newly created unit.
///
/// Address = keccak256(rlp(\[deployer, nonce\]))\[12:\]
#[must_use]
pub fn compute_unit_address(deployer: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // RLP encode address (20 bytes, 0x80 + 20 = 0x94)
    content.push(0x94);
    content.extend_from_slice(deployer.as_bytes());

    // RLP encode nonce
    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let nonce_bytes = encode_nonce(nonce);
        content.push(0x80 + nonce_bytes.len() as u8);
        content.extend_from_slice(&nonce_bytes);
    }

    // Content never reaches 56 bytes (21 + at most 9), so the short list header applies.
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    let hash = keccak256(&rlp_data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.0[12..32]);
    Address::new(addr)
}

/// Big-endian nonce without leading zeros.
fn encode_nonce(nonce: u64) -> Vec<u8> {
    let bytes = nonce.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

// =============================================================================
// TESTS
// =============================================================================
