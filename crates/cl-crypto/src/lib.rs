//! # CL Crypto - Ring Key and Envelope Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | XChaCha20-Poly1305 | Envelope body encryption |
//! | `ecdh` | secp256k1 ECDH | Ring key pairs, sealed boxes |
//! | `hashing` | BLAKE3 | KDF, keyed integrity tags |
//!
//! ## Security Properties
//!
//! - **XChaCha20**: 192-bit nonce, constant-time, side-channel immune
//! - **Ring secrets**: zeroized on drop
//! - **Opaque failures**: every open/decrypt failure is `CryptoError::DecryptionFailed`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdh;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use ecdh::{seal_to, RingKeyPair, RingPublicKey, SealedBox, PUBLIC_KEY_LEN};
pub use errors::CryptoError;
pub use hashing::{blake3_derive_key, blake3_derive_key_many, blake3_hash, blake3_keyed_hash};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey, AEAD_TAG_LEN, NONCE_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
