//! # Ring Key Pairs (secp256k1 ECDH)
//!
//! Asymmetric key pairs used as decryption slots in a key ring, and the
//! sealed-box construction clients use to encrypt call data to one of them.
//!
//! ## Construction
//!
//! 1. Sender draws an ephemeral secp256k1 secret and a random 24-byte nonce.
//! 2. Shared point = ECDH(ephemeral, recipient); symmetric key =
//!    BLAKE3-derive(shared.x || ephemeral_pk || recipient_pk).
//! 3. Plaintext is sealed with XChaCha20-Poly1305 under caller-supplied AAD.
//!
//! The recipient recomputes the key from its ring secret and the ephemeral
//! public key carried in the envelope.

use crate::hashing::blake3_derive_key_many;
use crate::symmetric::{self, Nonce, SecretKey};
use crate::CryptoError;
use k256::ecdh::{diffie_hellman, EphemeralSecret};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};

/// Length of a compressed SEC1 public key.
pub const PUBLIC_KEY_LEN: usize = 33;

/// KDF context string for envelope keys.
const ENVELOPE_KDF_CONTEXT: &str = "cl-ledger 2024 ring envelope key v1";

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RingPublicKey([u8; PUBLIC_KEY_LEN]);

impl RingPublicKey {
    /// Create from compressed bytes (33 bytes, starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Result<Self, CryptoError> {
        k256::PublicKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Create from a slice, validating length and curve membership.
    pub fn from_slice(slice: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; PUBLIC_KEY_LEN] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: PUBLIC_KEY_LEN,
                    actual: slice.len(),
                })?;
        Self::from_bytes(bytes)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    fn to_point(self) -> Result<k256::PublicKey, CryptoError> {
        k256::PublicKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)
    }

    fn from_point(point: &k256::PublicKey) -> Self {
        let encoded = point.to_encoded_point(true);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(encoded.as_bytes());
        Self(bytes)
    }
}

/// Output of [`seal_to`]: everything the recipient needs besides its secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBox {
    /// Sender's ephemeral public key.
    pub ephemeral: RingPublicKey,
    /// XChaCha20 nonce.
    pub nonce: Nonce,
    /// Ciphertext including the Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

/// secp256k1 key pair occupying one ring slot.
///
/// The secret scalar is zeroized when the pair is dropped.
pub struct RingKeyPair {
    secret: k256::SecretKey,
}

impl RingKeyPair {
    /// Generate random key pair.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generate a key pair from the supplied RNG.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            secret: k256::SecretKey::random(rng),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let secret =
            k256::SecretKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { secret })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> RingPublicKey {
        RingPublicKey::from_point(&self.secret.public_key())
    }

    /// Open a sealed box addressed to this key.
    ///
    /// # Errors
    ///
    /// Every failure (invalid ephemeral point, wrong recipient, tampered
    /// ciphertext or AAD) is reported as `CryptoError::DecryptionFailed`.
    pub fn open(&self, sealed: &SealedBox, aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ephemeral = sealed
            .ephemeral
            .to_point()
            .map_err(|_| CryptoError::DecryptionFailed)?;
        let shared = diffie_hellman(self.secret.to_nonzero_scalar(), ephemeral.as_affine());
        let key = envelope_key(
            shared.raw_secret_bytes().as_slice(),
            &sealed.ephemeral,
            &self.public_key(),
        );
        symmetric::decrypt(&key, &sealed.nonce, &sealed.ciphertext, aad)
    }
}

impl std::fmt::Debug for RingKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingKeyPair")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Seal `plaintext` to `recipient`, binding `aad`.
///
/// # Errors
///
/// Returns `CryptoError::InvalidPublicKey` if `recipient` is not a curve point.
pub fn seal_to<R: RngCore + CryptoRng>(
    recipient: &RingPublicKey,
    plaintext: &[u8],
    aad: &[u8],
    rng: &mut R,
) -> Result<SealedBox, CryptoError> {
    let recipient_point = recipient.to_point()?;
    let ephemeral_secret = EphemeralSecret::random(rng);
    let ephemeral = RingPublicKey::from_point(&ephemeral_secret.public_key());
    let shared = ephemeral_secret.diffie_hellman(&recipient_point);

    let key = envelope_key(shared.raw_secret_bytes().as_slice(), &ephemeral, recipient);
    let nonce = Nonce::generate_with(rng);
    let ciphertext = symmetric::encrypt(&key, &nonce, plaintext, aad)?;

    Ok(SealedBox {
        ephemeral,
        nonce,
        ciphertext,
    })
}

fn envelope_key(
    shared_x: &[u8],
    ephemeral: &RingPublicKey,
    recipient: &RingPublicKey,
) -> SecretKey {
    SecretKey::from_bytes(blake3_derive_key_many(
        ENVELOPE_KDF_CONTEXT,
        &[shared_x, ephemeral.as_bytes(), recipient.as_bytes()],
    ))
}
