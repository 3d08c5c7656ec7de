//! # Envelope Codec
//!
//! Turns raw envelope bytes into a [`DecodedEnvelope`].
//!
//! | Layer | Module | Failure |
//! |-------|--------|---------|
//! | Frame header, length, integrity tag | [`frame`] | `MalformedEnvelope` |
//! | Call body (selector + args) | [`call`] | `MalformedEnvelope` (plain) |
//! | Sealed body (ECDH + XChaCha20-Poly1305) | this module | `DecryptionFailed` |
//! | Nonce replay window | [`replay`] | `DecryptionFailed` |
//!
//! Once a sealed frame has parsed, every later failure is reported as
//! `DecryptionFailed` so a caller cannot learn which check rejected it.

pub mod call;
pub mod frame;
pub mod replay;

pub use call::CallData;
pub use frame::{FrameKind, FRAME_VERSION, HEADER_LEN, TAG_LEN};
pub use replay::ReplayGuard;

use crate::domain::value_objects::{Bytes, Selector};
use crate::errors::LedgerError;
use cl_crypto::{
    seal_to, Nonce, RingKeyPair, RingPublicKey, SealedBox, AEAD_TAG_LEN, NONCE_LEN,
    PUBLIC_KEY_LEN,
};
use frame::Frame;
use rand::{CryptoRng, RngCore};

/// Fixed prefix of a sealed body before the ciphertext.
const SEALED_PREFIX_LEN: usize = PUBLIC_KEY_LEN + NONCE_LEN;

/// Decoded envelope, ready for dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEnvelope {
    /// Operation selector.
    pub selector: Selector,
    /// Raw arguments.
    pub args: Vec<Bytes>,
    /// Verified frame tag.
    pub integrity_tag: [u8; TAG_LEN],
    /// True if the call body arrived sealed.
    pub confidential: bool,
    /// Sealing nonce, for replay detection.
    pub nonce: Option<Nonce>,
}

impl DecodedEnvelope {
    /// Selector and arguments.
    #[must_use]
    pub fn call(&self) -> CallData {
        CallData::new(self.selector, self.args.clone())
    }
}

/// Encode a plain envelope.
///
/// # Errors
///
/// `MalformedEnvelope` if the arguments do not fit the wire limits.
pub fn encode(selector: Selector, args: Vec<Bytes>) -> Result<Vec<u8>, LedgerError> {
    let body = CallData::new(selector, args).to_body()?;
    let header = frame::header(FrameKind::Plain, body.len())?;
    Ok(frame::assemble(&header, &body))
}

/// Decode a plain envelope.
///
/// # Errors
///
/// `MalformedEnvelope` on any structural defect, including a sealed frame.
pub fn decode(raw: &[u8]) -> Result<DecodedEnvelope, LedgerError> {
    let frame = frame::parse(raw)?;
    if frame.kind != FrameKind::Plain {
        return Err(LedgerError::MalformedEnvelope("expected plain frame"));
    }
    decode_plain(&frame)
}

/// Seal a call to `recipient`.
///
/// # Errors
///
/// `MalformedEnvelope` if the arguments do not fit the wire limits or the
/// recipient key is not a curve point.
pub fn seal<R: RngCore + CryptoRng>(
    selector: Selector,
    args: Vec<Bytes>,
    recipient: &RingPublicKey,
    rng: &mut R,
) -> Result<Vec<u8>, LedgerError> {
    let plain = CallData::new(selector, args).to_body()?;
    let body_len = SEALED_PREFIX_LEN + plain.len() + AEAD_TAG_LEN;
    let header = frame::header(FrameKind::Sealed, body_len)?;

    let sealed = seal_to(recipient, &plain, &header, rng)
        .map_err(|_| LedgerError::MalformedEnvelope("recipient key rejected"))?;

    let mut body = Vec::with_capacity(body_len);
    body.extend_from_slice(sealed.ephemeral.as_bytes());
    body.extend_from_slice(sealed.nonce.as_bytes());
    body.extend_from_slice(&sealed.ciphertext);
    Ok(frame::assemble(&header, &body))
}

/// Decrypt a sealed envelope against `candidates`, in order.
///
/// Every candidate is tried even after a success, so the work done does not
/// depend on which slot holds the key.
///
/// # Errors
///
/// `MalformedEnvelope` if the frame itself is defective; `DecryptionFailed`
/// for everything after that.
pub fn decrypt(raw: &[u8], candidates: &[&RingKeyPair]) -> Result<DecodedEnvelope, LedgerError> {
    let frame = frame::parse(raw)?;
    if frame.kind != FrameKind::Sealed {
        return Err(LedgerError::MalformedEnvelope("expected sealed frame"));
    }
    decrypt_sealed(&frame, candidates)
}

/// Decode either frame kind.
///
/// # Errors
///
/// As [`decode`] for plain frames and [`decrypt`] for sealed ones.
pub fn open(raw: &[u8], candidates: &[&RingKeyPair]) -> Result<DecodedEnvelope, LedgerError> {
    let frame = frame::parse(raw)?;
    match frame.kind {
        FrameKind::Plain => decode_plain(&frame),
        FrameKind::Sealed => decrypt_sealed(&frame, candidates),
    }
}

fn decode_plain(frame: &Frame<'_>) -> Result<DecodedEnvelope, LedgerError> {
    let call = CallData::from_body(frame.body)?;
    Ok(DecodedEnvelope {
        selector: call.selector,
        args: call.args,
        integrity_tag: frame.tag,
        confidential: false,
        nonce: None,
    })
}

fn decrypt_sealed(
    frame: &Frame<'_>,
    candidates: &[&RingKeyPair],
) -> Result<DecodedEnvelope, LedgerError> {
    if frame.body.len() < SEALED_PREFIX_LEN + AEAD_TAG_LEN {
        return Err(LedgerError::MalformedEnvelope("short sealed body"));
    }
    let (ephemeral, rest) = frame.body.split_at(PUBLIC_KEY_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral = RingPublicKey::from_slice(ephemeral)?;
    let nonce = Nonce::from_slice(nonce).ok_or(LedgerError::DecryptionFailed)?;
    let sealed = SealedBox {
        ephemeral,
        nonce,
        ciphertext: ciphertext.to_vec(),
    };

    let mut opened = None;
    for key in candidates {
        let attempt = key.open(&sealed, &frame.header);
        if opened.is_none() {
            opened = attempt.ok();
        }
    }

    let plain = opened.ok_or(LedgerError::DecryptionFailed)?;
    let call = CallData::from_body(&plain).map_err(|_| LedgerError::DecryptionFailed)?;

    Ok(DecodedEnvelope {
        selector: call.selector,
        args: call.args,
        integrity_tag: frame.tag,
        confidential: true,
        nonce: Some(nonce),
    })
}

// =============================================================================
// TESTS
// =============================================================================
