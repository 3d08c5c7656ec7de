//! Outer frame: header, body, integrity tag.
//!
//! ```text
//! version:u8 | kind:u8 | body_len:u32 BE | body | tag:[u8; 32]
//! ```

use crate::errors::LedgerError;
use cl_crypto::{blake3_derive_key, blake3_keyed_hash};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

/// Only supported frame version.
pub const FRAME_VERSION: u8 = 1;

/// version + kind + body_len.
pub const HEADER_LEN: usize = 6;

/// Integrity tag length.
pub const TAG_LEN: usize = 32;

const INTEGRITY_CONTEXT: &str = "cl-ledger 2024 envelope integrity v1";

/// Body encoding carried by a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Plain call body.
    Plain,
    /// Call body sealed to a ring key.
    Sealed,
}

impl FrameKind {
    const fn to_byte(self) -> u8 {
        match self {
            Self::Plain => 0,
            Self::Sealed => 1,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Plain),
            1 => Some(Self::Sealed),
            _ => None,
        }
    }
}

/// Parsed frame borrowing the raw envelope.
#[derive(Debug)]
pub struct Frame<'a> {
    /// Body kind.
    pub kind: FrameKind,
    /// Header bytes; AAD for sealed bodies.
    pub header: [u8; HEADER_LEN],
    /// Body bytes.
    pub body: &'a [u8],
    /// Verified integrity tag.
    pub tag: [u8; TAG_LEN],
}

/// Header for a body of `body_len` bytes.
///
/// # Errors
///
/// `MalformedEnvelope` if the body does not fit a `u32` length.
pub fn header(kind: FrameKind, body_len: usize) -> Result<[u8; HEADER_LEN], LedgerError> {
    let len = u32::try_from(body_len)
        .map_err(|_| LedgerError::MalformedEnvelope("body exceeds u32 length"))?;
    let mut header = [0u8; HEADER_LEN];
    header[0] = FRAME_VERSION;
    header[1] = kind.to_byte();
    header[2..].copy_from_slice(&len.to_be_bytes());
    Ok(header)
}

/// Assemble `header | body | tag`.
#[must_use]
pub fn assemble(header: &[u8; HEADER_LEN], body: &[u8]) -> Vec<u8> {
    let tag = integrity_tag(header, body);
    let mut raw = Vec::with_capacity(HEADER_LEN + body.len() + TAG_LEN);
    raw.extend_from_slice(header);
    raw.extend_from_slice(body);
    raw.extend_from_slice(&tag);
    raw
}

/// Parse and verify a frame.
///
/// # Errors
///
/// `MalformedEnvelope` on a short header, unknown version or kind, a length
/// that disagrees with the buffer, or a tag mismatch.
pub fn parse(raw: &[u8]) -> Result<Frame<'_>, LedgerError> {
    if raw.len() < HEADER_LEN {
        return Err(LedgerError::MalformedEnvelope("short header"));
    }
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&raw[..HEADER_LEN]);

    if header[0] != FRAME_VERSION {
        return Err(LedgerError::MalformedEnvelope("unsupported version"));
    }
    let kind = FrameKind::from_byte(header[1])
        .ok_or(LedgerError::MalformedEnvelope("unknown frame kind"))?;

    let body_len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
    let expected = HEADER_LEN
        .checked_add(body_len)
        .and_then(|n| n.checked_add(TAG_LEN))
        .ok_or(LedgerError::MalformedEnvelope("length overflow"))?;
    if raw.len() < expected {
        return Err(LedgerError::MalformedEnvelope("truncated frame"));
    }
    if raw.len() > expected {
        return Err(LedgerError::MalformedEnvelope("trailing bytes after tag"));
    }

    let body = &raw[HEADER_LEN..HEADER_LEN + body_len];
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&raw[HEADER_LEN + body_len..]);

    let expected_tag = integrity_tag(&header, body);
    if !bool::from(expected_tag.ct_eq(&tag)) {
        return Err(LedgerError::MalformedEnvelope("integrity tag mismatch"));
    }

    Ok(Frame {
        kind,
        header,
        body,
        tag,
    })
}

/// Integrity key, derived once per process.
fn integrity_key() -> &'static [u8; 32] {
    static KEY: OnceLock<[u8; 32]> = OnceLock::new();
    KEY.get_or_init(|| blake3_derive_key(INTEGRITY_CONTEXT, &[]))
}

fn integrity_tag(header: &[u8; HEADER_LEN], body: &[u8]) -> [u8; TAG_LEN] {
    let mut data = Vec::with_capacity(HEADER_LEN + body.len());
    data.extend_from_slice(header);
    data.extend_from_slice(body);
    blake3_keyed_hash(integrity_key(), &data)
}
