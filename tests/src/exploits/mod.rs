//! # Exploit Simulations
//!
//! Hostile inputs: tampered, truncated, replayed and misdirected envelopes,
//! and attempts to escape the unit lifecycle.

pub mod envelope_tampering;
pub mod lifecycle_abuse;
