//! # Integration Scenarios
//!
//! Full submissions through `LedgerService`: codec, dispatcher, lifecycle,
//! ring and relay together.

pub mod relay_flows;
pub mod ring_rotation;
pub mod token_flows;
