//! # Ledger Configuration
//!
//! Limits and policies for the engine. Defaults are usable as-is; deployments
//! load a TOML file and apply `CL_*` environment overrides on top.
//!
//! ```toml
//! max_forward_depth = 8
//! replay_window = 4096
//! require_sealed_for_ring_units = true
//!
//! [ring]
//! capacity = 7
//! grace = 0
//! eviction = "fifo"
//! ```

use crate::errors::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Largest accepted ring capacity.
pub const MAX_RING_CAPACITY: usize = 1024;

/// Largest accepted relay hop limit. Each hop is a nested engine call.
pub const MAX_FORWARD_DEPTH: u16 = 64;

/// Largest accepted replay window, in nonces per ledger.
pub const MAX_REPLAY_WINDOW: usize = 1 << 20;

/// What happens when a rotation hits a full ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the oldest key.
    #[default]
    Fifo,
    /// Refuse the rotation with `RingCapacityExceeded`.
    Reject,
}

/// Ring key manager settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingConfig {
    /// Maximum number of active keys (K).
    pub capacity: usize,
    /// Number of evicted keys kept as decryption fallbacks.
    pub grace: usize,
    /// Behaviour at capacity.
    pub eviction: EvictionPolicy,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: 7,
            grace: 0,
            eviction: EvictionPolicy::Fifo,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Ring settings applied to every newly allocated ledger.
    pub ring: RingConfig,
    /// Maximum relay hops before a forward is treated as unreachable.
    pub max_forward_depth: u16,
    /// Sealed-envelope nonces remembered per ledger for replay detection.
    pub replay_window: usize,
    /// Ring-key units reject plain envelopes.
    pub require_sealed_for_ring_units: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ring: RingConfig::default(),
            max_forward_depth: 8,
            replay_window: 4096,
            require_sealed_for_ring_units: true,
        }
    }
}

/// Configuration file structure. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_forward_depth: Option<u16>,
    replay_window: Option<usize>,
    require_sealed_for_ring_units: Option<bool>,
    #[serde(default)]
    ring: RingConfigFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RingConfigFile {
    capacity: Option<usize>,
    grace: Option<usize>,
    eviction: Option<EvictionPolicy>,
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns error on malformed TOML, unknown keys, or invalid values.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();
        let config = Self {
            ring: RingConfig {
                capacity: file.ring.capacity.unwrap_or(defaults.ring.capacity),
                grace: file.ring.grace.unwrap_or(defaults.ring.grace),
                eviction: file.ring.eviction.unwrap_or(defaults.ring.eviction),
            },
            max_forward_depth: file.max_forward_depth.unwrap_or(defaults.max_forward_depth),
            replay_window: file.replay_window.unwrap_or(defaults.replay_window),
            require_sealed_for_ring_units: file
                .require_sealed_for_ring_units
                .unwrap_or(defaults.require_sealed_for_ring_units),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `CL_RING_CAPACITY`: ring capacity K
    /// - `CL_RING_GRACE`: evicted keys kept for decryption
    /// - `CL_RING_EVICTION`: `fifo` or `reject`
    /// - `CL_MAX_FORWARD_DEPTH`: relay hop limit
    /// - `CL_REPLAY_WINDOW`: remembered nonces per ledger
    /// - `CL_REQUIRE_SEALED`: ring units reject plain envelopes (`true`/`false`)
    ///
    /// Unparseable values are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(capacity) = env_parse("CL_RING_CAPACITY") {
            self.ring.capacity = capacity;
        }
        if let Some(grace) = env_parse("CL_RING_GRACE") {
            self.ring.grace = grace;
        }
        match env::var("CL_RING_EVICTION").map(|v| v.to_lowercase()).as_deref() {
            Ok("fifo") => self.ring.eviction = EvictionPolicy::Fifo,
            Ok("reject") => self.ring.eviction = EvictionPolicy::Reject,
            _ => {}
        }
        if let Some(depth) = env_parse("CL_MAX_FORWARD_DEPTH") {
            self.max_forward_depth = depth;
        }
        if let Some(window) = env_parse("CL_REPLAY_WINDOW") {
            self.replay_window = window;
        }
        if let Ok(v) = env::var("CL_REQUIRE_SEALED") {
            self.require_sealed_for_ring_units = v.to_lowercase() == "true" || v == "1";
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RING_CAPACITY).contains(&self.ring.capacity) {
            return Err(ConfigError::Invalid {
                field: "ring.capacity",
                reason: format!("must be between 1 and {MAX_RING_CAPACITY}"),
            });
        }
        if self.ring.grace > self.ring.capacity {
            return Err(ConfigError::Invalid {
                field: "ring.grace",
                reason: format!("must not exceed ring.capacity ({})", self.ring.capacity),
            });
        }
        if !(1..=MAX_FORWARD_DEPTH).contains(&self.max_forward_depth) {
            return Err(ConfigError::Invalid {
                field: "max_forward_depth",
                reason: format!("must be between 1 and {MAX_FORWARD_DEPTH}"),
            });
        }
        if !(1..=MAX_REPLAY_WINDOW).contains(&self.replay_window) {
            return Err(ConfigError::Invalid {
                field: "replay_window",
                reason: format!("must be between 1 and {MAX_REPLAY_WINDOW}"),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// =============================================================================
// TESTS
// =============================================================================
