//! Runtime configuration.
//!
//! Resolved from the environment on first use and cached for the process:
//! - `TFLITEFMT_MODE`: `strict` (default) rejects malformed directives and
//!   oversized output with a NULL return. `hardened` repairs instead: a bad
//!   `%` is copied literally and output is truncated at the limit.
//! - `TFLITEFMT_MAX_LEN`: output limit in bytes (default 1 MiB). `0` or
//!   `unlimited` removes the limit.
//!
//! Hosts that cannot set environment variables (Android players) pin a
//! configuration with [`set_runtime_config`] instead. A pin wins over a
//! resolution still in flight on another thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Default output limit.
pub const DEFAULT_MAX_LEN: usize = 1 << 20;

pub const MODE_ENV: &str = "TFLITEFMT_MODE";
pub const MAX_LEN_ENV: &str = "TFLITEFMT_MAX_LEN";

/// Operating mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyLevel {
    /// Reject malformed input and oversized output.
    #[default]
    Strict,
    /// Repair instead of rejecting.
    Hardened,
}

impl SafetyLevel {
    /// Parse from string (case-insensitive). Unknown values are strict.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardened" | "repair" | "lenient" => Self::Hardened,
            _ => Self::Strict,
        }
    }

    #[must_use]
    pub const fn heals_enabled(self) -> bool {
        matches!(self, Self::Hardened)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Hardened => "hardened",
        }
    }
}

/// A resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub level: SafetyLevel,
    /// `None` means unlimited.
    pub max_len: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            level: SafetyLevel::Strict,
            max_len: Some(DEFAULT_MAX_LEN),
        }
    }
}

impl RuntimeConfig {
    /// Build from a variable lookup; `std::env::var` in production.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let level = lookup(MODE_ENV)
            .map(|v| SafetyLevel::from_str_loose(&v))
            .unwrap_or_default();
        let max_len = lookup(MAX_LEN_ENV).map_or(Some(DEFAULT_MAX_LEN), |v| parse_max_len(&v));
        Self { level, max_len }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_max_len(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unlimited") {
        return None;
    }
    match raw.parse::<usize>() {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => Some(DEFAULT_MAX_LEN),
    }
}

// The whole configuration lives in one word so readers never see a level
// from one configuration and a limit from another:
//   bits 62..64  state (unresolved, resolving, ready)
//   bits 60..62  level
//   bits  0..60  max_len, all ones = unlimited
const STATE_SHIFT: u32 = 62;
const LEVEL_SHIFT: u32 = 60;
const LIMIT_MASK: u64 = (1 << LEVEL_SHIFT) - 1;

const STATE_UNRESOLVED: u64 = 0;
const STATE_RESOLVING: u64 = 1;
const STATE_READY: u64 = 2;

const LEVEL_STRICT: u64 = 1;
const LEVEL_HARDENED: u64 = 2;

const fn state_of(word: u64) -> u64 {
    word >> STATE_SHIFT
}

/// Limits of 2^60 bytes or more cannot be allocated anyway; they read back
/// as unlimited.
fn encode(config: RuntimeConfig) -> u64 {
    let level = match config.level {
        SafetyLevel::Strict => LEVEL_STRICT,
        SafetyLevel::Hardened => LEVEL_HARDENED,
    };
    let limit = config
        .max_len
        .and_then(|n| u64::try_from(n).ok())
        .map_or(LIMIT_MASK, |n| n.min(LIMIT_MASK));
    (STATE_READY << STATE_SHIFT) | (level << LEVEL_SHIFT) | limit
}

fn decode(word: u64) -> RuntimeConfig {
    let level = match (word >> LEVEL_SHIFT) & 0b11 {
        LEVEL_HARDENED => SafetyLevel::Hardened,
        _ => SafetyLevel::Strict,
    };
    let max_len = match word & LIMIT_MASK {
        LIMIT_MASK => None,
        n => usize::try_from(n).ok(),
    };
    RuntimeConfig { level, max_len }
}

/// A configuration resolved once from a variable lookup, unless pinned.
///
/// A pin always wins: the resolver commits with a compare-exchange from the
/// resolving state, which fails if a pin landed while it was reading.
pub struct ConfigCell {
    word: AtomicU64,
}

impl ConfigCell {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(STATE_UNRESOLVED << STATE_SHIFT),
        }
    }

    /// The configuration, resolving it through `lookup` on first use.
    pub fn get_or_resolve(&self, lookup: impl Fn(&str) -> Option<String>) -> RuntimeConfig {
        let word = self.word.load(Ordering::Acquire);
        match state_of(word) {
            STATE_READY => return decode(word),
            // Another thread is reading the environment; read it too rather
            // than wait, but leave the commit to that thread.
            STATE_RESOLVING => return RuntimeConfig::from_lookup(lookup),
            _ => {}
        }

        let resolving = STATE_RESOLVING << STATE_SHIFT;
        if let Err(current) =
            self.word
                .compare_exchange(word, resolving, Ordering::AcqRel, Ordering::Acquire)
        {
            return if state_of(current) == STATE_READY {
                decode(current)
            } else {
                RuntimeConfig::from_lookup(lookup)
            };
        }

        let config = RuntimeConfig::from_lookup(lookup);
        match self.word.compare_exchange(
            resolving,
            encode(config),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => config,
            // Pinned while we were resolving.
            Err(pinned) => decode(pinned),
        }
    }

    /// Pin `config`, overriding whatever was resolved or is being resolved.
    pub fn pin(&self, config: RuntimeConfig) {
        self.word.store(encode(config), Ordering::Release);
    }
}

impl Default for ConfigCell {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_CONFIG: ConfigCell = ConfigCell::new();

/// The process configuration (reads the environment on first call).
#[must_use]
pub fn runtime_config() -> RuntimeConfig {
    GLOBAL_CONFIG.get_or_resolve(|key| std::env::var(key).ok())
}

/// Pin the process configuration, overriding the environment.
pub fn set_runtime_config(config: RuntimeConfig) {
    GLOBAL_CONFIG.pin(config);
}
