//! Feed configuration
//!
//! Selects the integer source and bag policy by name and carries the remote
//! settings. Values come from environment variables; anything missing or
//! unparseable falls back to its default.
//!
//! - `TETROMINO_SOURCE`: `seeded` (default), `constant[:id]`, `remote`
//! - `TETROMINO_POLICY`: any name [`PolicyKind::from_str`] accepts (default: `one-of-each`)
//! - `TETROMINO_SEED`: seed for the seeded source (default: 9001)
//! - `TETROMINO_MAX_DRAWS`: raw draws per bag before a policy is declared defective
//! - `TETROMINO_REMOTE_*`: see [`RemoteConfig`]

use std::env;
use std::fmt;

use tracing::warn;

use crate::core::PolicyKind;
use crate::remote::RemoteConfig;
use crate::types::{PieceId, DEFAULT_MAX_DRAWS_PER_BAG, DEFAULT_SEED, PIECE_ID_MIN};

/// Which integer source to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Local seeded generator over the piece range.
    Seeded { seed: u32 },
    /// The same value forever.
    Constant(PieceId),
    /// random.org behind a local buffer.
    Remote,
}

impl SourceKind {
    /// Parse a source name
    ///
    /// # Examples
    ///
    /// ```
    /// use tetromino_feed::config::SourceKind;
    ///
    /// assert_eq!(SourceKind::from_str("seeded", 7), Some(SourceKind::Seeded { seed: 7 }));
    /// assert_eq!(SourceKind::from_str("ones", 7), Some(SourceKind::Constant(1)));
    /// assert_eq!(SourceKind::from_str("constant:5", 7), Some(SourceKind::Constant(5)));
    /// assert_eq!(SourceKind::from_str("random.org", 7), Some(SourceKind::Remote));
    /// assert_eq!(SourceKind::from_str("dice", 7), None);
    /// ```
    pub fn from_str(s: &str, seed: u32) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "seeded" | "local" | "randint17" => Some(SourceKind::Seeded { seed }),
            "constant" | "ones" => Some(SourceKind::Constant(PIECE_ID_MIN)),
            "remote" | "randomorg" | "random.org" => Some(SourceKind::Remote),
            _ => {
                let value = lower.strip_prefix("constant:")?;
                value.parse().ok().map(SourceKind::Constant)
            }
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Seeded { seed } => write!(f, "seeded({})", seed),
            SourceKind::Constant(value) => write!(f, "constant:{}", value),
            SourceKind::Remote => write!(f, "remote"),
        }
    }
}

/// Complete feed configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub source: SourceKind,
    pub policy: PolicyKind,
    pub max_draws: u32,
    pub remote: RemoteConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Seeded { seed: DEFAULT_SEED },
            policy: PolicyKind::OneOfEach,
            max_draws: DEFAULT_MAX_DRAWS_PER_BAG,
            remote: RemoteConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = lookup("TETROMINO_SEED")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_SEED);

        let source = match lookup("TETROMINO_SOURCE") {
            Some(name) => SourceKind::from_str(&name, seed).unwrap_or_else(|| {
                warn!(name = %name, "unknown source, using seeded");
                SourceKind::Seeded { seed }
            }),
            None => SourceKind::Seeded { seed },
        };

        let policy = match lookup("TETROMINO_POLICY") {
            Some(name) => PolicyKind::from_str(&name).unwrap_or_else(|| {
                warn!(name = %name, "unknown policy, using one-of-each");
                defaults.policy
            }),
            None => defaults.policy,
        };

        let max_draws = lookup("TETROMINO_MAX_DRAWS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_draws);

        Self {
            source,
            policy,
            max_draws,
            remote: RemoteConfig::from_lookup(&lookup),
        }
    }
}
