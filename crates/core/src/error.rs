//! Error types for the feed pipeline.
//!
//! Two layers: [`SourceError`] is what an integer source can report, and
//! [`GeneratorError`] is what crosses the policy/unpacker boundary. Recoverable
//! conditions (buffer underrun, "not ready yet") never show up here; they are
//! absorbed by the source that owns them.

use std::time::Duration;

use thiserror::Error;

use crate::types::PieceId;

/// Failure reported by an [`IntegerSource`](crate::source::IntegerSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// A remote wait or request ran past its configured bound.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },
    /// The remote provider answered with an error object.
    #[error("remote error {code}: {message}")]
    Remote { code: i64, message: String },
    /// Connection-level failure talking to the remote provider.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote provider answered with something we cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// A drawn value fell outside the range the source promised.
    #[error("value {value} outside [{lo}, {hi}]")]
    OutOfRange { value: i64, lo: PieceId, hi: PieceId },
    /// A finite source has nothing left to give.
    #[error("source exhausted after {drawn} draws")]
    Exhausted { drawn: usize },
    /// The source was constructed with parameters it cannot honour.
    #[error("invalid source configuration: {0}")]
    InvalidConfig(String),
}

/// Failure surfaced by bag policies and the unpacker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A rejection policy spent its whole draw budget without filling the bag.
    #[error("policy '{policy}' filled {accepted}/{target} after {draws} raw draws")]
    PolicyDefect {
        policy: String,
        target: usize,
        accepted: usize,
        draws: u32,
    },
    /// A policy handed back a bag with nothing in it.
    #[error("policy '{policy}' produced an empty bag")]
    EmptyBag { policy: String },
    /// The policy was configured with a size that cannot be built.
    #[error("policy '{policy}' asks for {size} values, bag capacity is {capacity}")]
    BagTooLarge {
        policy: String,
        size: usize,
        capacity: usize,
    },
    /// Preview length must be at least one.
    #[error("invalid preview length {requested}")]
    InvalidPreview { requested: usize },
    #[error("no policy registered for '{0}'")]
    UnknownPolicy(String),
}

impl GeneratorError {
    /// True for programming/configuration defects, as opposed to runtime
    /// failures of the underlying source.
    pub fn is_defect(&self) -> bool {
        !matches!(self, GeneratorError::Source(_))
    }
}
