//! Feed session - the interface the game layer consumes
//!
//! A [`PieceFeed`] owns the policy registry, one [`Unpacker`] and, for remote
//! sources, a handle used for quota checks. Everything is built explicitly from a
//! [`FeedConfig`] and dropped with the session.

use thiserror::Error;
use tracing::info;

use crate::config::{FeedConfig, SourceKind};
use crate::core::{
    BoxedSource, ConstantSource, GeneratorError, PolicyKind, PolicyRegistry, SeededSource,
    SharedSource, SourceError, Unpacker,
};
use crate::remote::{open_random_org, IntegerCache, RemoteBufferedSource};
use crate::types::{PieceId, PieceKind};

/// Handle to a remote source shared with the unpacker.
pub type RemoteHandle = SharedSource<RemoteBufferedSource<IntegerCache>>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The active policy/source pair produced an id with no tetromino.
    #[error("piece id {0} does not name a tetromino")]
    NotAPiece(PieceId),
}

/// A freshly built source, plus the remote handle when there is one.
pub struct BuiltSource {
    pub source: BoxedSource,
    pub remote: Option<RemoteHandle>,
}

/// Construct the source named by `kind`.
///
/// Remote sources block until their initial fill completes.
pub fn build_source(kind: SourceKind, config: &FeedConfig) -> Result<BuiltSource, FeedError> {
    info!(source = %kind, "building source");
    let built = match kind {
        SourceKind::Seeded { seed } => BuiltSource {
            source: Box::new(SeededSource::pieces(seed)),
            remote: None,
        },
        SourceKind::Constant(value) => BuiltSource {
            source: Box::new(ConstantSource::new(value)),
            remote: None,
        },
        SourceKind::Remote => {
            let handle = SharedSource::new(open_random_org(&config.remote)?);
            BuiltSource {
                source: Box::new(handle.clone()),
                remote: Some(handle),
            }
        }
    };
    Ok(built)
}

pub struct PieceFeed {
    registry: PolicyRegistry,
    unpacker: Unpacker,
    policy: PolicyKind,
    remote: Option<RemoteHandle>,
}

impl PieceFeed {
    /// Build a feed from `config` with the standard policy registry.
    pub fn open(config: &FeedConfig) -> Result<Self, FeedError> {
        let registry = PolicyRegistry::standard(config.max_draws);
        let built = build_source(config.source, config)?;
        let mut feed = Self::from_parts(registry, config.policy, built.source)?;
        feed.remote = built.remote;
        info!(policy = %config.policy, source = %config.source, "feed opened");
        Ok(feed)
    }

    /// Build a feed from an explicit registry and source.
    pub fn from_parts(
        registry: PolicyRegistry,
        policy: PolicyKind,
        source: BoxedSource,
    ) -> Result<Self, FeedError> {
        let unpacker = Unpacker::new(registry.get(policy)?, source);
        Ok(Self {
            registry,
            unpacker,
            policy,
            remote: None,
        })
    }

    /// Next piece id.
    pub fn next_piece_id(&mut self) -> Result<PieceId, GeneratorError> {
        self.unpacker.next()
    }

    /// Next piece, mapped to its kind.
    pub fn next_piece(&mut self) -> Result<PieceKind, FeedError> {
        let id = self.unpacker.next()?;
        PieceKind::from_id(id).ok_or(FeedError::NotAPiece(id))
    }

    /// The next `n` ids. Consumes them, like `n` calls to [`next_piece_id`](Self::next_piece_id).
    pub fn preview_piece_ids(&mut self, n: usize) -> Result<Vec<PieceId>, GeneratorError> {
        self.unpacker.preview(n)
    }

    /// Switch policy. Pieces already pending are still served first.
    pub fn swap_policy(&mut self, kind: PolicyKind) -> Result<(), FeedError> {
        let policy = self.registry.get(kind)?;
        self.unpacker.set_policy(policy);
        self.policy = kind;
        Ok(())
    }

    /// Switch source, returning the old one. Pieces already pending are kept.
    pub fn swap_source(&mut self, source: BoxedSource) -> BoxedSource {
        self.remote = None;
        self.unpacker.set_source(source)
    }

    /// Switch to a source built from `kind`.
    pub fn swap_source_kind(
        &mut self,
        kind: SourceKind,
        config: &FeedConfig,
    ) -> Result<BoxedSource, FeedError> {
        let built = build_source(kind, config)?;
        let old = self.unpacker.set_source(built.source);
        self.remote = built.remote;
        Ok(old)
    }

    /// Switch policy and source together.
    pub fn reconfigure(
        &mut self,
        kind: PolicyKind,
        source: BoxedSource,
    ) -> Result<BoxedSource, FeedError> {
        let policy = self.registry.get(kind)?;
        self.policy = kind;
        self.remote = None;
        Ok(self.unpacker.reconfigure(policy, source))
    }

    /// Remaining remote allowance, or `None` for local sources.
    pub fn check_quota(&mut self) -> Result<Option<i64>, FeedError> {
        match &self.remote {
            Some(handle) => Ok(Some(handle.with(|source| source.check_quota())?)),
            None => Ok(None),
        }
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn registry_mut(&mut self) -> &mut PolicyRegistry {
        &mut self.registry
    }

    pub fn unpacker(&self) -> &Unpacker {
        &self.unpacker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceSource;
    use crate::types::DEFAULT_MAX_DRAWS_PER_BAG;

    #[test]
    fn test_open_seeded_feed() {
        let mut feed = PieceFeed::open(&FeedConfig::default()).unwrap();
        let mut ids = feed.preview_piece_ids(7).unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(feed.check_quota().unwrap(), None);
    }

    #[test]
    fn test_remote_without_key_fails_fast() {
        let config = FeedConfig {
            source: SourceKind::Remote,
            ..FeedConfig::default()
        };
        let err = PieceFeed::open(&config).err().unwrap();
        assert!(matches!(
            err,
            FeedError::Source(SourceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_next_piece_rejects_non_piece_ids() {
        let registry = PolicyRegistry::standard(DEFAULT_MAX_DRAWS_PER_BAG);
        let mut feed = PieceFeed::from_parts(
            registry,
            PolicyKind::PassThrough,
            Box::new(SequenceSource::new([2, 9])),
        )
        .unwrap();

        assert_eq!(feed.next_piece().unwrap(), PieceKind::J);
        assert!(matches!(feed.next_piece(), Err(FeedError::NotAPiece(9))));
    }

    #[test]
    fn test_swap_to_unknown_custom_policy_fails() {
        let mut feed = PieceFeed::open(&FeedConfig::default()).unwrap();
        let err = feed.swap_policy(PolicyKind::Custom("missing")).unwrap_err();
        assert!(matches!(
            err,
            FeedError::Generator(GeneratorError::UnknownPolicy(_))
        ));
        assert_eq!(feed.policy(), PolicyKind::OneOfEach);
    }
}
