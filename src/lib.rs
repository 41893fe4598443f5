//! Tetromino feed (workspace facade crate).
//!
//! Re-exports the implementation crates under `crates/` as
//! `tetromino_feed::{core,remote,types}` and adds the configuration and session
//! layer that wires a source and a policy into a [`PieceFeed`](session::PieceFeed).

pub use tetromino_feed_core as core;
pub use tetromino_feed_remote as remote;
pub use tetromino_feed_types as types;

pub mod config;
pub mod session;

pub use config::{FeedConfig, SourceKind};
pub use session::{build_source, BuiltSource, FeedError, PieceFeed};
