//! Core feed logic - pure, deterministic, and testable
//!
//! This crate turns a stream of raw integers into a policy-governed stream of
//! piece ids. It has **no dependencies** on rendering, input, or networking:
//!
//! - **Deterministic**: a seeded source and a policy always produce the same pieces
//! - **Pluggable**: sources and policies are traits; new ones need no changes here
//! - **Bounded**: rejection policies carry an explicit draw budget per bag
//!
//! # Module Structure
//!
//! - [`source`]: the [`IntegerSource`] trait and local sources
//! - [`rng`]: seeded LCG backing the local source
//! - [`policy`]: the [`BagPolicy`] trait and canonical policies
//! - [`registry`]: [`PolicyKind`] identifiers mapped to policy instances
//! - [`unpacker`]: pending queue, single-piece and preview access, hot swap
//! - [`error`]: [`SourceError`] and [`GeneratorError`]
//!
//! # Pipeline
//!
//! ```text
//! Unpacker::next() ── pending empty? ──> BagPolicy::pack(source) ──> IntegerSource::draw() * k
//!        ^                                        │
//!        └──────────── bag appended ──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tetromino_feed_core::{OneOfEach, SeededSource, Unpacker};
//!
//! let mut unpacker = Unpacker::new(
//!     Arc::new(OneOfEach::default()),
//!     Box::new(SeededSource::pieces(9001)),
//! );
//!
//! let mut bag = unpacker.preview(7).unwrap();
//! bag.sort();
//! assert_eq!(bag, vec![1, 2, 3, 4, 5, 6, 7]);
//! ```

pub mod error;
pub mod policy;
pub mod registry;
pub mod rng;
pub mod source;
pub mod unpacker;

pub use tetromino_feed_types as types;

// Re-export commonly used types for convenience
pub use error::{GeneratorError, SourceError};
pub use policy::{fill_by_rejection, Bag, BagPolicy, FilteredRepeat, OneOfEach, PassThrough};
pub use registry::{PolicyKind, PolicyRegistry};
pub use rng::SimpleRng;
pub use source::{
    BoxedSource, ConstantSource, CountingSource, IntegerSource, SeededSource, SequenceSource,
    SharedSource,
};
pub use unpacker::Unpacker;
