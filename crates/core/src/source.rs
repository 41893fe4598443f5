//! Integer sources - where raw draws come from
//!
//! An [`IntegerSource`] yields one raw integer per call. Sources are explicitly
//! constructed and owned by whoever drives the pipeline; nothing here is a
//! process-wide singleton.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::error::SourceError;
use crate::rng::SimpleRng;
use crate::types::{PieceId, PIECE_ID_MAX, PIECE_ID_MIN};

/// One raw integer per request.
pub trait IntegerSource {
    /// Draw the next raw value.
    fn draw(&mut self) -> Result<PieceId, SourceError>;
}

impl<S: IntegerSource + ?Sized> IntegerSource for Box<S> {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        (**self).draw()
    }
}

impl<S: IntegerSource + ?Sized> IntegerSource for &mut S {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        (**self).draw()
    }
}

/// Owned, type-erased source as stored by the unpacker.
pub type BoxedSource = Box<dyn IntegerSource + Send>;

/// Local deterministic source: a seeded [`SimpleRng`] over an inclusive range.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: SimpleRng,
    lo: PieceId,
    hi: PieceId,
}

impl SeededSource {
    /// Seed once and draw from `[lo, hi]`.
    pub fn new(seed: u32, lo: PieceId, hi: PieceId) -> Result<Self, SourceError> {
        if lo > hi {
            return Err(SourceError::InvalidConfig(format!(
                "empty range [{}, {}]",
                lo, hi
            )));
        }
        Ok(Self {
            rng: SimpleRng::new(seed),
            lo,
            hi,
        })
    }

    /// Seeded source over the canonical piece range.
    pub fn pieces(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            lo: PIECE_ID_MIN,
            hi: PIECE_ID_MAX,
        }
    }

    pub fn range(&self) -> (PieceId, PieceId) {
        (self.lo, self.hi)
    }
}

impl IntegerSource for SeededSource {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        let value = self.rng.draw_in_range(self.lo, self.hi);
        trace!(value, "seeded source draw");
        Ok(value)
    }
}

/// Always returns the same value. Useful for debugging policies.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource {
    value: PieceId,
}

impl ConstantSource {
    pub fn new(value: PieceId) -> Self {
        Self { value }
    }
}

impl IntegerSource for ConstantSource {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        Ok(self.value)
    }
}

/// Replays a fixed sequence, then reports [`SourceError::Exhausted`].
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<PieceId>,
    cursor: usize,
}

impl SequenceSource {
    pub fn new(values: impl Into<Vec<PieceId>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Values not yet drawn.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

impl IntegerSource for SequenceSource {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        let value = *self
            .values
            .get(self.cursor)
            .ok_or(SourceError::Exhausted {
                drawn: self.cursor,
            })?;
        self.cursor += 1;
        Ok(value)
    }
}

/// Counts draws passing through to the wrapped source.
#[derive(Debug, Clone)]
pub struct CountingSource<S> {
    inner: S,
    draws: u64,
}

impl<S: IntegerSource> CountingSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, draws: 0 }
    }

    /// Successful draws so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: IntegerSource> IntegerSource for CountingSource<S> {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        let value = self.inner.draw()?;
        self.draws += 1;
        Ok(value)
    }
}

/// Cloneable handle to a source behind a mutex.
///
/// One clone can sit inside an unpacker while another keeps access to the
/// concrete source (for example to query a remote quota).
pub struct SharedSource<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> SharedSource<S> {
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(source)),
        }
    }

    /// Run `f` with exclusive access to the source.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S> Clone for SharedSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: IntegerSource> IntegerSource for SharedSource<S> {
    fn draw(&mut self) -> Result<PieceId, SourceError> {
        self.with(|source| source.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_source_is_deterministic() {
        let mut a = SeededSource::pieces(9001);
        let mut b = SeededSource::pieces(9001);
        for _ in 0..50 {
            assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        }
    }

    #[test]
    fn test_seeded_source_stays_in_range() {
        let mut source = SeededSource::new(3, 2, 5).unwrap();
        for _ in 0..200 {
            let v = source.draw().unwrap();
            assert!((2..=5).contains(&v));
        }
        assert_eq!(source.range(), (2, 5));
    }

    #[test]
    fn test_seeded_source_rejects_empty_range() {
        let err = SeededSource::new(1, 5, 2).unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig(_)));
    }

    #[test]
    fn test_sequence_source_exhausts() {
        let mut source = SequenceSource::new([3, 1]);
        assert_eq!(source.draw(), Ok(3));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.draw(), Ok(1));
        assert_eq!(source.draw(), Err(SourceError::Exhausted { drawn: 2 }));
    }

    #[test]
    fn test_counting_source() {
        let mut source = CountingSource::new(ConstantSource::new(1));
        for _ in 0..5 {
            assert_eq!(source.draw(), Ok(1));
        }
        assert_eq!(source.draws(), 5);
    }

    #[test]
    fn test_counting_source_hands_back_inner() {
        let mut source = CountingSource::new(SequenceSource::new([6, 2, 4]));
        source.draw().unwrap();

        let inner = source.into_inner();
        assert_eq!(inner.remaining(), 2);
    }

    #[test]
    fn test_shared_source_clones_see_same_state() {
        let shared = SharedSource::new(SequenceSource::new([1, 2, 3]));
        let mut handle = shared.clone();

        assert_eq!(handle.draw(), Ok(1));
        assert_eq!(shared.with(|s| s.remaining()), 2);
    }

    #[test]
    fn test_boxed_source_draws() {
        let mut boxed: BoxedSource = Box::new(ConstantSource::new(4));
        assert_eq!(boxed.draw(), Ok(4));
    }
}
