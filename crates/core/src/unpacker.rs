//! Unpacker - serves single pieces and previews out of policy-built bags
//!
//! The unpacker owns one policy and one source. It keeps a pending queue with
//! whatever is left of the current bag and asks the policy for a new bag only
//! when that queue is empty.
//!
//! Swapping the policy or the source never touches the pending queue: values
//! already chosen are still handed out first, in order, and only the next refill
//! uses the new pair.
//!
//! The unpacker is plain mutable state. Callers that share one across threads
//! wrap it in a mutex.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::error::GeneratorError;
use crate::policy::BagPolicy;
use crate::source::BoxedSource;
use crate::types::PieceId;

pub struct Unpacker {
    policy: Arc<dyn BagPolicy>,
    source: BoxedSource,
    pending: VecDeque<PieceId>,
    bags_packed: u64,
}

impl Unpacker {
    /// Create an unpacker with an empty pending queue.
    pub fn new(policy: Arc<dyn BagPolicy>, source: BoxedSource) -> Self {
        debug!(policy = policy.name(), "initialized unpacker");
        Self {
            policy,
            source,
            pending: VecDeque::new(),
            bags_packed: 0,
        }
    }

    /// Next piece id, packing a new bag first if the pending queue is empty.
    pub fn next(&mut self) -> Result<PieceId, GeneratorError> {
        if self.pending.is_empty() {
            self.refill()?;
        }

        self.pending
            .pop_front()
            .ok_or_else(|| GeneratorError::EmptyBag {
                policy: self.policy.name().to_string(),
            })
    }

    /// The next `n` piece ids, in order.
    ///
    /// This consumes: it is exactly `n` calls to [`Unpacker::next`]. Two previews in
    /// a row return different pieces.
    pub fn preview(&mut self, n: usize) -> Result<Vec<PieceId>, GeneratorError> {
        if n == 0 {
            return Err(GeneratorError::InvalidPreview { requested: n });
        }

        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.next()?);
        }
        Ok(out)
    }

    /// Replace policy and source. Pending values are kept and served first.
    pub fn reconfigure(&mut self, policy: Arc<dyn BagPolicy>, source: BoxedSource) -> BoxedSource {
        debug!(
            from = self.policy.name(),
            to = policy.name(),
            pending = self.pending.len(),
            "reconfigured unpacker"
        );
        self.policy = policy;
        std::mem::replace(&mut self.source, source)
    }

    /// Replace only the policy.
    pub fn set_policy(&mut self, policy: Arc<dyn BagPolicy>) {
        debug!(
            from = self.policy.name(),
            to = policy.name(),
            pending = self.pending.len(),
            "changed policy"
        );
        self.policy = policy;
    }

    /// Replace only the source, returning the previous one.
    pub fn set_source(&mut self, source: BoxedSource) -> BoxedSource {
        debug!(pending = self.pending.len(), "changed source");
        std::mem::replace(&mut self.source, source)
    }

    /// Values already chosen but not yet returned, front first.
    pub fn pending(&self) -> &VecDeque<PieceId> {
        &self.pending
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Number of bags requested from policies so far.
    pub fn bags_packed(&self) -> u64 {
        self.bags_packed
    }

    fn refill(&mut self) -> Result<(), GeneratorError> {
        debug!(policy = self.policy.name(), "requesting new bag");
        let bag = self.policy.pack(&mut self.source)?;
        if bag.is_empty() {
            return Err(GeneratorError::EmptyBag {
                policy: self.policy.name().to_string(),
            });
        }

        self.bags_packed += 1;
        debug!(bag = ?bag.as_slice(), "got new bag");
        self.pending.extend(bag);
        Ok(())
    }
}

impl std::fmt::Debug for Unpacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unpacker")
            .field("policy", &self.policy.name())
            .field("pending", &self.pending)
            .field("bags_packed", &self.bags_packed)
            .finish()
    }
}
