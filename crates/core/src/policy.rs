//! Bag policies - turning raw draws into fixed-size bags
//!
//! A policy is fully described by a target size, an acceptance rule over a
//! candidate value and the bag built so far, and the termination condition
//! "bag reaches target size". Policies hold no state between calls.
//!
//! Rejection policies can in principle draw forever when the source cannot
//! satisfy the acceptance rule, so every rejection loop carries an explicit
//! draw budget. Running out of budget is a [`GeneratorError::PolicyDefect`].

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::error::GeneratorError;
use crate::source::IntegerSource;
use crate::types::{PieceId, BAG_SIZE, DEFAULT_MAX_DRAWS_PER_BAG, MAX_BAG_LEN};

/// One batch of accepted values, in the order they were accepted.
pub type Bag = ArrayVec<PieceId, MAX_BAG_LEN>;

/// Acceptance/termination rule that assembles one bag per call.
pub trait BagPolicy: Send + Sync {
    /// Human-readable policy name (used in logs and errors).
    fn name(&self) -> &str;

    /// Pull from `source` until a full bag is assembled.
    fn pack(&self, source: &mut dyn IntegerSource) -> Result<Bag, GeneratorError>;
}

/// Shared rejection loop used by the canonical policies.
///
/// Draws until the bag holds `size` values, keeping a candidate only when
/// `accept(candidate, bag_so_far)` is true.
pub fn fill_by_rejection<F>(
    policy: &str,
    size: usize,
    max_draws: u32,
    source: &mut dyn IntegerSource,
    mut accept: F,
) -> Result<Bag, GeneratorError>
where
    F: FnMut(PieceId, &[PieceId]) -> bool,
{
    if size > MAX_BAG_LEN {
        return Err(GeneratorError::BagTooLarge {
            policy: policy.to_string(),
            size,
            capacity: MAX_BAG_LEN,
        });
    }

    let mut bag = Bag::new();
    let mut draws = 0u32;

    while bag.len() < size {
        if draws >= max_draws {
            return Err(GeneratorError::PolicyDefect {
                policy: policy.to_string(),
                target: size,
                accepted: bag.len(),
                draws,
            });
        }

        let candidate = source.draw()?;
        draws += 1;

        if accept(candidate, &bag) {
            trace!(policy, candidate, "accepted");
            bag.push(candidate);
        } else {
            trace!(policy, candidate, "discarded");
        }
    }

    debug!(policy, draws, bag = ?bag.as_slice(), "bag filled");
    Ok(bag)
}

/// One of each value per bag: the standard 7-bag rule.
///
/// Duplicates are discarded until the bag holds `size` distinct values.
#[derive(Debug, Clone)]
pub struct OneOfEach {
    size: usize,
    max_draws: u32,
}

impl OneOfEach {
    pub fn new(size: usize, max_draws: u32) -> Self {
        Self { size, max_draws }
    }
}

impl Default for OneOfEach {
    fn default() -> Self {
        Self::new(BAG_SIZE, DEFAULT_MAX_DRAWS_PER_BAG)
    }
}

impl BagPolicy for OneOfEach {
    fn name(&self) -> &str {
        "one-of-each"
    }

    fn pack(&self, source: &mut dyn IntegerSource) -> Result<Bag, GeneratorError> {
        fill_by_rejection(self.name(), self.size, self.max_draws, source, |v, bag| {
            !bag.contains(&v)
        })
    }
}

/// No bagging: every call draws exactly one value and returns it as a bag of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl BagPolicy for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn pack(&self, source: &mut dyn IntegerSource) -> Result<Bag, GeneratorError> {
        let value = source.draw()?;
        trace!(value, "pass-through");
        let mut bag = Bag::new();
        bag.push(value);
        Ok(bag)
    }
}

/// Keeps only draws equal to `target` until the bag holds `size` of them.
#[derive(Debug, Clone)]
pub struct FilteredRepeat {
    target: PieceId,
    size: usize,
    max_draws: u32,
    name: String,
}

impl FilteredRepeat {
    pub fn new(target: PieceId, size: usize, max_draws: u32) -> Self {
        Self {
            target,
            size,
            max_draws,
            name: format!("filtered-repeat({})", target),
        }
    }

    pub fn target(&self) -> PieceId {
        self.target
    }
}

impl BagPolicy for FilteredRepeat {
    fn name(&self) -> &str {
        &self.name
    }

    fn pack(&self, source: &mut dyn IntegerSource) -> Result<Bag, GeneratorError> {
        let target = self.target;
        fill_by_rejection(&self.name, self.size, self.max_draws, source, |v, _| {
            v == target
        })
    }
}
