//! Policy registry - tagged policy identifiers mapped to policy instances
//!
//! The registry is built once at startup and handed to whoever needs to swap
//! policies. New policies are added with [`PolicyRegistry::register`]; the
//! unpacker never needs to know about them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::GeneratorError;
use crate::policy::{BagPolicy, FilteredRepeat, OneOfEach, PassThrough};
use crate::types::{PieceId, BAG_SIZE, PIECE_ID_MIN};

/// Identifier of a registered bag policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// One of each piece per bag (7-bag).
    OneOfEach,
    /// No bagging, one fresh draw per piece.
    PassThrough,
    /// Bags containing only the given piece id.
    FilteredRepeat(PieceId),
    /// Policy registered by the embedding application.
    Custom(&'static str),
}

impl PolicyKind {
    /// Parse a policy name
    ///
    /// Accepts the long-standing config names as aliases.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetromino_feed_core::PolicyKind;
    ///
    /// assert_eq!(PolicyKind::from_str("one-of-each"), Some(PolicyKind::OneOfEach));
    /// assert_eq!(PolicyKind::from_str("one_I_in_7"), Some(PolicyKind::OneOfEach));
    /// assert_eq!(PolicyKind::from_str("no_rules"), Some(PolicyKind::PassThrough));
    /// assert_eq!(PolicyKind::from_str("seven_ones"), Some(PolicyKind::FilteredRepeat(1)));
    /// assert_eq!(PolicyKind::from_str("filtered:4"), Some(PolicyKind::FilteredRepeat(4)));
    /// assert_eq!(PolicyKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "one-of-each" | "one_of_each" | "one_i_in_7" | "7-bag" => Some(PolicyKind::OneOfEach),
            "pass-through" | "pass_through" | "no_rules" | "none" => Some(PolicyKind::PassThrough),
            "seven_ones" => Some(PolicyKind::FilteredRepeat(PIECE_ID_MIN)),
            _ => {
                let target = lower.strip_prefix("filtered:")?;
                target.parse().ok().map(PolicyKind::FilteredRepeat)
            }
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::OneOfEach => write!(f, "one-of-each"),
            PolicyKind::PassThrough => write!(f, "pass-through"),
            PolicyKind::FilteredRepeat(target) => write!(f, "filtered:{}", target),
            PolicyKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Mapping from [`PolicyKind`] to a shared policy instance.
#[derive(Clone)]
pub struct PolicyRegistry {
    policies: HashMap<PolicyKind, Arc<dyn BagPolicy>>,
    max_draws: u32,
}

impl PolicyRegistry {
    /// Empty registry; `FilteredRepeat` kinds are still resolved on demand.
    pub fn new(max_draws: u32) -> Self {
        Self {
            policies: HashMap::new(),
            max_draws,
        }
    }

    /// Registry with the canonical policies installed.
    pub fn standard(max_draws: u32) -> Self {
        let mut registry = Self::new(max_draws);
        registry.register(
            PolicyKind::OneOfEach,
            Arc::new(OneOfEach::new(BAG_SIZE, max_draws)),
        );
        registry.register(PolicyKind::PassThrough, Arc::new(PassThrough));
        registry.register(
            PolicyKind::FilteredRepeat(PIECE_ID_MIN),
            Arc::new(FilteredRepeat::new(PIECE_ID_MIN, BAG_SIZE, max_draws)),
        );
        registry
    }

    /// Install (or replace) the policy for `kind`.
    pub fn register(&mut self, kind: PolicyKind, policy: Arc<dyn BagPolicy>) {
        self.policies.insert(kind, policy);
    }

    /// Look up the policy for `kind`.
    ///
    /// Unregistered `FilteredRepeat` targets are built with the registry's draw budget.
    pub fn get(&self, kind: PolicyKind) -> Result<Arc<dyn BagPolicy>, GeneratorError> {
        if let Some(policy) = self.policies.get(&kind) {
            return Ok(Arc::clone(policy));
        }
        match kind {
            PolicyKind::FilteredRepeat(target) => Ok(Arc::new(FilteredRepeat::new(
                target,
                BAG_SIZE,
                self.max_draws,
            ))),
            other => Err(GeneratorError::UnknownPolicy(other.to_string())),
        }
    }

    pub fn contains(&self, kind: PolicyKind) -> bool {
        self.policies.contains_key(&kind)
    }

    pub fn max_draws(&self) -> u32 {
        self.max_draws
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.policies.keys().map(|k| k.to_string()).collect();
        names.sort();
        f.debug_struct("PolicyRegistry")
            .field("policies", &names)
            .field("max_draws", &self.max_draws)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Bag;
    use crate::source::{IntegerSource, SeededSource, SequenceSource};
    use crate::types::DEFAULT_MAX_DRAWS_PER_BAG;

    struct Pairs;

    impl BagPolicy for Pairs {
        fn name(&self) -> &str {
            "pairs"
        }

        fn pack(&self, source: &mut dyn IntegerSource) -> Result<Bag, GeneratorError> {
            let v = source.draw()?;
            let mut bag = Bag::new();
            bag.push(v);
            bag.push(v);
            Ok(bag)
        }
    }

    #[test]
    fn test_standard_registry_resolves_canonical_kinds() {
        let registry = PolicyRegistry::standard(DEFAULT_MAX_DRAWS_PER_BAG);
        assert_eq!(registry.get(PolicyKind::OneOfEach).unwrap().name(), "one-of-each");
        assert_eq!(registry.get(PolicyKind::PassThrough).unwrap().name(), "pass-through");
        assert_eq!(
            registry.get(PolicyKind::FilteredRepeat(1)).unwrap().name(),
            "filtered-repeat(1)"
        );
    }

    #[test]
    fn test_filtered_repeat_built_on_demand() {
        let registry = PolicyRegistry::standard(DEFAULT_MAX_DRAWS_PER_BAG);
        assert!(!registry.contains(PolicyKind::FilteredRepeat(5)));
        let policy = registry.get(PolicyKind::FilteredRepeat(5)).unwrap();
        let bag = policy.pack(&mut SeededSource::pieces(3)).unwrap();
        assert!(bag.iter().all(|v| *v == 5));
    }

    #[test]
    fn test_on_demand_policies_use_registry_budget() {
        let registry = PolicyRegistry::new(50);
        assert_eq!(registry.max_draws(), 50);

        let policy = registry.get(PolicyKind::FilteredRepeat(2)).unwrap();
        let err = policy.pack(&mut SequenceSource::new(vec![1; 100])).unwrap_err();
        assert!(matches!(err, GeneratorError::PolicyDefect { draws: 50, .. }));
    }

    #[test]
    fn test_unknown_custom_policy() {
        let registry = PolicyRegistry::standard(DEFAULT_MAX_DRAWS_PER_BAG);
        let err = registry.get(PolicyKind::Custom("pairs")).err().unwrap();
        assert_eq!(err, GeneratorError::UnknownPolicy("pairs".to_string()));
    }

    #[test]
    fn test_register_custom_policy() {
        let mut registry = PolicyRegistry::standard(DEFAULT_MAX_DRAWS_PER_BAG);
        registry.register(PolicyKind::Custom("pairs"), Arc::new(Pairs));

        let policy = registry.get(PolicyKind::Custom("pairs")).unwrap();
        let bag = policy.pack(&mut SeededSource::pieces(3)).unwrap();
        assert_eq!(bag.len(), 2);
        assert_eq!(bag[0], bag[1]);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in [
            PolicyKind::OneOfEach,
            PolicyKind::PassThrough,
            PolicyKind::FilteredRepeat(3),
        ] {
            assert_eq!(PolicyKind::from_str(&kind.to_string()), Some(kind));
        }
    }
}
