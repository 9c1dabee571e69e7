//! Collaborator contracts consumed by the selection core.
//!
//! The core deliberately knows nothing about how contexts are judged
//! against world state, how rules are indexed, or where randomness comes
//! from. Hosts wire those in through the traits here; [`crate::pool`]
//! ships an in-memory [`RuleSource`](crate::world::RuleSource) good enough
//! for dialogue agents without a knowledge-graph backend.

use std::sync::Arc;

use crate::error::SelectResult;
use crate::rule::{Condition, Rule};

// ---------------------------------------------------------------------------
// Trigger representation
// ---------------------------------------------------------------------------

/// The extracted representation of one input (an utterance, a perception
/// event). Producing it from raw text is the host NLP pipeline's job; the
/// core only matches its tokens against rule conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    terms: Vec<String>,
}

impl Trigger {
    /// Build a trigger from pre-extracted tokens.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// The extracted tokens, in input order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Returns `true` if extraction produced no matchable structure.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Context evaluation
// ---------------------------------------------------------------------------

/// Fuzzy truth-degree evaluator over current world state.
///
/// `evaluate` may have side effects (variable binding, grounding), so the
/// selection pass guarantees at most one invocation per distinct condition
/// per pass. Returned scores are clamped into [0, 1] by the caller.
pub trait ContextEvaluator {
    fn evaluate(&mut self, condition: &Condition) -> SelectResult<f32>;
}

// ---------------------------------------------------------------------------
// Rule sources
// ---------------------------------------------------------------------------

/// The queries a registered-rule pool answers for candidate gathering.
///
/// Implementations return rules in a deterministic order; the gatherer
/// preserves that order when deduplicating.
pub trait RuleSource {
    /// Rules whose condition is a literal, variable-free match of the
    /// trigger's extracted representation.
    fn exact_matches(&self, trigger: &Trigger) -> Vec<Arc<Rule>>;

    /// Rules registered as having no constant terms (context-free templates).
    fn wildcard_rules(&self) -> Vec<Arc<Rule>>;

    /// Rules found via an approximate structural index over the trigger.
    fn indexed_matches(&self, trigger: &Trigger) -> Vec<Arc<Rule>>;

    /// The currently salient rule subset, or `None` when the focus filter
    /// is disabled.
    fn focus_rules(&self) -> Option<Vec<Arc<Rule>>>;

    /// Every rule registered with this source.
    fn all_rules(&self) -> Vec<Arc<Rule>>;
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Process-level source of uniform samples in [0, 1).
///
/// Blanket-implemented for every [`rand::Rng`], so production selectors run
/// on `StdRng` while tests inject scripted sequences.
pub trait RandomSource {
    fn uniform(&mut self) -> f32;
}

impl<R: rand::Rng> RandomSource for R {
    fn uniform(&mut self) -> f32 {
        self.r#gen::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn trigger_from_terms() {
        let t = Trigger::from_terms(["greet", "hello"]);
        assert_eq!(t.terms(), &["greet".to_string(), "hello".to_string()]);
        assert!(!t.is_empty());
        assert!(Trigger::default().is_empty());
    }

    #[test]
    fn rng_uniform_is_in_unit_interval() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
