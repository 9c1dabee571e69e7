//! Per-pass memoization of context satisfiability.
//!
//! Context evaluation may be expensive and may bind variables as a side
//! effect, so within one selection pass each distinct condition is
//! evaluated at most once. Satisfiability depends on current world state:
//! a cache is created fresh at the start of a pass and dropped with it,
//! never reused across passes.

use std::collections::HashMap;

use crate::error::SelectResult;
use crate::rule::{Condition, ConditionId};
use crate::world::ContextEvaluator;

/// Pass-scoped cache of satisfiability scores keyed by condition identity.
#[derive(Debug, Default)]
pub(crate) struct ContextCache {
    scores: HashMap<ConditionId, f32>,
    evaluations: usize,
}

impl ContextCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The satisfiability of `condition`, evaluating it on first request
    /// and replaying the stored score afterwards. Scores are clamped into
    /// [0, 1] on entry.
    pub(crate) fn score(
        &mut self,
        condition: &Condition,
        evaluator: &mut dyn ContextEvaluator,
    ) -> SelectResult<f32> {
        if let Some(&score) = self.scores.get(&condition.id()) {
            return Ok(score);
        }
        let score = evaluator.evaluate(condition)?.clamp(0.0, 1.0);
        self.evaluations += 1;
        self.scores.insert(condition.id(), score);
        Ok(score)
    }

    /// How many evaluator invocations this pass has made.
    pub(crate) fn evaluations(&self) -> usize {
        self.evaluations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Condition;

    struct CountingEvaluator {
        calls: usize,
        score: f32,
    }

    impl ContextEvaluator for CountingEvaluator {
        fn evaluate(&mut self, _condition: &Condition) -> SelectResult<f32> {
            self.calls += 1;
            Ok(self.score)
        }
    }

    #[test]
    fn evaluates_each_condition_once() {
        let cond_a = Condition::wildcard();
        let cond_b = Condition::wildcard();
        let mut evaluator = CountingEvaluator { calls: 0, score: 0.7 };
        let mut cache = ContextCache::new();

        for _ in 0..3 {
            assert!((cache.score(&cond_a, &mut evaluator).unwrap() - 0.7).abs() < f32::EPSILON);
        }
        cache.score(&cond_b, &mut evaluator).unwrap();

        assert_eq!(evaluator.calls, 2);
        assert_eq!(cache.evaluations(), 2);
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let cond = Condition::wildcard();
        let mut evaluator = CountingEvaluator { calls: 0, score: 1.8 };
        let mut cache = ContextCache::new();
        assert!((cache.score(&cond, &mut evaluator).unwrap() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn fresh_cache_re_evaluates() {
        let cond = Condition::wildcard();
        let mut evaluator = CountingEvaluator { calls: 0, score: 0.5 };

        let mut first = ContextCache::new();
        first.score(&cond, &mut evaluator).unwrap();
        drop(first);

        let mut second = ContextCache::new();
        second.score(&cond, &mut evaluator).unwrap();
        assert_eq!(evaluator.calls, 2);
    }
}
