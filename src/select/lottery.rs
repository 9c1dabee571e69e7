//! Final choice: single-candidate shortcut or weighted roulette draw.

use std::sync::Arc;

use crate::rule::Rule;
use crate::select::weight::ActionTally;
use crate::world::RandomSource;

/// Pick a winning rule from the per-action tally.
///
/// With exactly one positive-weight action the choice is deterministic and
/// the random source is not consulted. Otherwise a cutoff is drawn as
/// `total × U` and the entries are walked in insertion order until the
/// running sum reaches it; equal-weight actions tie-break by walk order.
pub(crate) fn draw(tally: &ActionTally, random: &mut dyn RandomSource) -> Option<Arc<Rule>> {
    match tally.entries() {
        [] => None,
        [only] => Some(only.exemplar.clone()),
        entries => {
            let total: f32 = entries.iter().map(|e| e.mean()).sum();
            if total <= 0.0 {
                // Floating rounding collapsed the wheel; nothing to draw.
                return None;
            }
            let cutoff = total * random.uniform();
            let mut cumulative = 0.0;
            for entry in entries {
                cumulative += entry.mean();
                if cumulative >= cutoff {
                    tracing::trace!(
                        action = %entry.action,
                        weight = entry.mean(),
                        total,
                        "lottery winner"
                    );
                    return Some(entry.exemplar.clone());
                }
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectResult;
    use crate::rule::{Action, Condition};
    use crate::select::cache::ContextCache;
    use crate::select::weight::{PassMode, tally_candidates};
    use crate::select::SelectorConfig;
    use crate::world::ContextEvaluator;

    /// Replays a fixed sequence of uniforms.
    struct Scripted(Vec<f32>);

    impl RandomSource for Scripted {
        fn uniform(&mut self) -> f32 {
            self.0.remove(0)
        }
    }

    /// Panics if the lottery consults randomness at all.
    struct NoRandom;

    impl RandomSource for NoRandom {
        fn uniform(&mut self) -> f32 {
            panic!("random source must not be consulted");
        }
    }

    struct AlwaysTrue;

    impl ContextEvaluator for AlwaysTrue {
        fn evaluate(&mut self, _c: &Condition) -> SelectResult<f32> {
            Ok(1.0)
        }
    }

    fn two_action_tally() -> ActionTally {
        let config = SelectorConfig {
            importance_scoring: true,
            ..Default::default()
        };
        let a = Action::named("a");
        let b = Action::named("b");
        let candidates = vec![
            Arc::new(
                crate::rule::Rule::new("r1", Condition::wildcard(), a)
                    .with_strength(1.0)
                    .with_importance(1.0),
            ),
            Arc::new(
                crate::rule::Rule::new("r2", Condition::wildcard(), b)
                    .with_strength(0.5)
                    .with_importance(1.0),
            ),
        ];
        tally_candidates(
            &candidates,
            PassMode::Triggered,
            &config,
            &mut ContextCache::new(),
            &mut AlwaysTrue,
        )
        .unwrap()
    }

    #[test]
    fn empty_tally_draws_nothing() {
        assert!(draw(&ActionTally::new(), &mut NoRandom).is_none());
    }

    #[test]
    fn single_action_skips_randomness() {
        let config = SelectorConfig {
            importance_scoring: true,
            ..Default::default()
        };
        let a = Action::named("only");
        let candidates = vec![Arc::new(
            crate::rule::Rule::new("r", Condition::wildcard(), a)
                .with_strength(0.3)
                .with_importance(1.0),
        )];
        let tally = tally_candidates(
            &candidates,
            PassMode::Triggered,
            &config,
            &mut ContextCache::new(),
            &mut AlwaysTrue,
        )
        .unwrap();

        let winner = draw(&tally, &mut NoRandom).unwrap();
        assert_eq!(winner.name, "r");
    }

    #[test]
    fn cutoff_walk_matches_hand_computation() {
        // Weights a=1.0, b=0.5, total=1.5.
        let tally = two_action_tally();

        // U=0.5 → cutoff 0.75, inside a's span.
        let winner = draw(&tally, &mut Scripted(vec![0.5])).unwrap();
        assert_eq!(winner.name, "r1");

        // U=0.9 → cutoff 1.35, past a's cumulative 1.0, lands on b.
        let winner = draw(&tally, &mut Scripted(vec![0.9])).unwrap();
        assert_eq!(winner.name, "r2");
    }

    #[test]
    fn zero_uniform_picks_first_entry() {
        let tally = two_action_tally();
        let winner = draw(&tally, &mut Scripted(vec![0.0])).unwrap();
        assert_eq!(winner.name, "r1");
    }
}
